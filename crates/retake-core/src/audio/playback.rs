use crate::{
    CoreError, CoreResult,
    audio::{Resampler, store::AudioClip},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Playback state of one take's player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not producing sound.
    Paused,
    /// Producing sound.
    Playing,
}

/// Per-take audio player over a cpal output stream.
///
/// Each finished take gets its own player; the `Paused ⇄ Playing` state is
/// local to the take and never touches the clock or the capture session.
/// When the clip runs out, the stream goes silent and `on_ended` fires
/// exactly once; the next `play()` restarts from the beginning.
pub struct ClipPlayer {
    stream: Stream,
    state: PlaybackState,
    position: Arc<AtomicUsize>,
    ended: Arc<AtomicBool>,
    frame_count: usize,
}

impl ClipPlayer {
    /// Build a paused player for one clip on the default output device.
    ///
    /// The clip is resampled up front when its capture rate differs from
    /// the device rate, so the stream callback only copies samples.
    #[track_caller]
    #[instrument(skip(clip, on_ended))]
    pub fn new<F>(clip: &AudioClip, on_ended: F) -> CoreResult<Self>
    where
        F: Fn() + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(CoreError::NoOutputDeviceFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| CoreError::PlaybackError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let output_rate = config.sample_rate;
        let channels = config.channels as usize;

        let rendered: Arc<Vec<f32>> = if clip.sample_rate == output_rate {
            Arc::new(clip.samples.clone())
        } else {
            let mut resampler = Resampler::new(clip.sample_rate, output_rate)?;
            Arc::new(resampler.resample(&clip.samples)?)
        };

        let frame_count = rendered.len();
        let position = Arc::new(AtomicUsize::new(0));
        let ended = Arc::new(AtomicBool::new(false));

        let cb_samples = Arc::clone(&rendered);
        let cb_position = Arc::clone(&position);
        let cb_ended = Arc::clone(&ended);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = cb_position.load(Ordering::Acquire);
                    for frame in data.chunks_mut(channels) {
                        let sample = cb_samples.get(pos).copied().unwrap_or(0.0);
                        frame.fill(sample);
                        if pos < cb_samples.len() {
                            pos += 1;
                        }
                    }
                    cb_position.store(pos, Ordering::Release);
                    // Fire the ended notification once, from the callback
                    // that drained the final sample.
                    if pos >= cb_samples.len()
                        && !cb_ended.swap(true, Ordering::AcqRel)
                    {
                        on_ended();
                    }
                },
                |err| {
                    error!("Output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::PlaybackError {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Streams may start live on some backends; hold until play().
        stream.pause().map_err(|e| CoreError::PlaybackError {
            reason: format!("Failed to pause new stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(frame_count, channels, "Clip player ready");

        Ok(Self {
            stream,
            state: PlaybackState::Paused,
            position,
            ended,
            frame_count,
        })
    }

    /// Start or resume playback. After the clip has ended, playback
    /// restarts from the beginning.
    #[track_caller]
    pub fn play(&mut self) -> CoreResult<()> {
        if self.ended.swap(false, Ordering::AcqRel) {
            self.position.store(0, Ordering::Release);
        }

        self.stream.play().map_err(|e| CoreError::PlaybackError {
            reason: format!("Failed to start playback: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.state = PlaybackState::Playing;
        info!("Playback started");

        Ok(())
    }

    /// Pause playback, retaining the position.
    #[track_caller]
    pub fn pause(&mut self) -> CoreResult<()> {
        self.stream.pause().map_err(|e| CoreError::PlaybackError {
            reason: format!("Failed to pause playback: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.state = PlaybackState::Paused;
        info!("Playback paused");

        Ok(())
    }

    /// Mark the player paused after the end-of-clip notification.
    pub fn mark_ended(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Current play/pause state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the player is currently playing.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Number of rendered output frames.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}
