use crate::{CoreError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Maximum samples to buffer (30 minutes of mono at 48kHz).
/// Takes are open-ended, so the bound is generous, but memory stays capped
/// even if a recording is left running.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 30;

/// Callback invoked from the audio thread when the stream reports an error.
/// Capture keeps running; the session only logs the fault.
pub type CaptureErrorFn = Arc<dyn Fn(String) + Send + Sync>;

/// Microphone capture over a cpal input stream.
///
/// Acquisition happens once, in [`AudioCapturer::acquire`]; a failure there
/// leaves the session permanently not-ready. Each take is one
/// `start()`..`stop()` span; `stop()` drains everything the stream collected,
/// which is this implementation's single data-available delivery.
pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after the lock
    /// is acquired in `stop()`.
    shutdown: Arc<AtomicBool>,
    on_error: CaptureErrorFn,
}

impl AudioCapturer {
    /// Acquire the capture device: the named input device if configured,
    /// otherwise the host default.
    #[track_caller]
    #[instrument(skip(on_error))]
    pub fn acquire(preferred_device: Option<&str>, on_error: CaptureErrorFn) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = match preferred_device {
            Some(name) => Self::find_device(&host, name)?,
            None => host
                .default_input_device()
                .ok_or(CoreError::NoMicrophoneFound {
                    location: ErrorLocation::from(Location::caller()),
                })?,
        };

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device = ?device.description(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Capture device acquired"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            on_error,
        })
    }

    #[track_caller]
    fn find_device(host: &cpal::Host, name: &str) -> CoreResult<Device> {
        let devices = host.input_devices().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to enumerate input devices: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        for device in devices {
            if let Ok(description) = device.description()
                && description.to_string() == name
            {
                return Ok(device);
            }
        }

        Err(CoreError::DeviceError {
            reason: format!("No input device named {:?}", name),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Begin a capture span: clear the buffer and start the input stream.
    /// Interleaved input is downmixed to mono as it arrives.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let on_error = Arc::clone(&self.on_error);
        let channels = self.config.channels as usize;

        self.shutdown.store(false, Ordering::Release);

        samples
            .lock()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Once stop() sets the shutdown flag, no further samples
                    // are written even if the backend fires one more callback
                    // before the stream is dropped.
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // Recover from lock poison rather than dropping audio:
                    // the VecDeque data is still valid after a panic.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    for frame in data.chunks(channels) {
                        let mono = frame.iter().sum::<f32>() / channels as f32;
                        buf.push_back(mono);
                    }
                    // Ring buffer: O(1) amortized drop of the oldest samples.
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    on_error(err.to_string());
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// End the capture span and drain the collected samples.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Vec<f32>> {
        // Flag first: even if a backend's Stream::drop() returns before the
        // final callback, the callback observes the flag and returns early.
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Brief yield so an in-flight callback observes the flag and
            // completes before the buffer is drained.
            std::thread::sleep(std::time::Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples: Vec<f32> = self
            .samples
            .lock()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(samples)
    }

    /// Whether a capture span is active.
    pub fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }

    /// Rate of the samples `stop()` returns.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}
