//! Capture session state machine.
//!
//! Tracks the capture device state, the ordered list of finished takes, and
//! the single in-progress placeholder. The session is deliberately pure: it
//! never touches the audio device itself. [`TakeSession::toggle`] returns the
//! effect the caller must execute (start or stop the capturer), and captured
//! data is fed back in through [`TakeSession::data_available`]. This keeps
//! every transition in the table unit-testable without hardware.

use crate::{
    audio::ClipId,
    clock::{Clock, format_time},
};

use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifier for a finished take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TakeId(Uuid);

impl TakeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TakeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Capture device readiness.
///
/// `NotReady` until the device has been acquired at least once. Acquisition
/// failure leaves the session `NotReady` permanently; the toggle control is
/// ignored in that state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceState {
    /// Device not yet acquired; all controls disabled.
    #[default]
    NotReady,
    /// Device acquired, not capturing.
    Idle,
    /// Device capturing audio.
    Recording,
}

/// One finished recording: an audio clip handle plus a duration snapshot.
///
/// The duration is fixed at the moment capture stopped, not when the clip
/// data arrived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Take {
    /// Unique id, used by the view for play/delete dispatch.
    pub id: TakeId,
    /// Handle to the captured audio in the clip store.
    pub clip: ClipId,
    /// Clock snapshot taken when capture stopped, in seconds.
    pub duration_secs: f64,
}

/// The single in-progress slot awaiting capture data.
#[derive(Debug, Default)]
struct PendingTake {
    clip: Option<ClipId>,
    duration_secs: f64,
    /// Set when capture has stopped and the duration snapshot is final.
    stopped: bool,
}

/// What the caller must do after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEffect {
    /// Device not ready; nothing to do.
    Ignored,
    /// Begin hardware capture.
    StartCapture,
    /// Stop hardware capture; the duration snapshot has been taken.
    StopCapture,
}

/// Capture session: device state, finished takes, and the placeholder slot.
#[derive(Debug, Default)]
pub struct TakeSession {
    device: DeviceState,
    clock: Clock,
    takes: Vec<Take>,
    pending: PendingTake,
    /// True while the most recently finalized take may still receive a
    /// replacement clip (between finalization and the next start).
    finalize_open: bool,
}

impl TakeSession {
    /// Create a session with no device, a zeroed clock, and one empty
    /// placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Device acquisition completed: enable the toggle control.
    pub fn device_ready(&mut self) {
        match self.device {
            DeviceState::NotReady => {
                self.device = DeviceState::Idle;
                info!("Capture device ready");
            }
            _ => debug!(state = ?self.device, "device_ready ignored"),
        }
    }

    /// Device acquisition failed: stay `NotReady`, control stays disabled.
    /// No automatic retry is attempted.
    pub fn device_failed(&mut self, reason: &str) {
        warn!(reason, "Capture device acquisition failed; recording disabled");
    }

    /// Capture error while recording: logged only, the session stays in
    /// `Recording` and capture continues. Already-finalized takes are
    /// unaffected.
    pub fn capture_fault(&mut self, reason: &str) {
        warn!(reason, state = ?self.device, "Capture error");
    }

    /// Handle the single user control (button press or keyboard shortcut).
    ///
    /// Drives the clock in lockstep with the device state: starting capture
    /// starts the clock (which is at zero from the previous stop's reset);
    /// stopping capture pauses the clock, snapshots its value into the
    /// placeholder, and resets it for the next take.
    pub fn toggle(&mut self) -> ToggleEffect {
        match self.device {
            DeviceState::NotReady => {
                debug!("Toggle ignored: device not ready");
                ToggleEffect::Ignored
            }
            DeviceState::Idle => {
                self.device = DeviceState::Recording;
                self.finalize_open = false;
                // A stop that never received data leaves a stale snapshot.
                self.pending.stopped = false;
                self.pending.duration_secs = 0.0;
                self.clock.start();
                info!("Recording started");
                ToggleEffect::StartCapture
            }
            DeviceState::Recording => {
                self.device = DeviceState::Idle;
                self.clock.pause();
                self.pending.duration_secs = self.clock.elapsed_seconds();
                self.pending.stopped = true;
                self.clock.reset();
                info!(
                    duration_secs = self.pending.duration_secs,
                    "Recording stopped"
                );
                // Data delivered mid-capture is already staged; finalize now.
                self.try_finalize();
                ToggleEffect::StopCapture
            }
        }
    }

    /// Captured data became available as a clip handle.
    ///
    /// Returns the clip handle this delivery replaced, if any, so the caller
    /// can revoke it (last write wins). A second delivery for the same
    /// capture never creates a second take or placeholder.
    pub fn data_available(&mut self, clip: ClipId) -> Option<ClipId> {
        if self.pending.stopped {
            // Normal path: data for the capture that just stopped.
            let replaced = self.pending.clip.replace(clip);
            self.try_finalize();
            replaced
        } else if self.device != DeviceState::Recording && self.finalize_open {
            // Duplicate delivery after finalization: replace the clip of the
            // take this capture already produced.
            match self.takes.last_mut() {
                Some(last) => {
                    let replaced = std::mem::replace(&mut last.clip, clip);
                    debug!(take = %last.id, "Replaced clip on finalized take");
                    Some(replaced)
                }
                None => None,
            }
        } else {
            // Delivery while capture is still running: stage into the
            // placeholder; the stop will finalize it.
            self.pending.clip.replace(clip)
        }
    }

    fn try_finalize(&mut self) {
        if !self.pending.stopped {
            return;
        }
        let Some(clip) = self.pending.clip.take() else {
            return;
        };
        let take = Take {
            id: TakeId::new(),
            clip,
            duration_secs: self.pending.duration_secs,
        };
        info!(take = %take.id, duration_secs = take.duration_secs, "Take finalized");
        self.takes.push(take);
        // A fresh empty placeholder takes the open slot.
        self.pending = PendingTake::default();
        self.finalize_open = true;
    }

    /// Delete a finished take, returning its clip handle for revocation.
    /// The in-progress placeholder has no id and cannot be deleted.
    pub fn delete_take(&mut self, id: TakeId) -> Option<ClipId> {
        let index = self.takes.iter().position(|t| t.id == id)?;
        let take = self.takes.remove(index);
        if self.finalize_open && index == self.takes.len() {
            // The deleted take was the replacement target; forget it.
            self.finalize_open = false;
        }
        info!(take = %id, "Take deleted");
        Some(take.clip)
    }

    /// Finished takes in insertion order. The placeholder is never included;
    /// the view renders exactly this list.
    pub fn takes(&self) -> &[Take] {
        &self.takes
    }

    /// Clip staged in the placeholder, if data arrived before the stop.
    pub fn pending_clip(&self) -> Option<ClipId> {
        self.pending.clip
    }

    /// Current device state.
    pub fn device_state(&self) -> DeviceState {
        self.device
    }

    /// Whether the device is capturing.
    pub fn is_recording(&self) -> bool {
        self.device == DeviceState::Recording
    }

    /// Advance the clock by one tick (no-op unless recording).
    pub fn tick(&mut self) {
        self.clock.tick();
    }

    /// Elapsed seconds on the session clock.
    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Clock display string for the current elapsed time.
    pub fn elapsed_display(&self) -> String {
        format_time(self.clock.elapsed_seconds())
    }
}
