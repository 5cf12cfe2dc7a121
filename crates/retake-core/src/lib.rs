//! Retake Core Library
//!
//! Stopwatch-synchronized take recording: a tick-driven clock, a capture
//! session state machine that turns every start/stop span into one finished
//! take, and the audio plumbing (cpal capture, clip registry, playback).
//!
//! # Example
//!
//! ```no_run
//! use retake_core::{ClipStore, TakeSession, ToggleEffect};
//!
//! let mut session = TakeSession::new();
//! let mut store = ClipStore::new();
//!
//! session.device_ready();
//! assert_eq!(session.toggle(), ToggleEffect::StartCapture);
//! // ...ticks elapse while the device captures...
//! assert_eq!(session.toggle(), ToggleEffect::StopCapture);
//!
//! let clip = store.insert(vec![0.0; 48_000], 48_000);
//! session.data_available(clip);
//! assert_eq!(session.takes().len(), 1);
//! ```

mod audio;
mod clock;
mod error;
mod session;

pub use {
    audio::{AudioCapturer, AudioClip, CaptureErrorFn, ClipId, ClipPlayer, ClipStore, PlaybackState},
    clock::{Clock, TICK_PERIOD, TICK_SECS, format_time},
    error::{CoreError, Result as CoreResult},
    session::{DeviceState, Take, TakeId, TakeSession, ToggleEffect},
};

#[cfg(test)]
mod tests;
