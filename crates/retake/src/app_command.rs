use retake_core::TakeId;

/// Commands sent from the hotkey handler and tray menu to the main
/// application loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Toggle the capture session (single user control).
    ToggleCapture,
    /// Toggle playback of a finished take.
    PlayPause(TakeId),
    /// Delete a finished take and revoke its clip.
    DeleteTake(TakeId),
    /// A take's playback reached the end of its clip.
    PlaybackEnded(TakeId),
    /// The capture stream reported an error mid-recording.
    CaptureFault {
        /// Device-reported reason.
        reason: String,
    },
    /// Request application shutdown.
    Shutdown,
}
