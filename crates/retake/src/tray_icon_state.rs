/// Tray icon states corresponding to the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Capture device not acquired; recording disabled.
    NotReady,
    /// Ready to start recording.
    Idle,
    /// Currently recording a take.
    Recording,
}
