use retake_core::TakeId;

/// What a tray menu item does when clicked.
///
/// The menu is rebuilt whenever the take list changes, so menu item ids are
/// transient; the main thread maintains a shared id-to-action map and the
/// app loop resolves incoming `MenuEvent`s through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// The record toggle item.
    ToggleCapture,
    /// Play/pause one finished take.
    PlayPause(TakeId),
    /// Delete one finished take.
    DeleteTake(TakeId),
    /// Exit the application.
    Quit,
}
