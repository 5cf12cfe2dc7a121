use crate::TrayIconState;

use retake_core::TakeId;

/// One finished take as the menu renders it.
#[derive(Debug, Clone)]
pub struct TakeEntry {
    /// Take to dispatch play/delete against.
    pub id: TakeId,
    /// Formatted duration (`HH:MM:SS:hh`).
    pub duration: String,
    /// Whether this take is currently playing (labels the play item).
    pub playing: bool,
}

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Update the tooltip with the current clock display.
    SetElapsed(String),
    /// Rebuild the take section of the context menu.
    RefreshTakes(Vec<TakeEntry>),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
