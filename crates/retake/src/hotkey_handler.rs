//! Global shortcut mirroring the record toggle.
//!
//! Registers the configured key (Space by default) as a global hotkey and
//! forwards each press as a `ToggleCapture` command. The handler holds no
//! capture state of its own: the session in retake-core is the single owner
//! of the recording state machine, and this is just its second trigger.

use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Global hotkey handler forwarding toggle presses to the app loop.
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register the toggle shortcut.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered, and
    /// the returned [`HotKey`] is the exact value to pass to
    /// [`HotkeyHandler::release`] — registration and deregistration always
    /// use the same stored binding, so a listener can never leak.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(hotkey: HotKey) -> AppResult<(GlobalHotKeyManager, HotKey)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {:?}: {}", hotkey, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = ?hotkey, "Toggle hotkey registered");

        Ok((manager, hotkey))
    }

    /// Unregister a previously registered shortcut.
    ///
    /// Takes the stored [`HotKey`] returned by
    /// [`HotkeyHandler::register_hotkey`]; unregistering any other value
    /// would silently match nothing and leak the listener.
    #[track_caller]
    pub fn release(manager: &GlobalHotKeyManager, hotkey: HotKey) -> AppResult<()> {
        manager
            .unregister(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to unregister {:?}: {}", hotkey, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = ?hotkey, "Toggle hotkey released");

        Ok(())
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// This struct is `Send` and can live on any thread — it only listens
    /// on the global [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey: HotKey, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id: hotkey.id(),
            command_tx,
        }
    }

    /// Run the hotkey handler event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // which has blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        // The JoinHandle is awaited with a timeout after the main loop exits.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        self.forward_toggle().await?;
                    }
                }
            }
        }

        // Drop event_rx to unblock the blocking task's next blocking_send().
        // The task will break out of its loop when blocking_send returns Err.
        drop(event_rx);

        // Best-effort join: the blocking task may be stuck in recv() if no
        // hotkey event arrives after shutdown. Use a timeout to avoid hanging.
        // The task is cleaned up by the runtime on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn forward_toggle(&self) -> AppResult<()> {
        // The session decides what the toggle means (it is ignored while the
        // device is not ready); the handler just delivers the trigger.
        self.command_tx
            .send(AppCommand::ToggleCapture)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send ToggleCapture: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Toggle forwarded");

        Ok(())
    }
}
