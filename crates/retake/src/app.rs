use crate::{
    AppCommand, AppResult, TrayAction, TrayCommand, TrayIconState, config::Config,
    tray_command::TakeEntry, tray_manager::MenuActions,
};

use std::{collections::HashMap, sync::Arc};

use retake_core::{
    AudioCapturer, CaptureErrorFn, ClipPlayer, ClipStore, DeviceState, TICK_PERIOD, TakeId,
    TakeSession, ToggleEffect, format_time,
};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application state: the controller binding the capture session, the
/// clock ticker, the clip store, and the per-take players to the tray and
/// hotkey triggers.
///
/// Runs on the async runtime thread. Everything mutates inside one select
/// loop, so state transitions are serialized exactly as the session expects
/// and nothing here needs a lock. Tray mutations are forwarded to the main
/// thread via the event loop proxy because `TrayIcon` is `!Send`.
pub struct App {
    pub(crate) config: Config,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) menu_actions: MenuActions,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) session: TakeSession,
    pub(crate) store: ClipStore,
    pub(crate) players: HashMap<TakeId, ClipPlayer>,
    pub(crate) capturer: Option<AudioCapturer>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Retake starting");

        self.acquire_device().await;
        self.sync_tray();

        // Tray event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // HAS blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when menu_event_rx is dropped (main loop breaks),
        // menu_event_tx.blocking_send() fails, breaking the blocking loop.
        let (menu_event_tx, mut menu_event_rx) = mpsc::channel(32);
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        // The one periodic source: drives the session clock while recording.
        let mut ticker = tokio::time::interval(TICK_PERIOD);
        let mut last_tooltip_secs = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.session.tick();
                    if self.session.is_recording() {
                        // Tooltip updates once per second; the clock itself
                        // still advances every tick.
                        let secs = self.session.elapsed_seconds() as u64;
                        if secs != last_tooltip_secs {
                            last_tooltip_secs = secs;
                            let _ = self
                                .tray_proxy
                                .send_event(TrayCommand::SetElapsed(self.session.elapsed_display()));
                        }
                    }
                }

                Some(event) = menu_event_rx.recv() => {
                    let action = self
                        .menu_actions
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .get(&event.id)
                        .copied();
                    match action {
                        Some(TrayAction::ToggleCapture) => self.toggle_capture(),
                        Some(TrayAction::PlayPause(id)) => self.play_pause(id),
                        Some(TrayAction::DeleteTake(id)) => self.delete_take(id),
                        Some(TrayAction::Quit) => {
                            info!("Exit requested from tray menu");
                            // Shared exit path with any other shutdown trigger.
                            if self.command_tx.try_send(AppCommand::Shutdown).is_err() {
                                break;
                            }
                        }
                        None => warn!(menu_id = ?event.id, "Click on unknown menu item ignored"),
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::ToggleCapture => self.toggle_capture(),
                        AppCommand::PlayPause(id) => self.play_pause(id),
                        AppCommand::DeleteTake(id) => self.delete_take(id),
                        AppCommand::PlaybackEnded(id) => self.playback_ended(id),
                        AppCommand::CaptureFault { reason } => {
                            self.session.capture_fault(&reason);
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }
            }
        }

        // Drop the receiver to unblock the forwarder's next blocking_send().
        drop(menu_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), menu_handle).await {
            Ok(Ok(())) => info!("Menu event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Menu event forwarder task panicked"),
            Err(_) => info!(
                "Menu event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
        let _ = self.shutdown_tx.send(true);
        info!("Retake shut down");

        Ok(())
    }

    /// One-shot device acquisition. Failure leaves the session not-ready
    /// forever: the control stays disabled and no retry is attempted.
    async fn acquire_device(&mut self) {
        let device_name = self.config.audio.selected_device.clone();
        let fault_tx = self.command_tx.clone();
        let on_error: CaptureErrorFn = Arc::new(move |reason: String| {
            // Called from the audio thread; try_send keeps it non-blocking.
            let _ = fault_tx.try_send(AppCommand::CaptureFault { reason });
        });

        let acquired = tokio::task::spawn_blocking(move || {
            AudioCapturer::acquire(device_name.as_deref(), on_error)
        })
        .await;

        match acquired {
            Ok(Ok(capturer)) => {
                self.capturer = Some(capturer);
                self.session.device_ready();
            }
            Ok(Err(e)) => self.session.device_failed(&e.to_string()),
            Err(e) => self.session.device_failed(&format!("acquisition task failed: {}", e)),
        }
    }

    /// The single user control: dispatch to the session, then execute the
    /// capture effect it asks for.
    #[instrument(skip(self))]
    fn toggle_capture(&mut self) {
        match self.session.toggle() {
            ToggleEffect::Ignored => {}
            ToggleEffect::StartCapture => {
                let started = match self.capturer.as_mut() {
                    Some(capturer) => capturer.start(),
                    None => {
                        // Session can only reach Idle after acquisition, so
                        // this indicates a dropped capturer; treat as a
                        // failed start.
                        warn!("Toggle with no capturer");
                        self.session.toggle();
                        self.sync_tray();
                        return;
                    }
                };
                if let Err(e) = started {
                    error!(error = ?e, "Failed to start capture, reverting");
                    self.session.toggle();
                }
            }
            ToggleEffect::StopCapture => {
                if let Some(capturer) = self.capturer.as_mut() {
                    match capturer.stop() {
                        Ok(samples) if samples.is_empty() => {
                            warn!("Capture produced no samples; take discarded")
                        }
                        Ok(samples) => {
                            let rate = capturer.sample_rate();
                            let clip = self.store.insert(samples, rate);
                            // Last write wins: revoke whatever this delivery
                            // superseded.
                            if let Some(replaced) = self.session.data_available(clip) {
                                self.store.revoke(replaced);
                            }
                        }
                        Err(e) => error!(error = ?e, "Failed to stop capture"),
                    }
                }
            }
        }

        self.sync_tray();
        self.refresh_takes();
    }

    /// Toggle one take's player, creating it on first play.
    #[instrument(skip(self))]
    fn play_pause(&mut self, id: TakeId) {
        if let Some(player) = self.players.get_mut(&id) {
            let result = if player.is_playing() {
                player.pause()
            } else {
                player.play()
            };
            if let Err(e) = result {
                error!(take = %id, error = ?e, "Playback toggle failed");
            }
            self.refresh_takes();
            return;
        }

        let Some(take) = self.session.takes().iter().find(|t| t.id == id).copied() else {
            warn!(take = %id, "Play requested for unknown take");
            return;
        };
        let Some(clip) = self.store.get(take.clip) else {
            warn!(take = %id, clip = %take.clip, "Clip missing from store");
            return;
        };

        let ended_tx = self.command_tx.clone();
        let player = ClipPlayer::new(&clip, move || {
            // Fired from the audio thread when the clip is exhausted.
            let _ = ended_tx.try_send(AppCommand::PlaybackEnded(id));
        });

        match player {
            Ok(mut player) => {
                if let Err(e) = player.play() {
                    error!(take = %id, error = ?e, "Failed to start playback");
                    return;
                }
                self.players.insert(id, player);
                self.refresh_takes();
            }
            Err(e) => error!(take = %id, error = ?e, "Failed to create player"),
        }
    }

    /// Delete a finished take: stop its player, remove it from the session,
    /// revoke its clip exactly once.
    #[instrument(skip(self))]
    fn delete_take(&mut self, id: TakeId) {
        drop(self.players.remove(&id));

        if let Some(clip) = self.session.delete_take(id) {
            self.store.revoke(clip);
        } else {
            warn!(take = %id, "Delete requested for unknown take");
        }

        self.refresh_takes();
    }

    /// End-of-clip notification: the entry's control flips back to "Play".
    fn playback_ended(&mut self, id: TakeId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.mark_ended();
        }
        self.refresh_takes();
    }

    fn sync_tray(&self) {
        let state = match self.session.device_state() {
            DeviceState::NotReady => TrayIconState::NotReady,
            DeviceState::Idle => TrayIconState::Idle,
            DeviceState::Recording => TrayIconState::Recording,
        };
        let _ = self.tray_proxy.send_event(TrayCommand::SetState(state));
    }

    /// Push the finished takes (never the placeholder) to the menu.
    fn refresh_takes(&self) {
        let entries: Vec<TakeEntry> = self
            .session
            .takes()
            .iter()
            .map(|take| TakeEntry {
                id: take.id,
                duration: format_time(take.duration_secs),
                playing: self
                    .players
                    .get(&take.id)
                    .is_some_and(ClipPlayer::is_playing),
            })
            .collect();

        let _ = self
            .tray_proxy
            .send_event(TrayCommand::RefreshTakes(entries));
    }
}
