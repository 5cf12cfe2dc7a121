//! Retake: stopwatch-synchronized take recording from the system tray.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
#[cfg(test)]
mod tests;
mod tray_action;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    tray_action::TrayAction,
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
};

use crate::config::Config;

use std::collections::HashMap;

use global_hotkey::{GlobalHotKeyManager, hotkey::HotKey};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("retake=debug")
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Persists across event loop iterations; dropping it unregisters the
    // hotkey, and Shutdown releases the stored binding explicitly.
    let mut hotkey_registration: Option<(GlobalHotKeyManager, HotKey)> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::SetElapsed(elapsed) => {
                        if let Err(e) = tray_manager.set_elapsed(&elapsed) {
                            error!(error = ?e, "Failed to update tray tooltip");
                        }
                    }
                    TrayCommand::RefreshTakes(takes) => {
                        if let Err(e) = tray_manager.refresh_takes(takes) {
                            error!(error = ?e, "Failed to rebuild take menu");
                        }
                    }
                    TrayCommand::Shutdown => {
                        // Release the exact binding that was registered so
                        // the listener cannot leak past shutdown.
                        if let Some((manager, hotkey)) = hotkey_registration.take() {
                            if let Err(e) = HotkeyHandler::release(&manager, hotkey) {
                                error!(error = ?e, "Failed to release hotkey");
                            }
                        }
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                // Register the hotkey on the main thread — tao's event loop
                // pumps the Windows messages needed for WM_HOTKEY delivery.
                // A registration failure is not fatal: the tray control still
                // works, only the keyboard mirror is lost.
                let registered_hotkey = match HotkeyHandler::register_hotkey(config.toggle_hotkey())
                {
                    Ok((manager, hotkey)) => {
                        hotkey_registration = Some((manager, hotkey));
                        Some(hotkey)
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to register hotkey; tray control only");
                        None
                    }
                };

                let tray_proxy = tray_proxy.clone();
                let menu_actions = tray_manager.menu_actions();

                // Spawn tokio runtime on separate thread.
                // TrayManager and the hotkey manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let app = App {
                            config,
                            tray_proxy,
                            menu_actions,
                            command_tx: command_tx.clone(),
                            command_rx,
                            shutdown_tx,
                            session: retake_core::TakeSession::new(),
                            store: retake_core::ClipStore::new(),
                            players: HashMap::new(),
                            capturer: None,
                        };

                        match registered_hotkey {
                            Some(hotkey) => {
                                let hotkey_handler = HotkeyHandler::new(hotkey, command_tx);
                                tokio::join!(
                                    async {
                                        if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                            error!(error = ?e, "Hotkey handler error");
                                        }
                                    },
                                    async {
                                        if let Err(e) = app.run().await {
                                            error!(error = ?e, "App error");
                                        }
                                    }
                                );
                            }
                            None => {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        }
                    });
                });
            }
            _ => {}
        }

        // Keep the hotkey registration alive for the app's lifetime.
        let _ = &hotkey_registration;
    });
}
