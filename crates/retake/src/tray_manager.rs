//! System tray icon and take list menu.
//!
//! The tray is the app's entire visible surface: the icon mirrors the
//! capture session state, the first menu item is the record toggle (disabled
//! until the device is acquired), and each finished take gets a submenu with
//! play/pause and delete. The in-progress placeholder is never rendered, so
//! it can never be deleted.

use crate::{AppError, AppResult, TrayAction, TrayIconState, tray_command::TakeEntry};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// Shared map resolving transient menu item ids to actions.
///
/// Written by the main thread on every menu rebuild, read by the app loop
/// when a `MenuEvent` arrives.
pub type MenuActions = Arc<Mutex<HashMap<MenuId, TrayAction>>>;

/// System tray icon manager. Lives on the main thread (`TrayIcon` is `!Send`).
pub struct TrayManager {
    tray_icon: TrayIcon,
    actions: MenuActions,
    state: TrayIconState,
    takes: Vec<TakeEntry>,
}

impl TrayManager {
    /// Create the tray with the not-ready icon and an empty take list.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let actions: MenuActions = Arc::new(Mutex::new(HashMap::new()));

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(Self::tooltip(TrayIconState::NotReady))
            .with_icon(Self::render_icon(TrayIconState::NotReady)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut manager = Self {
            tray_icon,
            actions,
            state: TrayIconState::NotReady,
            takes: Vec::new(),
        };
        manager.rebuild_menu()?;

        info!("System tray icon initialized");

        Ok(manager)
    }

    /// Handle for resolving menu clicks; cloned into the app loop.
    pub fn menu_actions(&self) -> MenuActions {
        Arc::clone(&self.actions)
    }

    /// Update the tray icon and menu for a new session state.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        self.state = state;

        self.tray_icon
            .set_icon(Some(Self::render_icon(state)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(Self::tooltip(state)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // The record item's label and enabled flag depend on the state.
        self.rebuild_menu()
    }

    /// Show the running clock in the tooltip while recording.
    #[track_caller]
    pub fn set_elapsed(&mut self, elapsed: &str) -> AppResult<()> {
        self.tray_icon
            .set_tooltip(Some(format!("Retake - recording {}", elapsed)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Replace the rendered take list and rebuild the menu.
    #[track_caller]
    #[instrument(skip(self, takes))]
    pub fn refresh_takes(&mut self, takes: Vec<TakeEntry>) -> AppResult<()> {
        debug!(take_count = takes.len(), "Refreshing take menu");
        self.takes = takes;
        self.rebuild_menu()
    }

    /// Rebuild the context menu from the current state and take list, and
    /// replace the id-to-action map in the same pass so stale ids can never
    /// dispatch.
    #[track_caller]
    fn rebuild_menu(&mut self) -> AppResult<()> {
        let menu = Menu::new();
        let mut actions = HashMap::new();

        let (record_label, record_enabled) = match self.state {
            TrayIconState::NotReady => ("Start recording", false),
            TrayIconState::Idle => ("Start recording", true),
            TrayIconState::Recording => ("Stop recording", true),
        };
        let record_item = MenuItem::new(record_label, record_enabled, None);
        actions.insert(record_item.id().clone(), TrayAction::ToggleCapture);
        Self::append(&menu, &record_item)?;

        if !self.takes.is_empty() {
            Self::append(&menu, &PredefinedMenuItem::separator())?;
        }

        for (index, take) in self.takes.iter().enumerate() {
            let label = format!("Take {} ({})", index + 1, take.duration);
            let submenu = Submenu::new(label, true);

            let play_label = if take.playing { "Pause" } else { "Play" };
            let play_item = MenuItem::new(play_label, true, None);
            actions.insert(play_item.id().clone(), TrayAction::PlayPause(take.id));
            submenu.append(&play_item).map_err(|e| AppError::TrayError {
                reason: format!("Failed to build take submenu: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let delete_item = MenuItem::new("Delete", true, None);
            actions.insert(delete_item.id().clone(), TrayAction::DeleteTake(take.id));
            submenu
                .append(&delete_item)
                .map_err(|e| AppError::TrayError {
                    reason: format!("Failed to build take submenu: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            Self::append(&menu, &submenu)?;
        }

        Self::append(&menu, &PredefinedMenuItem::separator())?;

        let quit_item = MenuItem::new("Quit", true, None);
        actions.insert(quit_item.id().clone(), TrayAction::Quit);
        Self::append(&menu, &quit_item)?;

        self.tray_icon.set_menu(Some(Box::new(menu)));

        let mut shared = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        *shared = actions;

        Ok(())
    }

    #[track_caller]
    fn append(menu: &Menu, item: &dyn tray_icon::menu::IsMenuItem) -> AppResult<()> {
        menu.append(item).map_err(|e| AppError::TrayError {
            reason: format!("Failed to build menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn tooltip(state: TrayIconState) -> &'static str {
        match state {
            TrayIconState::NotReady => "Retake - microphone unavailable",
            TrayIconState::Idle => "Retake - ready",
            TrayIconState::Recording => "Retake - recording",
        }
    }

    /// Draw the state icon: a filled circle, grey / green / red.
    ///
    /// Drawn programmatically so the binary carries no asset files.
    #[track_caller]
    fn render_icon(state: TrayIconState) -> AppResult<Icon> {
        let color = match state {
            TrayIconState::NotReady => Rgba([128u8, 128, 128, 255]),
            TrayIconState::Idle => Rgba([76u8, 175, 80, 255]),
            TrayIconState::Recording => Rgba([211u8, 47, 47, 255]),
        };

        let center = (ICON_SIZE / 2) as i32;
        let radius = (ICON_SIZE / 2 - 4) as i32;

        let mut img = RgbaImage::new(ICON_SIZE, ICON_SIZE);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as i32 - center;
            let dy = y as i32 - center;
            if dx * dx + dy * dy <= radius * radius {
                *pixel = color;
            }
        }

        Icon::from_rgba(img.into_raw(), ICON_SIZE, ICON_SIZE).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
