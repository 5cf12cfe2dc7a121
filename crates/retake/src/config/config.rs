//! Configuration management for retake.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations. The hotkey string is validated lazily:
//! a malformed binding falls back to the default at registration time so a
//! bad config file never prevents startup.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, ControlsConfig, DEFAULT_HOTKEY},
};

use std::{fs, io::Write, panic::Location, path::PathBuf, str::FromStr};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use global_hotkey::hotkey::{Code, HotKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Toggle control settings.
    pub controls: ControlsConfig,
    /// Audio device settings.
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            Self::create_default()
        }
    }

    /// Parse the configured toggle shortcut.
    ///
    /// Falls back to the default binding (with a warning) when the string
    /// does not parse, rather than refusing to start.
    pub fn toggle_hotkey(&self) -> HotKey {
        match HotKey::from_str(&self.controls.hotkey) {
            Ok(hotkey) => hotkey,
            Err(e) => {
                warn!(
                    hotkey = %self.controls.hotkey,
                    error = %e,
                    "Invalid hotkey in config, falling back to default"
                );
                HotKey::new(None, Code::Space)
            }
        }
    }

    /// Save configuration to disk using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;

        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, &config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "retake", "Retake").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get config directory".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    fn create_default() -> AppResult<Self> {
        let config = Config::default();
        config.save()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            controls: ControlsConfig {
                hotkey: DEFAULT_HOTKEY.to_string(),
            },
            audio: AudioConfig {
                selected_device: None,
            },
        }
    }
}
