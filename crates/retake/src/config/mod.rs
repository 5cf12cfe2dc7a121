mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod controls_config;

pub(crate) use {audio_config::AudioConfig, config::Config, controls_config::ControlsConfig};

pub(crate) const DEFAULT_HOTKEY: &str = "Space";

pub(crate) fn default_hotkey() -> String {
    DEFAULT_HOTKEY.to_string()
}
