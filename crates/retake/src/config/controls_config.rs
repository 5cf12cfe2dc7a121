use serde::{Deserialize, Serialize};

/// Toggle control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Shortcut mirroring the record toggle, in `global-hotkey` syntax
    /// (for example `"Space"` or `"Control+Shift+Space"`).
    #[serde(default = "crate::config::default_hotkey")]
    pub hotkey: String,
}
