use serde::{Deserialize, Serialize};

/// Trigger and modifier key names, parsed via
/// [`crate::key_listener::parse_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Key whose hold-gesture starts and stops capture.
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Key that, if held when the dwell threshold fires, selects
    /// translate mode.
    #[serde(default = "default_modifier")]
    pub modifier: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            modifier: default_modifier(),
        }
    }
}

fn default_trigger() -> String {
    // Left Option/Alt, matching the classic hold-Option-to-dictate gesture.
    "Alt".to_string()
}

fn default_modifier() -> String {
    "ShiftLeft".to_string()
}
