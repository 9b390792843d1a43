use crate::config::{default_dwell_threshold_ms, default_message_clear_ms};

use serde::{Deserialize, Serialize};

/// Gesture timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum hold duration before a capture session starts. Releases
    /// below this are taps and record nothing.
    #[serde(default = "default_dwell_threshold_ms")]
    pub dwell_threshold_ms: u64,

    /// How long warning/error messages stay at the cursor before
    /// auto-clearing.
    #[serde(default = "default_message_clear_ms")]
    pub message_clear_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dwell_threshold_ms: default_dwell_threshold_ms(),
            message_clear_ms: default_message_clear_ms(),
        }
    }
}
