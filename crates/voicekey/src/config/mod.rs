mod config;
mod gesture_config;
mod keys_config;
mod transcription_config;

pub(crate) use {
    config::Config, gesture_config::GestureConfig, keys_config::KeysConfig,
    transcription_config::TranscriptionConfig,
};

pub(crate) const DEFAULT_DWELL_THRESHOLD_MS: u64 = 500;
pub(crate) const DEFAULT_MESSAGE_CLEAR_MS: u64 = 2000;
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

pub(crate) fn default_dwell_threshold_ms() -> u64 {
    DEFAULT_DWELL_THRESHOLD_MS
}

pub(crate) fn default_message_clear_ms() -> u64 {
    DEFAULT_MESSAGE_CLEAR_MS
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
