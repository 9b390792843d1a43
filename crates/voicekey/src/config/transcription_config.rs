use crate::config::default_request_timeout_secs;

use serde::{Deserialize, Serialize};

/// Remote transcription/translation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Bearer token for the API. Empty until the user fills it in;
    /// validated lazily before the first dispatch.
    #[serde(default)]
    pub api_key: String,

    /// OpenAI-compatible base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Speech-to-text model for `audio/transcriptions`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat model used for translate mode.
    #[serde(default = "default_translate_model")]
    pub translate_model: String,

    /// Global HTTP timeout. Bounds how long a Processing/Translating
    /// placeholder can stay at the cursor.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            translate_model: default_translate_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "whisper-large-v3-turbo".to_string()
}

fn default_translate_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
