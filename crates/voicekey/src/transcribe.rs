//! Remote transcription and translation over an OpenAI-compatible API.
//!
//! The capture blob is uploaded as a WAV to `audio/transcriptions`;
//! translate mode chains a `chat/completions` call that renders the
//! transcript into English. Both calls are blocking (`ureq`) and run on a
//! `spawn_blocking` task; the agent carries a global timeout so a result,
//! success or failure, always comes back in bounded time and the
//! in-flight placeholder always clears.

use crate::{AppError, AppResult, config::TranscriptionConfig};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use voicekey_core::AudioBlob;

/// Which pipeline the recording goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeMode {
    /// Transcribe in the spoken language.
    Plain,
    /// Transcribe, then translate into English.
    Translate,
}

/// Transcription boundary. Must deliver exactly one outcome per blob
/// within the agent's timeout; the state machine treats dispatch as
/// fire-and-forget and only reacts to the delivered outcome.
pub trait Transcribe: Send + Sync {
    /// Transcribe (and optionally translate) one finished capture.
    fn transcribe(&self, blob: &AudioBlob, mode: TranscribeMode) -> AppResult<String>;
}

const TRANSLATE_SYSTEM_PROMPT: &str = "You are a translation assistant. \
    Translate the user's input into English. Reply with the translation only.";

/// Whisper-style HTTP transcriber against a Groq/OpenAI-compatible base URL.
pub struct RemoteTranscriber {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    model: String,
    translate_model: String,
}

impl RemoteTranscriber {
    /// Build a transcriber from config. The request timeout applies to
    /// every call the transcriber makes.
    pub fn new(config: &TranscriptionConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.request_timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            translate_model: config.translate_model.clone(),
        }
    }

    /// Upload a WAV as multipart form data and return the raw transcript.
    #[track_caller]
    #[instrument(skip(self, wav_data))]
    fn upload_transcription(&self, wav_data: Vec<u8>) -> AppResult<String> {
        let boundary = format!(
            "----VoicekeyBoundary{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
        );

        let mut body = Vec::new();

        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"model\"\r\n\r\n");
        body.extend_from_slice(self.model.as_bytes());
        body.extend_from_slice(b"\r\n");

        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"response_format\"\r\n\r\n");
        body.extend_from_slice(b"json\r\n");

        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"audio.wav\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
        body.extend_from_slice(&wav_data);
        body.extend_from_slice(b"\r\n");

        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        let response = self
            .agent
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .send(&body[..])
            .map_err(|e| AppError::TranscriptionFailed {
                reason: format!("Transcription request failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let json: serde_json::Value =
            response
                .into_body()
                .read_json()
                .map_err(|e| AppError::TranscriptionFailed {
                    reason: format!("Failed to parse transcription response: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AppError::TranscriptionFailed {
                reason: format!("Transcription response missing text field: {}", json),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(text.trim().to_string())
    }

    /// Render a transcript into English via `chat/completions`.
    #[track_caller]
    #[instrument(skip(self, text))]
    fn translate(&self, text: &str) -> AppResult<String> {
        let payload = serde_json::json!({
            "model": self.translate_model,
            "messages": [
                { "role": "system", "content": TRANSLATE_SYSTEM_PROMPT },
                { "role": "user", "content": text }
            ]
        });

        let response = self
            .agent
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(payload)
            .map_err(|e| AppError::TranscriptionFailed {
                reason: format!("Translation request failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let json: serde_json::Value =
            response
                .into_body()
                .read_json()
                .map_err(|e| AppError::TranscriptionFailed {
                    reason: format!("Failed to parse translation response: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

        let translated = json
            .pointer("/choices/0/message/content")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AppError::TranscriptionFailed {
                reason: format!("Translation response missing content: {}", json),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(translated.trim().to_string())
    }
}

impl Transcribe for RemoteTranscriber {
    #[instrument(skip(self, blob), fields(duration_secs = blob.duration_secs(), mode = ?mode))]
    fn transcribe(&self, blob: &AudioBlob, mode: TranscribeMode) -> AppResult<String> {
        let wav_data = blob.to_wav_bytes()?;
        debug!(wav_bytes = wav_data.len(), "Capture encoded for upload");

        let start = std::time::Instant::now();
        let text = self.upload_transcription(wav_data)?;
        info!(
            duration_ms = start.elapsed().as_millis(),
            text_len = text.len(),
            "Transcription complete"
        );

        if mode == TranscribeMode::Plain || text.is_empty() {
            if text.is_empty() {
                warn!("Transcriber returned empty text");
            }
            return Ok(text);
        }

        let translated = self.translate(&text)?;
        info!(text_len = translated.len(), "Translation complete");
        Ok(translated)
    }
}
