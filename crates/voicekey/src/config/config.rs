//! Configuration management for voicekey.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{GestureConfig, KeysConfig, TranscriptionConfig},
    key_listener::parse_key,
};

use std::{fs, io::Write, panic::Location, path::PathBuf, time::Duration};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Trigger/modifier key names.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Gesture timing.
    #[serde(default)]
    pub gesture: GestureConfig,
    /// Remote transcription service settings.
    #[serde(default)]
    pub transcription: TranscriptionConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    ///
    /// Note: This does NOT validate the API key. Call `validate_api_key()`
    /// before dispatching a recording, so the app can start (and the user
    /// can discover the config file location) before credentials exist.
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

    /// Validate that an API key is configured.
    ///
    /// Called lazily before the transcriber is built rather than at load
    /// time, so a fresh install can still launch and write the template
    /// config for the user to fill in.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_api_key(&self) -> AppResult<()> {
        if self.transcription.api_key.trim().is_empty() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "No API key configured. Set transcription.api_key in {:?}.",
                    Self::config_path()?
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Parse the configured trigger key name.
    #[track_caller]
    pub fn trigger_key(&self) -> AppResult<rdev::Key> {
        parse_key(&self.keys.trigger).ok_or_else(|| AppError::ConfigError {
            reason: format!("Unknown trigger key: {:?}", self.keys.trigger),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Parse the configured modifier key name.
    #[track_caller]
    pub fn modifier_key(&self) -> AppResult<rdev::Key> {
        parse_key(&self.keys.modifier).ok_or_else(|| AppError::ConfigError {
            reason: format!("Unknown modifier key: {:?}", self.keys.modifier),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Dwell threshold as a [`Duration`].
    pub fn dwell_threshold(&self) -> Duration {
        Duration::from_millis(self.gesture.dwell_threshold_ms)
    }

    /// Message auto-clear delay as a [`Duration`].
    pub fn message_clear_delay(&self) -> Duration {
        Duration::from_millis(self.gesture.message_clear_ms)
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
        let proj_dirs = ProjectDirs::from("com", "voicekey", "Voicekey").ok_or_else(|| {
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

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let config = Config::default();
        config.save()?;

        warn!("Default config created. An API key must be configured before recording.");

        Ok(config)
    }
}
