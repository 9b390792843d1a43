//! Voicekey: push-to-talk voice input at the keyboard cursor.
//!
//! Hold the trigger key past the dwell threshold to record; release to
//! transcribe and insert the text where the cursor is. Hold the modifier
//! too and the transcript is translated to English first.

mod app;
mod config;
mod error;
mod gesture_timer;
mod input_event;
mod input_state;
mod key_listener;
mod overlay;
mod paste_guard;
mod state_machine;
#[cfg(test)]
mod tests;
mod transcribe;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    gesture_timer::GestureTimer,
    input_event::InputEvent,
    input_state::InputState,
    key_listener::KeyListener,
    overlay::{EnigoInjector, StatusOverlay, TextInjector},
    paste_guard::PasteKeyGuard,
    state_machine::InputStateMachine,
    transcribe::{RemoteTranscriber, Transcribe},
};

use crate::config::Config;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

/// Application entry point.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("voicekey=debug")
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate_api_key() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let (trigger, modifier) = match (config.trigger_key(), config.modifier_key()) {
        (Ok(t), Ok(m)) => (t, m),
        (Err(e), _) | (_, Err(e)) => {
            error!("Key configuration invalid: {:?}", e);
            std::process::exit(1);
        }
    };

    let injector = match EnigoInjector::new() {
        Ok(i) => i,
        Err(e) => {
            error!("Failed to create text injector: {:?}", e);
            std::process::exit(1);
        }
    };

    let transcriber: Arc<dyn Transcribe> =
        Arc::new(RemoteTranscriber::new(&config.transcription));

    let (event_tx, event_rx) = mpsc::channel(64);

    if let Err(e) = KeyListener::spawn(trigger, modifier, event_tx.clone()) {
        error!("Failed to start key listener: {:?}", e);
        std::process::exit(1);
    }

    let machine = InputStateMachine::new(
        StatusOverlay::new(injector),
        transcriber,
        state_machine::capture_session_factory(),
        event_tx,
        config.dwell_threshold(),
        config.message_clear_delay(),
    );

    info!(
        trigger = %config.keys.trigger,
        modifier = %config.keys.modifier,
        "Hold the trigger key to dictate, add the modifier to translate"
    );

    if let Err(e) = App::new(machine, event_rx).run().await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
