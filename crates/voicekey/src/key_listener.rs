//! Global key listener backed by `rdev`.
//!
//! `rdev::listen()` is a blocking OS-level call that never returns while
//! the process is alive, so it runs on a dedicated OS thread. The callback
//! reduces the raw event stream to press/release *edges* for the two keys
//! we care about (OS auto-repeat re-delivers KeyPress while a key is held)
//! and forwards them into the state machine's inbox.

use crate::{AppError, AppResult, InputEvent};

use std::panic::Location;

use error_location::ErrorLocation;
use rdev::{Event, EventType, Key};
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};

/// Handle for the listener thread. The thread cannot be joined (rdev has
/// no graceful shutdown API); it dies with the process.
pub struct KeyListener;

impl KeyListener {
    /// Spawn the dedicated listener thread.
    ///
    /// On listen failure (almost always missing Accessibility permission
    /// on macOS) the thread logs remediation guidance and requests
    /// shutdown through the inbox.
    #[track_caller]
    pub fn spawn(trigger: Key, modifier: Key, tx: mpsc::Sender<InputEvent>) -> AppResult<()> {
        std::thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                info!(?trigger, ?modifier, "Key listener thread started");

                let event_tx = tx.clone();
                let mut trigger_down = false;
                let mut modifier_down = false;

                let result = rdev::listen(move |event: Event| {
                    let forwarded = match event.event_type {
                        EventType::KeyPress(key) if key == trigger && !trigger_down => {
                            trigger_down = true;
                            Some(InputEvent::TriggerPressed)
                        }
                        EventType::KeyRelease(key) if key == trigger && trigger_down => {
                            trigger_down = false;
                            Some(InputEvent::TriggerReleased)
                        }
                        EventType::KeyPress(key) if key == modifier && !modifier_down => {
                            modifier_down = true;
                            Some(InputEvent::ModifierPressed)
                        }
                        EventType::KeyRelease(key) if key == modifier && modifier_down => {
                            modifier_down = false;
                            Some(InputEvent::ModifierReleased)
                        }
                        _ => None,
                    };

                    if let Some(input_event) = forwarded {
                        trace!(?input_event, "Key edge");
                        if event_tx.blocking_send(input_event).is_err() {
                            // Inbox closed: the app is shutting down, the
                            // thread just discards events from here on.
                            warn!("Input channel closed, discarding key events");
                        }
                    }
                });

                if let Err(e) = result {
                    error!(error = ?e, "Key listening failed");
                    log_accessibility_guidance();
                    let _ = tx.blocking_send(InputEvent::Shutdown);
                }
            })
            .map_err(|e| AppError::KeyListenerFailed {
                reason: format!("Failed to spawn listener thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }
}

/// Walk the user through granting input-monitoring permission. Key
/// listening cannot work without it and there is nothing to retry.
fn log_accessibility_guidance() {
    warn!("=== Input monitoring permission required ===");
    warn!("This app needs permission to observe keyboard events.");
    warn!("On macOS: System Settings -> Privacy & Security -> Accessibility,");
    warn!("unlock, and enable your terminal (or this binary), then restart.");
    warn!("On Linux: the user must be in the 'input' group or run under X11.");
    warn!("============================================");
}

/// Parse a key name from config into an [`rdev::Key`].
///
/// Covers the keys that make sense as a push-to-talk trigger or mode
/// modifier. Returns `None` for unrecognised names so the caller can
/// report a config error.
pub fn parse_key(name: &str) -> Option<Key> {
    match name {
        "Alt" | "AltLeft" | "Option" => Some(Key::Alt),
        "AltGr" | "AltRight" => Some(Key::AltGr),
        "ControlLeft" | "Ctrl" => Some(Key::ControlLeft),
        "ControlRight" => Some(Key::ControlRight),
        "ShiftLeft" | "Shift" => Some(Key::ShiftLeft),
        "ShiftRight" => Some(Key::ShiftRight),
        "MetaLeft" | "Cmd" | "Super" => Some(Key::MetaLeft),
        "MetaRight" => Some(Key::MetaRight),
        "CapsLock" => Some(Key::CapsLock),
        "Space" => Some(Key::Space),
        "F1" => Some(Key::F1),
        "F2" => Some(Key::F2),
        "F3" => Some(Key::F3),
        "F4" => Some(Key::F4),
        "F5" => Some(Key::F5),
        "F6" => Some(Key::F6),
        "F7" => Some(Key::F7),
        "F8" => Some(Key::F8),
        "F9" => Some(Key::F9),
        "F10" => Some(Key::F10),
        "F11" => Some(Key::F11),
        "F12" => Some(Key::F12),
        _ => None,
    }
}
