//! Transient status text at the cursor.
//!
//! The overlay tracks exactly how many characters of placeholder text are
//! currently visible so a prior placeholder can be retracted
//! character-for-character before the next state's text (or the final
//! transcription) goes in. All operations run inside the state-machine
//! actor, which serializes them against each other and against state
//! transitions: they share one external cursor/clipboard resource.

use crate::{AppError, AppResult, PasteKeyGuard};

use std::{panic::Location, time::Duration};

use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Delay between clipboard write and paste simulation.
///
/// Gives the OS clipboard manager time to process the write before the
/// paste chord fires; 50ms is empirically reliable across Windows, macOS,
/// and Linux desktop environments.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Delay between key events in the paste simulation. Some applications
/// and input method editors need a small gap to register events.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// Cursor/clipboard primitives the overlay needs. Implemented by
/// [`EnigoInjector`] in production and by a recording fake in tests.
pub trait TextInjector: Send {
    /// Type `text` at the current cursor position.
    fn type_text(&mut self, text: &str) -> AppResult<()>;
    /// Delete the previous `count` characters at the cursor.
    fn delete_chars(&mut self, count: usize) -> AppResult<()>;
    /// Insert `text` via clipboard paste (used for final transcriptions,
    /// which may be long and contain characters typing would mangle).
    fn paste_text(&mut self, text: &str) -> AppResult<()>;
}

/// Tracks the placeholder currently visible at the cursor.
pub struct StatusOverlay<I> {
    injector: I,
    /// Character count of the last inserted placeholder. Reflects exactly
    /// what is visible: set after every insertion, zeroed after every
    /// retraction.
    inserted_len: usize,
}

impl<I: TextInjector> StatusOverlay<I> {
    /// Create an overlay with nothing shown.
    pub fn new(injector: I) -> Self {
        Self {
            injector,
            inserted_len: 0,
        }
    }

    /// Replace whatever placeholder is visible with `text`.
    #[instrument(skip(self, text))]
    pub fn show(&mut self, text: &str) -> AppResult<()> {
        self.retract()?;
        self.injector.type_text(text)?;
        self.inserted_len = text.chars().count();
        debug!(chars = self.inserted_len, "Placeholder shown");
        Ok(())
    }

    /// Remove the visible placeholder, character for character.
    #[instrument(skip(self))]
    pub fn retract(&mut self) -> AppResult<()> {
        if self.inserted_len > 0 {
            self.injector.delete_chars(self.inserted_len)?;
            debug!(chars = self.inserted_len, "Placeholder retracted");
            self.inserted_len = 0;
        }
        Ok(())
    }

    /// Retract the placeholder and paste the final text in its place.
    /// The pasted text is not tracked: it is the result, not a placeholder.
    #[instrument(skip(self, text))]
    pub fn insert_final(&mut self, text: &str) -> AppResult<()> {
        self.retract()?;
        self.injector.paste_text(text)
    }

    /// Character count of the currently visible placeholder.
    pub fn inserted_len(&self) -> usize {
        self.inserted_len
    }
}

/// Production injector: enigo keystroke synthesis plus arboard clipboard.
pub struct EnigoInjector {
    clipboard: Clipboard,
}

impl EnigoInjector {
    /// Create the injector, initializing the system clipboard.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to initialize clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(Self { clipboard })
    }

    // A fresh Enigo per operation: Enigo is !Send and cheap to construct,
    // so the injector itself stays Send for the actor.
    #[track_caller]
    fn enigo() -> AppResult<Enigo> {
        Enigo::new(&Settings::default()).map_err(|e| AppError::InjectionFailed {
            reason: format!("Failed to create Enigo: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl TextInjector for EnigoInjector {
    #[track_caller]
    fn type_text(&mut self, text: &str) -> AppResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        Self::enigo()?
            .text(text)
            .map_err(|e| AppError::InjectionFailed {
                reason: format!("Failed to type text: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    fn delete_chars(&mut self, count: usize) -> AppResult<()> {
        let mut enigo = Self::enigo()?;
        for _ in 0..count {
            enigo
                .key(Key::Backspace, Direction::Click)
                .map_err(|e| AppError::InjectionFailed {
                    reason: format!("Failed to press Backspace: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }
        Ok(())
    }

    #[track_caller]
    fn paste_text(&mut self, text: &str) -> AppResult<()> {
        self.clipboard
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(text_len = text.len(), "Text copied to clipboard");

        // Allow the clipboard manager to process the write before pasting,
        // otherwise the chord can paste stale content.
        std::thread::sleep(CLIPBOARD_SETTLE_DELAY);

        // RAII: the guard releases the paste modifier on drop even if the
        // 'v' press fails, so the keyboard is never left stuck.
        let mut guard = PasteKeyGuard::new()?;
        std::thread::sleep(KEY_EVENT_DELAY);
        guard
            .enigo_mut()
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| {
                warn!(error = %e, "Paste chord failed, text remains in clipboard");
                AppError::InjectionFailed {
                    reason: format!("Failed to press V: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;
        std::thread::sleep(KEY_EVENT_DELAY);

        Ok(())
    }
}
