//! Voicekey Core Library
//!
//! Push-to-talk microphone capture: open the default input device, buffer
//! callback frames while a session is active, and finalize them into a
//! single mono [`AudioBlob`] on stop.
//!
//! # Example
//!
//! ```no_run
//! use voicekey_core::{CaptureSession, CoreResult};
//!
//! use std::{thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let mut session = CaptureSession::new()?;
//!
//!     session.start()?;
//!     sleep(Duration::from_secs(3));
//!
//!     if let Some(blob) = session.stop() {
//!         println!("Captured {} samples at {} Hz", blob.len(), blob.sample_rate());
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;

pub use {
    audio::{AudioBlob, CaptureSession},
    error::{AudioError, Result as CoreResult},
};

#[cfg(test)]
mod tests;
