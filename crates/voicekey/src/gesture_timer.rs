//! Dwell timer that decides when a held trigger key becomes a recording.
//!
//! Polls on a fixed tick instead of a single deferred sleep: the decision
//! about which recording mode to enter must read live key/modifier state
//! at fire time, and the state machine does that when it handles the
//! [`InputEvent::DwellElapsed`] message — the timer only reports that the
//! threshold has passed for a specific press.

use crate::InputEvent;

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::{debug, trace};
use uuid::Uuid;

/// Poll interval. Coarse enough to stay cooperative, fine enough that a
/// fire lands within ~100ms of the threshold.
const TICK: Duration = Duration::from_millis(100);

/// At most one armed timer exists: the state machine never arms a second
/// one before the first fired or was cancelled.
#[derive(Default)]
pub struct GestureTimer {
    handle: Option<JoinHandle<()>>,
}

impl GestureTimer {
    /// Create an unarmed timer.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Arm the timer for a press. After `threshold` has elapsed a single
    /// [`InputEvent::DwellElapsed`] tagged with `press_id` is sent into
    /// the inbox; the handler re-validates everything under its own
    /// serialization, so a fire racing a cancel is harmless.
    pub fn arm(&mut self, press_id: Uuid, threshold: Duration, tx: mpsc::Sender<InputEvent>) {
        self.cancel();

        let armed_at = Instant::now();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK);
            // The first interval tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if armed_at.elapsed() >= threshold {
                    trace!(%press_id, "Dwell threshold reached");
                    let _ = tx.send(InputEvent::DwellElapsed { press_id }).await;
                    break;
                }
            }
        }));

        debug!(%press_id, threshold_ms = threshold.as_millis(), "Gesture timer armed");
    }

    /// Cancel a pending fire. Idempotent: cancelling twice, or after the
    /// timer already fired, has no observable effect the second time.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Gesture timer cancelled");
        }
    }

    /// Whether a fire is still pending (best effort: a finished task
    /// counts as unarmed).
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for GestureTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
