//! Input-gesture state machine.
//!
//! Owns the canonical [`InputState`], the single press context, and the
//! current capture session. Every mutation happens inside one actor task
//! that drains the [`InputEvent`] inbox, so key edges from the rdev
//! thread, dwell fires from the timer task, transcription outcomes from
//! the blocking HTTP task, and message clears never race: a late dwell
//! fire or a stray transcription result is re-validated here and dropped.

use crate::{
    GestureTimer, InputEvent, InputState, StatusOverlay, TextInjector,
    transcribe::{Transcribe, TranscribeMode},
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use voicekey_core::{AudioBlob, CaptureSession, CoreResult};

/// Capture seam between the state machine and the microphone.
///
/// Production uses [`CaptureSession`]; tests substitute a fake so gesture
/// logic is verifiable without an input device.
pub trait Recorder: Send {
    /// Begin appending frames.
    fn start(&mut self) -> CoreResult<()>;
    /// Finalize the capture. `None` when inactive or no frames arrived.
    fn stop(&mut self) -> Option<AudioBlob>;
}

impl Recorder for CaptureSession {
    fn start(&mut self) -> CoreResult<()> {
        CaptureSession::start(self)
    }

    fn stop(&mut self) -> Option<AudioBlob> {
        CaptureSession::stop(self)
    }
}

/// Creates a fresh recorder per recording-state entry.
pub type RecorderFactory = Box<dyn Fn() -> CoreResult<Box<dyn Recorder>> + Send>;

/// The one in-flight trigger press. Created on trigger-down, destroyed on
/// trigger-up or when a fired recording finishes. At most one exists; a
/// key-down while one is active is debounced upstream and ignored here.
#[derive(Debug)]
struct PressContext {
    id: Uuid,
    pressed_at: Instant,
    /// Modifier state at key-down. Informational: mode selection latches
    /// the modifier at fire time (see [`InputStateMachine::on_dwell_elapsed`]),
    /// this field only lets log traces show when the two differ.
    modifier_at_press: bool,
    fired: bool,
}

/// State machine driving the hold-to-dictate gesture.
pub struct InputStateMachine<I> {
    state: InputState,
    press: Option<PressContext>,
    trigger_held: bool,
    modifier_held: bool,
    recorder: Option<Box<dyn Recorder>>,
    make_recorder: RecorderFactory,
    overlay: StatusOverlay<I>,
    transcriber: Arc<dyn Transcribe>,
    timer: GestureTimer,
    event_tx: mpsc::Sender<InputEvent>,
    dwell_threshold: Duration,
    message_clear_delay: Duration,
    /// Bumped on every shown warning/error; a scheduled clear carrying an
    /// older epoch has been preempted and is ignored.
    message_epoch: u64,
}

impl<I: TextInjector> InputStateMachine<I> {
    /// Build a machine in `Idle` with no press context.
    pub fn new(
        overlay: StatusOverlay<I>,
        transcriber: Arc<dyn Transcribe>,
        make_recorder: RecorderFactory,
        event_tx: mpsc::Sender<InputEvent>,
        dwell_threshold: Duration,
        message_clear_delay: Duration,
    ) -> Self {
        Self {
            state: InputState::Idle,
            press: None,
            trigger_held: false,
            modifier_held: false,
            recorder: None,
            make_recorder,
            overlay,
            transcriber,
            timer: GestureTimer::new(),
            event_tx,
            dwell_threshold,
            message_clear_delay,
            message_epoch: 0,
        }
    }

    /// Current state. `Armed` leaks through here only to tests; callers
    /// outside this crate never observe it.
    pub fn state(&self) -> InputState {
        self.state
    }

    /// Overlay access for inspection.
    pub fn overlay(&self) -> &StatusOverlay<I> {
        &self.overlay
    }

    /// Dispatch one inbox message.
    #[instrument(skip(self), fields(state = ?self.state))]
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::TriggerPressed => self.on_trigger_pressed(),
            InputEvent::TriggerReleased => self.on_trigger_released(),
            InputEvent::ModifierPressed => self.modifier_held = true,
            InputEvent::ModifierReleased => self.on_modifier_released(),
            InputEvent::DwellElapsed { press_id } => self.on_dwell_elapsed(press_id),
            InputEvent::TranscriptionDone {
                session_id,
                outcome,
            } => self.on_transcription_done(session_id, outcome),
            InputEvent::ClearMessage { epoch } => self.on_clear_message(epoch),
            // Shutdown is the app loop's concern; nothing to do here.
            InputEvent::Shutdown => {}
        }
    }

    fn on_trigger_pressed(&mut self) {
        self.trigger_held = true;

        if self.state != InputState::Idle || self.press.is_some() {
            debug!(state = ?self.state, "Trigger press ignored");
            return;
        }

        let press = PressContext {
            id: Uuid::new_v4(),
            pressed_at: Instant::now(),
            modifier_at_press: self.modifier_held,
            fired: false,
        };

        info!(
            press_id = %press.id,
            modifier_at_press = press.modifier_at_press,
            "Trigger pressed, dwell timer armed"
        );

        self.timer
            .arm(press.id, self.dwell_threshold, self.event_tx.clone());
        self.press = Some(press);
        self.state = InputState::Armed;
    }

    fn on_dwell_elapsed(&mut self, press_id: Uuid) {
        // Re-validate everything under the actor: a fire racing a cancel,
        // or one that outlived its press, must not re-enter a recording
        // state on an idle machine.
        let valid = self.state == InputState::Armed
            && self.trigger_held
            && self
                .press
                .as_ref()
                .is_some_and(|p| p.id == press_id && !p.fired);
        if !valid {
            debug!(%press_id, state = ?self.state, "Stale dwell fire ignored");
            return;
        }

        if let Some(press) = self.press.as_mut() {
            press.fired = true;
            if press.modifier_at_press != self.modifier_held {
                debug!(%press_id, "Modifier changed between press and fire");
            }
        }

        // Modifier is latched now, at fire time, not at key-down.
        let recording_state = if self.modifier_held {
            InputState::RecordingTranslate
        } else {
            InputState::Recording
        };

        match (self.make_recorder)().and_then(|mut r| r.start().map(|()| r)) {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                self.state = recording_state;
                info!(session_id = %press_id, state = ?recording_state, "Recording started");
                if let Some(text) = recording_state.placeholder() {
                    self.show_placeholder(text);
                }
            }
            Err(e) => {
                error!(session_id = %press_id, error = ?e, "Failed to start capture");
                self.press = None;
                self.show_message(InputState::Warning, "⚠ microphone unavailable");
            }
        }
    }

    fn on_trigger_released(&mut self) {
        self.trigger_held = false;
        self.timer.cancel();

        match self.state {
            InputState::Armed => {
                // Released before the threshold: taps never record.
                if let Some(press) = self.press.take() {
                    debug!(
                        press_id = %press.id,
                        held_ms = press.pressed_at.elapsed().as_millis(),
                        "Tap below dwell threshold"
                    );
                }
                self.state = InputState::Idle;
            }
            InputState::Recording => self.finish_recording(TranscribeMode::Plain),
            InputState::RecordingTranslate => self.finish_recording(TranscribeMode::Translate),
            _ => {}
        }
    }

    fn on_modifier_released(&mut self) {
        self.modifier_held = false;

        // Releasing the modifier first while the trigger is still held
        // ends the translate recording through the same stop path a
        // trigger release would take, preserving the capture as-is.
        let fired = self.press.as_ref().is_some_and(|p| p.fired);
        if self.state == InputState::RecordingTranslate && self.trigger_held && fired {
            self.timer.cancel();
            self.finish_recording(TranscribeMode::Translate);
        }
    }

    fn finish_recording(&mut self, mode: TranscribeMode) {
        let Some(press) = self.press.take() else {
            warn!("finish_recording without press context");
            return;
        };
        let session_id = press.id;

        let blob = self.recorder.take().and_then(|mut r| r.stop());
        let Some(blob) = blob else {
            // Zero frames captured: nothing to transcribe, no warning.
            // Take the placeholder back and return to idle.
            warn!(session_id = %session_id, "Empty capture");
            self.retract_placeholder();
            self.state = InputState::Idle;
            return;
        };

        let next = match mode {
            TranscribeMode::Plain => InputState::Processing,
            TranscribeMode::Translate => InputState::Translating,
        };
        self.state = next;
        if let Some(text) = next.placeholder() {
            self.show_placeholder(text);
        }

        info!(
            session_id = %session_id,
            samples = blob.len(),
            duration_secs = blob.duration_secs(),
            ?mode,
            "Capture dispatched for transcription"
        );

        self.dispatch_transcription(session_id, blob, mode);
    }

    /// Fire-and-forget: the blocking HTTP call runs off the actor and
    /// funnels its outcome back through the inbox.
    fn dispatch_transcription(&self, session_id: Uuid, blob: AudioBlob, mode: TranscribeMode) {
        let transcriber = Arc::clone(&self.transcriber);
        let tx = self.event_tx.clone();

        tokio::task::spawn_blocking(move || {
            let outcome = transcriber
                .transcribe(&blob, mode)
                .map_err(|e| e.to_string());
            let done = InputEvent::TranscriptionDone {
                session_id,
                outcome,
            };
            if tx.blocking_send(done).is_err() {
                warn!(%session_id, "Inbox closed, transcription result dropped");
            }
        });
    }

    fn on_transcription_done(&mut self, session_id: Uuid, outcome: Result<String, String>) {
        if !self.state.is_in_flight() {
            debug!(%session_id, state = ?self.state, "Stray transcription result ignored");
            return;
        }

        match outcome {
            Err(reason) => {
                error!(%session_id, error = %reason, "Transcription failed");
                self.show_message(InputState::Error, "✗ transcription failed");
            }
            Ok(text) if text.is_empty() => {
                warn!(%session_id, "Empty transcription");
                self.show_message(InputState::Warning, "⚠ recording too short");
            }
            Ok(text) => {
                info!(%session_id, text_len = text.len(), "Transcription injected");
                if let Err(e) = self.overlay.insert_final(&text) {
                    error!(error = ?e, "Failed to inject final text");
                }
                self.state = InputState::Idle;
            }
        }
    }

    /// Show a transient warning/error and schedule its removal. A newer
    /// message bumps the epoch, preempting older scheduled clears.
    fn show_message(&mut self, state: InputState, text: &str) {
        self.show_placeholder(text);
        self.state = state;
        self.message_epoch += 1;

        let epoch = self.message_epoch;
        let delay = self.message_clear_delay;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(InputEvent::ClearMessage { epoch }).await;
        });
    }

    fn on_clear_message(&mut self, epoch: u64) {
        if epoch != self.message_epoch {
            debug!(epoch, current = self.message_epoch, "Stale message clear ignored");
            return;
        }
        if matches!(self.state, InputState::Warning | InputState::Error) {
            self.retract_placeholder();
            self.state = InputState::Idle;
        }
    }

    // Overlay failures must not wedge the machine: the placeholder is
    // cosmetic, the state transition is not.
    fn show_placeholder(&mut self, text: &str) {
        if let Err(e) = self.overlay.show(text) {
            error!(error = ?e, "Failed to update overlay");
        }
    }

    fn retract_placeholder(&mut self) {
        if let Err(e) = self.overlay.retract() {
            error!(error = ?e, "Failed to retract overlay");
        }
    }
}

/// Convenience for wiring the production capture session in as the
/// recorder factory.
pub fn capture_session_factory() -> RecorderFactory {
    Box::new(|| {
        let session = CaptureSession::new()?;
        Ok(Box::new(session) as Box<dyn Recorder>)
    })
}
