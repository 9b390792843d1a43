use uuid::Uuid;

/// Messages funneled into the state machine's single serialized inbox.
///
/// Key edges come from the rdev listener thread, dwell fires from the
/// gesture timer task, transcription outcomes from the blocking HTTP
/// task, clears from the message timer. Serializing them through one
/// channel is what makes the state machine race-free.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// The trigger key went down (edge, auto-repeat filtered).
    TriggerPressed,
    /// The trigger key went up.
    TriggerReleased,
    /// The modifier key went down.
    ModifierPressed,
    /// The modifier key went up.
    ModifierReleased,
    /// The dwell threshold elapsed for the identified press.
    DwellElapsed {
        /// Press this fire belongs to; stale fires are discarded.
        press_id: Uuid,
    },
    /// The transcriber finished for the identified session.
    TranscriptionDone {
        /// Recording session the outcome belongs to.
        session_id: Uuid,
        /// Transcribed text, or a human-readable failure.
        outcome: Result<String, String>,
    },
    /// A warning/error message's display window expired.
    ClearMessage {
        /// Epoch the clear was scheduled for; stale clears are discarded.
        epoch: u64,
    },
    /// Request application shutdown.
    Shutdown,
}
