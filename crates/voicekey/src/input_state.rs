/// Canonical state of the input-gesture machine.
///
/// Exactly one instance exists, owned by the state machine and mutated
/// only through its transition handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Waiting for a trigger-key press.
    Idle,
    /// Trigger held, dwell timer pending. Transient: never reported
    /// externally, leaves only to a recording state or back to Idle.
    Armed,
    /// Capturing audio for plain transcription.
    Recording,
    /// Capturing audio for transcribe-then-translate.
    RecordingTranslate,
    /// Capture finished, transcription request in flight.
    Processing,
    /// Capture finished, transcription + translation in flight.
    Translating,
    /// Transient warning message shown at the cursor, auto-clears.
    Warning,
    /// Transient error message shown at the cursor, auto-clears.
    Error,
}

impl InputState {
    /// Placeholder text shown at the cursor while this state is active.
    /// `None` for states that display nothing or a dynamic message.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            InputState::Recording => Some("🎤"),
            InputState::RecordingTranslate => Some("🎤🌐"),
            InputState::Processing => Some("🎤…"),
            InputState::Translating => Some("🌐…"),
            _ => None,
        }
    }

    /// Whether a transcription result is currently awaited.
    pub fn is_in_flight(self) -> bool {
        matches!(self, InputState::Processing | InputState::Translating)
    }
}
