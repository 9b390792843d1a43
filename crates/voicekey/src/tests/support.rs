//! Shared fakes for gesture and overlay tests: a recording injector, a
//! scripted recorder, and a scripted transcriber. No real device,
//! desktop, or network involved.

use crate::{
    AppError, AppResult, TextInjector,
    state_machine::{Recorder, RecorderFactory},
    transcribe::{Transcribe, TranscribeMode},
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use voicekey_core::{AudioBlob, AudioError, CoreResult};

/// One observed injector operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectorOp {
    Type(String),
    Delete(usize),
    Paste(String),
}

/// Injector that records every operation instead of touching the desktop.
#[derive(Clone, Default)]
pub struct FakeInjector {
    ops: Arc<Mutex<Vec<InjectorOp>>>,
}

impl FakeInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<InjectorOp> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, op: InjectorOp) {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
    }
}

impl TextInjector for FakeInjector {
    fn type_text(&mut self, text: &str) -> AppResult<()> {
        self.push(InjectorOp::Type(text.to_string()));
        Ok(())
    }

    fn delete_chars(&mut self, count: usize) -> AppResult<()> {
        self.push(InjectorOp::Delete(count));
        Ok(())
    }

    fn paste_text(&mut self, text: &str) -> AppResult<()> {
        self.push(InjectorOp::Paste(text.to_string()));
        Ok(())
    }
}

/// Shared counters observing recorder lifecycle across the factory seam.
#[derive(Clone, Default)]
pub struct RecorderProbe {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl RecorderProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Recorder returning a scripted blob (or `None` for an empty capture).
pub struct FakeRecorder {
    probe: RecorderProbe,
    blob: Option<AudioBlob>,
}

impl Recorder for FakeRecorder {
    fn start(&mut self) -> CoreResult<()> {
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Option<AudioBlob> {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        self.blob.take()
    }
}

/// Factory producing [`FakeRecorder`]s that yield `blob` on stop.
pub fn fake_recorder_factory(probe: RecorderProbe, blob: Option<AudioBlob>) -> RecorderFactory {
    Box::new(move || {
        Ok(Box::new(FakeRecorder {
            probe: probe.clone(),
            blob: blob.clone(),
        }) as Box<dyn Recorder>)
    })
}

/// Factory whose device always fails to open.
pub fn failing_recorder_factory() -> RecorderFactory {
    Box::new(|| {
        Err(AudioError::DeviceError {
            reason: "no such device".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    })
}

/// Transcriber returning a scripted outcome.
pub struct FakeTranscriber {
    outcome: Result<String, String>,
    /// Mode observed on the last call.
    pub seen_mode: Mutex<Option<TranscribeMode>>,
}

impl FakeTranscriber {
    pub fn ok(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            seen_mode: Mutex::new(None),
        }
    }

    pub fn err(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            seen_mode: Mutex::new(None),
        }
    }
}

impl Transcribe for FakeTranscriber {
    fn transcribe(&self, _blob: &AudioBlob, mode: TranscribeMode) -> AppResult<String> {
        *self
            .seen_mode
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(mode);
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(AppError::TranscriptionFailed {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// A small non-empty blob for happy-path captures.
pub fn sample_blob() -> AudioBlob {
    AudioBlob::new(vec![0.1f32; 1600], 16_000)
}
