use crate::{AudioBlob, AudioError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Preferred capture rate. Whisper-style transcription endpoints expect
/// 16kHz mono; devices that cannot provide it record at their default
/// rate and the WAV header carries whatever was negotiated.
pub(crate) const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Maximum samples to buffer (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// One push-to-talk capture session over the default input device.
///
/// Frames arrive on the cpal callback thread and are appended to a shared
/// buffer only while the session is active. [`CaptureSession::stop`]
/// finalizes the buffer into a single [`AudioBlob`], concatenated in
/// delivery order.
pub struct CaptureSession {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// `true` between a successful `start()` and the matching `stop()`.
    /// The audio callback checks this before writing, so once `stop()`
    /// clears it no in-flight callback can append after the buffer is
    /// drained — even if a backend fires one more callback while the
    /// stream is being torn down.
    active: Arc<AtomicBool>,
}

impl CaptureSession {
    /// Open the default input device and negotiate a capture config.
    ///
    /// Prefers [`TARGET_SAMPLE_RATE`]; falls back to the device default
    /// rate when the target is outside every supported range.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = negotiate_config(&device)?;

        info!(
            sample_rate = config.sample_rate,
            channels = config.channels,
            "CaptureSession initialized"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES))),
            active: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start capturing from the device.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::DeviceError`] if the session is already
    /// active or the input stream cannot be built or started.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.active.load(Ordering::Acquire) {
            return Err(AudioError::DeviceError {
                reason: "Capture session already active".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let samples = Arc::clone(&self.samples);
        let active = Arc::clone(&self.active);
        let channels = self.config.channels as usize;

        samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        // Mark active before play() so the very first callback is counted.
        self.active.store(true, Ordering::Release);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !active.load(Ordering::Acquire) {
                        return;
                    }
                    // Recover from lock poison rather than silently dropping
                    // audio; the VecDeque itself is still valid.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    mix_into(&mut buf, data, channels);
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                self.active.store(false, Ordering::Release);
                AudioError::DeviceError {
                    reason: format!("Failed to build stream: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        stream.play().map_err(|e| {
            self.active.store(false, Ordering::Release);
            AudioError::DeviceError {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Stop capturing and return the finished blob.
    ///
    /// Idempotent: returns `None` if the session is already inactive or
    /// if the device never delivered a frame (a release arriving within
    /// milliseconds of start).
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> Option<AudioBlob> {
        // swap() makes a second stop() observe inactive and bail, and
        // stops the callback writing before the stream is torn down.
        if !self.active.swap(false, Ordering::AcqRel) {
            debug!("stop() on inactive session");
            return None;
        }

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Brief yield so an in-flight callback observes the cleared
            // active flag before the buffer is drained. Most backends
            // join the audio thread in drop(), but not all guarantee it.
            std::thread::sleep(std::time::Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples: Vec<f32> = {
            let mut buf = self.samples.lock().unwrap_or_else(|e| {
                error!("Sample buffer lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            buf.drain(..).collect()
        };

        if samples.is_empty() {
            warn!("No audio frames captured");
            return None;
        }

        debug!(sample_count = samples.len(), "Capture finalized");

        Some(AudioBlob::new(samples, self.config.sample_rate))
    }

    /// Negotiated sample rate for this session.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Whether the session is currently appending frames.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Append one callback delivery, mixed down to mono.
///
/// Interleaved multi-channel frames are averaged into one sample each so
/// the finished blob is always single-channel regardless of what the
/// device negotiated.
pub(crate) fn mix_into(buf: &mut VecDeque<f32>, data: &[f32], channels: usize) {
    if channels <= 1 {
        buf.extend(data.iter().copied());
        return;
    }
    for frame in data.chunks_exact(channels) {
        buf.push_back(frame.iter().sum::<f32>() / channels as f32);
    }
}

/// Pick a capture config: mono at [`TARGET_SAMPLE_RATE`] when any
/// supported range covers it, otherwise the device default. Channel count
/// stays whatever the device reports; the callback mixes down.
#[track_caller]
fn negotiate_config(device: &Device) -> CoreResult<StreamConfig> {
    let default = device
        .default_input_config()
        .map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to get config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let mut config: StreamConfig = default.into();

    match device.supported_input_configs() {
        Ok(ranges) => {
            let supports_target = ranges.into_iter().any(|r| {
                r.min_sample_rate() <= TARGET_SAMPLE_RATE
                    && r.max_sample_rate() >= TARGET_SAMPLE_RATE
            });
            if supports_target {
                config.sample_rate = TARGET_SAMPLE_RATE;
            } else {
                warn!(
                    fallback_rate = config.sample_rate,
                    "Device does not support 16kHz, using default rate"
                );
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                fallback_rate = config.sample_rate,
                "Could not query supported configs, using default"
            );
        }
    }

    Ok(config)
}
