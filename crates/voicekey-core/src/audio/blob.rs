use crate::{AudioError, CoreResult};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;

/// A finalized capture: mono f32 samples in delivery order plus the rate
/// they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBlob {
    /// Build a blob from already-captured mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples in the blob.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the blob contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate the blob was captured at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Recording length in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Raw samples, in delivery order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Encode as an in-memory 16-bit PCM mono WAV for upload.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::EncodingFailed`] if the WAV writer rejects
    /// the stream, which only happens on allocation failure.
    #[track_caller]
    pub fn to_wav_bytes(&self) -> CoreResult<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
                AudioError::EncodingFailed {
                    reason: format!("Failed to create WAV writer: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

            for sample in &self.samples {
                let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(pcm)
                    .map_err(|e| AudioError::EncodingFailed {
                        reason: format!("Failed to write sample: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }

            writer.finalize().map_err(|e| AudioError::EncodingFailed {
                reason: format!("Failed to finalize WAV: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(cursor.into_inner())
    }
}
