use crate::AudioBlob;

/// WHAT: A blob of N deliveries of k samples holds exactly N*k samples
/// WHY: Stop must concatenate callback deliveries without loss or reorder
#[test]
fn given_n_deliveries_of_k_samples_when_finalized_then_blob_has_nk_samples() {
    // Given: 5 deliveries of 480 samples each, tagged by delivery index
    let mut samples = Vec::new();
    for i in 0..5u16 {
        samples.extend(std::iter::repeat(f32::from(i) / 10.0).take(480));
    }

    // When: Building the blob
    let blob = AudioBlob::new(samples, 16_000);

    // Then: Exactly 5 * 480 samples, in delivery order
    assert_eq!(blob.len(), 5 * 480);
    assert!((blob.samples()[0] - 0.0).abs() < f32::EPSILON);
    assert!((blob.samples()[4 * 480] - 0.4).abs() < f32::EPSILON);
    assert!((blob.duration_secs() - 0.15).abs() < 1e-6);
}

/// WHAT: WAV encoding produces a header plus two bytes per sample
/// WHY: The upload body must be a valid 16-bit PCM mono file
#[test]
#[allow(clippy::unwrap_used)]
fn given_blob_when_encoding_wav_then_size_and_header_match() {
    // Given: 1600 samples at 16kHz (100ms)
    let blob = AudioBlob::new(vec![0.25f32; 1600], 16_000);

    // When: Encoding to WAV
    let bytes = blob.to_wav_bytes().unwrap();

    // Then: RIFF/WAVE header plus 44-byte canonical header and 2 bytes/sample
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(bytes.len(), 44 + 1600 * 2);
}

/// WHAT: Out-of-range samples are clamped during PCM conversion
/// WHY: Clipped input must not wrap around to the opposite sign
#[test]
#[allow(clippy::unwrap_used)]
fn given_overdriven_samples_when_encoding_then_values_clamped() {
    // Given: Samples beyond [-1.0, 1.0]
    let blob = AudioBlob::new(vec![2.0f32, -2.0], 16_000);

    // When: Encoding to WAV
    let bytes = blob.to_wav_bytes().unwrap();

    // Then: First sample is i16::MAX, second is -i16::MAX (clamped, not wrapped)
    let first = i16::from_le_bytes([bytes[44], bytes[45]]);
    let second = i16::from_le_bytes([bytes[46], bytes[47]]);
    assert_eq!(first, i16::MAX);
    assert_eq!(second, -i16::MAX);
}

/// WHAT: An empty blob reports empty and zero duration
/// WHY: Downstream code branches on emptiness before dispatching
#[test]
fn given_empty_blob_when_inspected_then_empty_and_zero_duration() {
    // Given/When: A blob with no samples
    let blob = AudioBlob::new(Vec::new(), 48_000);

    // Then: Empty, zero length and duration
    assert!(blob.is_empty());
    assert_eq!(blob.len(), 0);
    assert!((blob.duration_secs() - 0.0).abs() < f32::EPSILON);
}
