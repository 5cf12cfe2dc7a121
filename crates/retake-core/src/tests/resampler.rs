use crate::audio::Resampler;

// Test constants
const CAPTURE_RATE: u32 = 48_000;
const PLAYBACK_RATE: u32 = 44_100;
const ONE_SECOND_INPUT_SAMPLES: usize = CAPTURE_RATE as usize;
const ONE_SECOND_OUTPUT_SAMPLES: usize = PLAYBACK_RATE as usize;
const LENGTH_TOLERANCE: u64 = 100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const TONE_FREQUENCY_FACTOR: f32 = 0.1;
const MAX_AMPLITUDE: f32 = 1.5;

/// WHAT: Resampler converts 48kHz to 44.1kHz with the right length
/// WHY: Clips play at the output device rate without pitch/speed drift
#[test]
fn given_48khz_clip_when_resampling_to_44_1khz_then_length_matches_ratio() {
    // Given: Resampler configured for 48kHz -> 44.1kHz
    let mut resampler = Resampler::new(CAPTURE_RATE, PLAYBACK_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_INPUT_SAMPLES];

    // When: Resampling one second of audio
    let output = resampler.resample(&input).unwrap();

    // Then: Output is approximately one second at the playback rate
    assert!(
        (output.len() as i64 - ONE_SECOND_OUTPUT_SAMPLES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Empty samples return empty output
/// WHY: Edge case handling for zero-length input
#[test]
fn given_empty_samples_when_resampling_then_empty_output() {
    // Given: Resampler and empty input
    let mut resampler = Resampler::new(CAPTURE_RATE, PLAYBACK_RATE).unwrap();
    let empty: Vec<f32> = vec![];

    // When: Resampling empty data
    let output = resampler.resample(&empty).unwrap();

    // Then: Output is also empty
    assert!(output.is_empty());
}

/// WHAT: Resampling preserves signal characteristics
/// WHY: Takes must sound the same after rate conversion
#[test]
fn given_tone_signal_when_resampling_then_output_stays_bounded() {
    // Given: Resampler and a simple tone signal
    let mut resampler = Resampler::new(CAPTURE_RATE, PLAYBACK_RATE).unwrap();
    let input: Vec<f32> = (0..ONE_SECOND_INPUT_SAMPLES / 10)
        .map(|i| (i as f32 * TONE_FREQUENCY_FACTOR).sin())
        .collect();

    // When: Resampling the signal
    let output = resampler.resample(&input).unwrap();

    // Then: All samples are finite and within amplitude bounds
    assert!(!output.is_empty());
    assert!(
        output
            .iter()
            .all(|&s| s.is_finite() && s.abs() <= MAX_AMPLITUDE)
    );
}

/// WHAT: Equal input and output rates pass audio through
/// WHY: The identity configuration must not distort length
#[test]
fn given_equal_rates_when_resampling_then_length_preserved() {
    // Given: A 1:1 resampler
    let mut resampler = Resampler::new(CAPTURE_RATE, CAPTURE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; 4800];

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: Length is preserved exactly
    assert_eq!(output.len(), input.len());
}
