use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler.
///
/// Converts a clip captured at the device's input rate to the playback
/// device's output rate. Input is processed in fixed chunks; the final
/// partial chunk is zero-padded and the output trimmed back to the exact
/// rate-converted length.
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    /// Create a resampler between two sample rates.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_SIZE,
            SUB_CHUNKS,
            1, // mono
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Resample a whole clip. Empty input yields empty output.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let exact_len = (samples.len() as f64 * self.output_rate as f64
            / self.input_rate as f64)
            .round() as usize;
        let mut output = Vec::with_capacity(exact_len + CHUNK_SIZE);

        let max_out_frames = self.resampler.output_frames_max();
        let mut out_chunk = vec![0.0f32; max_out_frames];

        for chunk in samples.chunks(CHUNK_SIZE) {
            let padded;
            let input: &[f32] = if chunk.len() < CHUNK_SIZE {
                let mut tail = chunk.to_vec();
                tail.resize(CHUNK_SIZE, 0.0);
                padded = tail;
                &padded
            } else {
                chunk
            };

            let input_adapter =
                InterleavedSlice::new(input, 1, CHUNK_SIZE).map_err(|e| {
                    CoreError::ResamplingError {
                        reason: format!("Failed to create input adapter: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;

            let mut output_adapter = InterleavedSlice::new_mut(&mut out_chunk, 1, max_out_frames)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Failed to create output adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let (_consumed, written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&out_chunk[..written]);
        }

        // Drop the padding tail so playback length matches the clip length.
        output.truncate(exact_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Clip resampled"
        );

        Ok(output)
    }
}
