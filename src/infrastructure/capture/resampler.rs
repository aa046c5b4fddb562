//! Streaming resampler from the device rate to the Opus rate

use rubato::{FftFixedIn, Resampler};

use super::opus_encoder::{EncodingError, OPUS_SAMPLE_RATE};

/// Input chunk size handed to rubato
const CHUNK_SIZE: usize = 1024;

/// Mono resampler fed with arbitrarily sized callback buffers.
///
/// Passes samples through untouched when the device already runs at 48kHz.
pub struct StreamResampler {
    inner: Option<FftFixedIn<f32>>,
    ratio: f64,
    pending: Vec<f32>,
}

impl StreamResampler {
    pub fn new(input_rate: u32) -> Result<Self, EncodingError> {
        let inner = if input_rate == OPUS_SAMPLE_RATE {
            None
        } else {
            let resampler = FftFixedIn::<f32>::new(
                input_rate as usize,
                OPUS_SAMPLE_RATE as usize,
                CHUNK_SIZE,
                2, // Sub-chunks
                1, // Mono
            )
            .map_err(|e| EncodingError::Resample(format!("init failed: {}", e)))?;
            Some(resampler)
        };

        Ok(Self {
            inner,
            ratio: OPUS_SAMPLE_RATE as f64 / input_rate.max(1) as f64,
            pending: Vec::new(),
        })
    }

    /// Whether samples are actually converted
    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Resample every complete input chunk buffered so far
    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>, EncodingError> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);
        let mut output = Vec::new();

        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }

            let resampled = resampler
                .process(&[&self.pending[..needed]], None)
                .map_err(|e| EncodingError::Resample(e.to_string()))?;
            output.extend_from_slice(&resampled[0]);
            self.pending.drain(..needed);
        }

        Ok(output)
    }

    /// Resample the remaining partial chunk, zero-padded and trimmed
    pub fn flush(&mut self) -> Result<Vec<f32>, EncodingError> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let remaining = self.pending.len();
        let needed = resampler.input_frames_next();
        let mut chunk = std::mem::take(&mut self.pending);
        chunk.resize(needed.max(remaining), 0.0);

        let resampled = resampler
            .process(&[&chunk[..needed]], None)
            .map_err(|e| EncodingError::Resample(e.to_string()))?;

        let keep = (remaining as f64 * self.ratio).ceil() as usize;
        let mut output = resampled.into_iter().next().unwrap_or_default();
        output.truncate(keep);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_rate_passes_through() {
        let mut resampler = StreamResampler::new(48_000).unwrap();
        assert!(!resampler.is_active());
        assert_eq!(resampler.process(&[0.1, 0.2]).unwrap(), vec![0.1, 0.2]);
        assert!(resampler.flush().unwrap().is_empty());
    }

    #[test]
    fn small_buffers_accumulate() {
        let mut resampler = StreamResampler::new(44_100).unwrap();
        assert!(resampler.is_active());

        // Less than one input chunk produces nothing yet
        assert!(resampler.process(&[0.0; 100]).unwrap().is_empty());

        let out = resampler.process(&[0.0; CHUNK_SIZE]).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn one_second_yields_about_one_second() {
        let mut resampler = StreamResampler::new(16_000).unwrap();

        let mut total = 0;
        for _ in 0..16 {
            total += resampler.process(&[0.0; 1000]).unwrap().len();
        }
        total += resampler.flush().unwrap().len();

        assert!(total > 46_000 && total <= 49_000, "got {}", total);
    }
}
