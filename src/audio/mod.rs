//! Audio buffers and the operations that join, score and store them.

pub mod crossfade;
pub mod quality;
pub mod wav;

use serde::Serialize;

/// Mono PCM audio with its sample rate. Buffers are handed between
/// stages by value; joining operations allocate new buffers instead of
/// mutating their inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// RMS energy over the whole buffer.
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    /// RMS of the first `window` samples.
    pub(crate) fn head_rms(&self, window: usize) -> f32 {
        let end = window.min(self.samples.len());
        rms(&self.samples[..end])
    }

    /// RMS of the last `window` samples.
    pub(crate) fn tail_rms(&self, window: usize) -> f32 {
        let start = self.samples.len().saturating_sub(window);
        rms(&self.samples[start..])
    }
}

pub(crate) fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}
