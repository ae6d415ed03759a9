//! Chunk blending.
//!
//! Adjacent synthesized chunks are joined by overlapping their edges
//! under complementary fade envelopes. Equal-power is the default; it
//! keeps perceived loudness steady through the seam for uncorrelated
//! material. Every call allocates a fresh output buffer.

use crate::audio::AudioBuffer;
use crate::error::{EnhanceError, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use tracing::debug;

/// Fade envelope shape, chosen once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossfadeCurve {
    /// cos/sin quarter-period envelopes; summed squared gain is 1
    /// everywhere. The production default.
    #[default]
    EqualPower,
    /// Squared-sine envelopes; amplitudes sum to 1 with a softer
    /// derivative at the edges.
    RaisedCosine,
    /// Straight ramps. Baseline only; has an audible loudness dip on
    /// uncorrelated material.
    Linear,
}

impl CrossfadeCurve {
    /// (fade_out, fade_in) gains at normalized position `t` in `[0, 1)`.
    fn gains(self, t: f32) -> (f32, f32) {
        match self {
            CrossfadeCurve::EqualPower => {
                let theta = t * FRAC_PI_2;
                (theta.cos(), theta.sin())
            }
            CrossfadeCurve::RaisedCosine => {
                let fade_in = (t * FRAC_PI_2).sin().powi(2);
                (1.0 - fade_in, fade_in)
            }
            CrossfadeCurve::Linear => (1.0 - t, t),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Crossfader {
    curve: CrossfadeCurve,
}

impl Crossfader {
    pub fn new(curve: CrossfadeCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> CrossfadeCurve {
        self.curve
    }

    /// Join `a` and `b` with an overlap of
    /// `min(duration * rate, len(a), len(b))` samples. A zero or
    /// negative duration degrades to plain concatenation. The inputs
    /// must share a sample rate.
    pub fn crossfade(
        &self,
        a: &AudioBuffer,
        b: &AudioBuffer,
        duration_s: f32,
    ) -> Result<AudioBuffer> {
        if a.sample_rate != b.sample_rate {
            return Err(EnhanceError::Audio(format!(
                "cannot crossfade {} Hz with {} Hz audio",
                a.sample_rate, b.sample_rate
            )));
        }

        let requested = (duration_s.max(0.0) * a.sample_rate as f32) as usize;
        let overlap = requested.min(a.len()).min(b.len());

        let mut samples = Vec::with_capacity(a.len() + b.len() - overlap);
        samples.extend_from_slice(&a.samples[..a.len() - overlap]);

        let tail = &a.samples[a.len() - overlap..];
        for (i, (&out_sample, &in_sample)) in tail.iter().zip(&b.samples[..overlap]).enumerate() {
            let t = i as f32 / overlap as f32;
            let (fade_out, fade_in) = self.curve.gains(t);
            samples.push(out_sample * fade_out + in_sample * fade_in);
        }

        samples.extend_from_slice(&b.samples[overlap..]);
        debug!(
            "crossfaded {} + {} samples with {overlap} overlap",
            a.len(),
            b.len()
        );

        Ok(AudioBuffer::new(samples, a.sample_rate))
    }
}

/// Linearly ramp the first and last `fade_s` of a buffer to zero to
/// kill click artifacts at the outer edges. A no-op when the buffer is
/// shorter than two fade windows.
pub fn apply_edge_fades(buffer: &mut AudioBuffer, fade_s: f32) {
    let fade_len = (fade_s.max(0.0) * buffer.sample_rate as f32) as usize;
    if fade_len == 0 || buffer.len() < fade_len * 2 {
        return;
    }

    for i in 0..fade_len {
        let gain = i as f32 / fade_len as f32;
        buffer.samples[i] *= gain;
    }
    let len = buffer.len();
    for i in 0..fade_len {
        let gain = i as f32 / fade_len as f32;
        buffer.samples[len - 1 - i] *= gain;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::f32::consts::PI;

    fn ones(seconds: f32, rate: u32) -> AudioBuffer {
        AudioBuffer::new(vec![1.0; (seconds * rate as f32) as usize], rate)
    }

    fn zeros(seconds: f32, rate: u32) -> AudioBuffer {
        AudioBuffer::new(vec![0.0; (seconds * rate as f32) as usize], rate)
    }

    fn sine(freq: f32, seconds: f32, rate: u32) -> AudioBuffer {
        let n = (seconds * rate as f32) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect();
        AudioBuffer::new(samples, rate)
    }

    #[test]
    fn output_length_formula() {
        let a = ones(1.0, 24_000);
        let b = zeros(1.0, 24_000);
        for duration in [0.0, 0.1, 0.5, 1.0, 5.0] {
            let out = Crossfader::default().crossfade(&a, &b, duration).unwrap();
            let overlap = ((duration * 24_000.0) as usize).min(a.len()).min(b.len());
            assert_eq!(out.len(), a.len() + b.len() - overlap, "duration {duration}");
        }
    }

    #[test]
    fn one_second_each_with_half_second_blend() {
        let a = ones(1.0, 24_000);
        let b = zeros(1.0, 24_000);
        let out = Crossfader::default().crossfade(&a, &b, 0.5).unwrap();

        assert_eq!(out.len(), 36_000);
        // t = 0.1 s sits before the overlap: still pure ones.
        assert!((out.samples[2_400] - 1.0).abs() < 1e-6);
        // t = 1.4 s sits after the overlap: pure zeros.
        assert!(out.samples[33_600].abs() < 1e-6);
    }

    #[test]
    fn zero_duration_concatenates() {
        let a = ones(0.5, 24_000);
        let b = zeros(0.25, 24_000);
        let out = Crossfader::default().crossfade(&a, &b, 0.0).unwrap();
        assert_eq!(out.len(), a.len() + b.len());
    }

    #[test]
    fn mismatched_rates_are_rejected() {
        let a = ones(0.5, 24_000);
        let b = ones(0.5, 16_000);
        let err = Crossfader::default().crossfade(&a, &b, 0.1).unwrap_err();
        assert!(err.to_string().contains("Hz"));
    }

    #[test]
    fn equal_power_preserves_energy_for_uncorrelated_tones() {
        let rate = 24_000;
        let a = sine(440.0, 1.0, rate);
        let b = sine(593.0, 1.0, rate);
        let input_power = a.rms().powi(2);

        let out = Crossfader::new(CrossfadeCurve::EqualPower)
            .crossfade(&a, &b, 0.5)
            .unwrap();
        let overlap_start = a.len() - 12_000;
        let overlap = &out.samples[overlap_start..overlap_start + 12_000];
        let overlap_power: f32 =
            overlap.iter().map(|s| s * s).sum::<f32>() / overlap.len() as f32;

        let deviation = (overlap_power - input_power).abs() / input_power;
        assert!(deviation < 0.05, "power deviated {:.1}%", deviation * 100.0);
    }

    #[test]
    fn linear_curve_dips_on_uncorrelated_tones() {
        let rate = 24_000;
        let a = sine(440.0, 1.0, rate);
        let b = sine(593.0, 1.0, rate);
        let input_power = a.rms().powi(2);

        let out = Crossfader::new(CrossfadeCurve::Linear)
            .crossfade(&a, &b, 0.5)
            .unwrap();
        let overlap_start = a.len() - 12_000;
        let overlap = &out.samples[overlap_start..overlap_start + 12_000];
        let overlap_power: f32 =
            overlap.iter().map(|s| s * s).sum::<f32>() / overlap.len() as f32;

        // The straight ramp loses roughly a third of the power mid-seam.
        assert!(overlap_power < input_power * 0.8);
    }

    #[test]
    fn raised_cosine_amplitudes_sum_to_one() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let (out_gain, in_gain) = CrossfadeCurve::RaisedCosine.gains(t);
            assert!((out_gain + in_gain - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn edge_fades_ramp_to_zero() {
        let mut buffer = ones(1.0, 16_000);
        apply_edge_fades(&mut buffer, 0.01);

        assert_eq!(buffer.samples[0], 0.0);
        assert_eq!(*buffer.samples.last().unwrap(), 0.0);
        // Middle untouched.
        assert!((buffer.samples[8_000] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn edge_fades_skip_tiny_buffers() {
        let mut buffer = AudioBuffer::new(vec![1.0; 10], 16_000);
        apply_edge_fades(&mut buffer, 1.0);
        assert!(buffer.samples.iter().all(|&s| (s - 1.0).abs() < 1e-6));
    }
}
