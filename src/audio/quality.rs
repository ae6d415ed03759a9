//! Reference-audio scoring.
//!
//! A poor reference clip is the most common cause of bad cloned
//! speech, so the pipeline grades every reference before synthesis.
//! Five frame-level metrics are each mapped through a piecewise-linear
//! curve to `[0, 100]` and folded into one weighted score. Issues and
//! recommendations are re-derived from the raw metrics so a borderline
//! score still names what is actually wrong with the recording.

use crate::audio::{AudioBuffer, rms};
use crate::error::{EnhanceError, Result};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex32;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FRAME_SECONDS: f32 = 0.025;
const FFT_LEN: usize = 2048;
const CLIP_THRESHOLD: f32 = 0.99;
/// Frames quieter than this fraction of the peak frame RMS count as silence.
const SILENCE_FRACTION: f32 = 0.02;
/// Stand-in for an unmeasurable ratio over a digitally silent floor.
const MAX_DB: f32 = 100.0;

const SNR_WEIGHT: f32 = 0.35;
const CLIPPING_WEIGHT: f32 = 0.25;
const SILENCE_WEIGHT: f32 = 0.15;
const DYNAMIC_WEIGHT: f32 = 0.15;
const FLATNESS_WEIGHT: f32 = 0.10;

// Breakpoints are (raw metric, score); values outside the span clamp
// to the end scores.
const SNR_CURVE: [(f32, f32); 4] = [(5.0, 0.0), (15.0, 50.0), (25.0, 80.0), (40.0, 100.0)];
const CLIPPING_CURVE: [(f32, f32); 4] =
    [(0.0, 100.0), (0.001, 90.0), (0.01, 50.0), (0.05, 0.0)];
const SILENCE_CURVE: [(f32, f32); 4] = [(0.0, 100.0), (0.2, 90.0), (0.5, 40.0), (0.8, 0.0)];
const DYNAMIC_CURVE: [(f32, f32); 4] = [(5.0, 0.0), (15.0, 60.0), (25.0, 90.0), (40.0, 100.0)];
const FLATNESS_CURVE: [(f32, f32); 4] = [(0.1, 100.0), (0.3, 70.0), (0.5, 40.0), (0.8, 0.0)];

/// Verdict bands over the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Unacceptable,
}

impl QualityLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else if score >= 30.0 {
            Self::Poor
        } else {
            Self::Unacceptable
        }
    }

    /// Poor and unacceptable references still synthesize; callers use
    /// this to decide whether to warn.
    pub fn is_acceptable(&self) -> bool {
        !matches!(self, Self::Poor | Self::Unacceptable)
    }
}

/// Immutable once computed. Raw metrics are kept alongside the mapped
/// score so callers can apply their own thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub overall_score: f32,
    pub level: QualityLevel,
    pub snr_db: f32,
    pub clipping_rate: f32,
    pub silence_ratio: f32,
    pub dynamic_range_db: f32,
    pub spectral_flatness: f32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AudioQualityAnalyzer;

impl AudioQualityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, audio: &AudioBuffer) -> Result<QualityMetrics> {
        if audio.is_empty() {
            return Err(EnhanceError::Audio(
                "cannot score an empty audio buffer".into(),
            ));
        }

        let frames = frame_rms_series(&audio.samples, audio.sample_rate);
        let snr_db = snr_db(&frames);
        let clipping_rate = clipping_rate(&audio.samples);
        let silence_ratio = silence_ratio(&frames);
        let dynamic_range_db = dynamic_range_db(&frames);
        let spectral_flatness = spectral_flatness(&audio.samples);

        let overall_score = (SNR_WEIGHT * map_to_score(snr_db, &SNR_CURVE)
            + CLIPPING_WEIGHT * map_to_score(clipping_rate, &CLIPPING_CURVE)
            + SILENCE_WEIGHT * map_to_score(silence_ratio, &SILENCE_CURVE)
            + DYNAMIC_WEIGHT * map_to_score(dynamic_range_db, &DYNAMIC_CURVE)
            + FLATNESS_WEIGHT * map_to_score(spectral_flatness, &FLATNESS_CURVE))
        .clamp(0.0, 100.0);

        let level = QualityLevel::from_score(overall_score);
        let (issues, recommendations) = diagnose(
            snr_db,
            clipping_rate,
            silence_ratio,
            dynamic_range_db,
            spectral_flatness,
        );
        debug!(
            "reference audio scored {overall_score:.1} ({level:?}) over {} frames",
            frames.len()
        );

        Ok(QualityMetrics {
            overall_score,
            level,
            snr_db,
            clipping_rate,
            silence_ratio,
            dynamic_range_db,
            spectral_flatness,
            issues,
            recommendations,
        })
    }
}

// ── frame-level metrics ──────────────────────────────────────────────

/// RMS of each 25 ms frame at 50 % hop. A buffer shorter than one
/// frame is treated as a single frame.
fn frame_rms_series(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let frame_len = ((sample_rate as f32 * FRAME_SECONDS) as usize).max(1);
    let hop = (frame_len / 2).max(1);

    let mut frames = Vec::new();
    let mut pos = 0usize;
    while pos + frame_len <= samples.len() {
        frames.push(rms(&samples[pos..pos + frame_len]));
        pos += hop;
    }
    if frames.is_empty() {
        frames.push(rms(samples));
    }
    frames
}

/// Loudest-half frames stand in for speech, quietest tenth for the
/// noise floor. A zeroed floor reads as noise-free.
fn snr_db(frames: &[f32]) -> f32 {
    let mut sorted = frames.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();

    let quiet_n = (n / 10).max(1);
    let loud_n = (n / 2).max(1);
    let quiet = sorted[..quiet_n].iter().sum::<f32>() / quiet_n as f32;
    let loud = sorted[n - loud_n..].iter().sum::<f32>() / loud_n as f32;

    if quiet <= f32::EPSILON {
        return MAX_DB;
    }
    20.0 * (loud / quiet).log10()
}

fn clipping_rate(samples: &[f32]) -> f32 {
    let clipped = samples.iter().filter(|s| s.abs() > CLIP_THRESHOLD).count();
    clipped as f32 / samples.len() as f32
}

fn silence_ratio(frames: &[f32]) -> f32 {
    let peak = frames.iter().copied().fold(0.0f32, f32::max);
    if peak <= f32::EPSILON {
        return 1.0;
    }
    let threshold = peak * SILENCE_FRACTION;
    let silent = frames.iter().filter(|&&r| r < threshold).count();
    silent as f32 / frames.len() as f32
}

fn dynamic_range_db(frames: &[f32]) -> f32 {
    let mut sorted = frames.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let peak = sorted.last().copied().unwrap_or(0.0);
    let idx = (sorted.len() as f32 * 0.05) as usize;
    let floor = sorted[idx.min(sorted.len() - 1)];

    if floor <= f32::EPSILON {
        return if peak <= f32::EPSILON { 0.0 } else { MAX_DB };
    }
    20.0 * (peak / floor).log10()
}

// ── spectral flatness ────────────────────────────────────────────────

/// Geometric over arithmetic mean of 2048-point FFT magnitudes,
/// averaged across 50 %-hop frames. Near 0 for tonal/voiced material,
/// toward 1 for broadband noise. Silent frames carry no spectral
/// information and are skipped.
fn spectral_flatness(samples: &[f32]) -> f32 {
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_LEN);
    let window = hamming_window(FFT_LEN);
    let mut buf = vec![Complex32::new(0.0, 0.0); FFT_LEN];

    let mut acc = 0.0f32;
    let mut frames = 0usize;

    let mut pos = 0usize;
    while pos + FFT_LEN <= samples.len() {
        for (i, w) in window.iter().enumerate() {
            buf[i] = Complex32::new(samples[pos + i] * *w, 0.0);
        }
        fft.process(&mut buf);
        if let Some(flatness) = frame_flatness(&buf) {
            acc += flatness;
            frames += 1;
        }
        pos += FFT_LEN / 2;
    }

    if frames == 0 {
        // Shorter than one window: zero-pad a single frame.
        for (i, c) in buf.iter_mut().enumerate() {
            *c = match samples.get(i) {
                Some(&s) => Complex32::new(s * window[i], 0.0),
                None => Complex32::new(0.0, 0.0),
            };
        }
        fft.process(&mut buf);
        if let Some(flatness) = frame_flatness(&buf) {
            acc += flatness;
            frames += 1;
        }
    }

    if frames == 0 { 0.0 } else { acc / frames as f32 }
}

fn frame_flatness(buf: &[Complex32]) -> Option<f32> {
    let half = buf.len() / 2;
    let mut log_sum = 0.0f32;
    let mut sum = 0.0f32;
    let mut n = 0usize;
    // Skip the DC bin.
    for c in buf.iter().take(half).skip(1) {
        let mag = (c.re * c.re + c.im * c.im).sqrt();
        log_sum += (mag + 1e-10).ln();
        sum += mag;
        n += 1;
    }
    if n == 0 || sum <= f32::EPSILON {
        return None;
    }
    let geometric = (log_sum / n as f32).exp();
    let arithmetic = sum / n as f32;
    Some((geometric / arithmetic).clamp(0.0, 1.0))
}

fn hamming_window(n: usize) -> Vec<f32> {
    let mut w = Vec::with_capacity(n);
    for i in 0..n {
        let x = if n > 1 {
            i as f32 / (n as f32 - 1.0)
        } else {
            0.0
        };
        w.push(0.54 - 0.46 * (2.0 * std::f32::consts::PI * x).cos());
    }
    w
}

// ── scoring ──────────────────────────────────────────────────────────

fn map_to_score(value: f32, curve: &[(f32, f32); 4]) -> f32 {
    if value <= curve[0].0 {
        return curve[0].1;
    }
    for pair in curve.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if value <= x1 {
            return (y0 + (value - x0) / (x1 - x0) * (y1 - y0)).clamp(0.0, 100.0);
        }
    }
    curve[3].1
}

fn diagnose(
    snr_db: f32,
    clipping_rate: f32,
    silence_ratio: f32,
    dynamic_range_db: f32,
    spectral_flatness: f32,
) -> (Vec<String>, Vec<String>) {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if snr_db < 15.0 {
        issues.push(format!("low signal-to-noise ratio ({snr_db:.1} dB)"));
        recommendations.push("record in a quieter environment or denoise the clip".into());
    }
    if clipping_rate > 0.001 {
        issues.push(format!(
            "clipping on {:.2}% of samples",
            clipping_rate * 100.0
        ));
        recommendations.push("lower the input gain to avoid distortion".into());
    }
    if silence_ratio > 0.4 {
        issues.push(format!(
            "audio is {:.0}% silence",
            silence_ratio * 100.0
        ));
        recommendations.push("trim leading and trailing silence from the reference".into());
    }
    if dynamic_range_db < 12.0 {
        issues.push(format!("flat dynamics ({dynamic_range_db:.1} dB range)"));
        recommendations.push("use a reference with natural loudness variation".into());
    }
    if spectral_flatness > 0.5 {
        issues.push(format!(
            "noise-like spectrum (flatness {spectral_flatness:.2})"
        ));
        recommendations.push("use a cleaner voice recording as the reference".into());
    }

    (issues, recommendations)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::PI;

    const RATE: u32 = 24_000;

    /// 300 ms voiced bursts separated by 100 ms low-level gaps. High
    /// burst-to-gap contrast stands in for clean close-mic speech.
    fn speechlike() -> AudioBuffer {
        let samples = (0..2 * RATE as usize)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                let amp = if (t % 0.4) < 0.3 { 0.5 } else { 0.02 };
                amp * (2.0 * PI * 220.0 * t).sin()
            })
            .collect();
        AudioBuffer::new(samples, RATE)
    }

    fn sine(freq: f32, amp: f32, seconds: f32) -> AudioBuffer {
        let samples = (0..(seconds * RATE as f32) as usize)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / RATE as f32).sin())
            .collect();
        AudioBuffer::new(samples, RATE)
    }

    #[test]
    fn clean_speechlike_reference_scores_well() {
        let metrics = AudioQualityAnalyzer::new().analyze(&speechlike()).unwrap();

        assert!(metrics.overall_score >= 70.0, "score {}", metrics.overall_score);
        assert!(metrics.snr_db > 20.0);
        assert!(metrics.clipping_rate < 1e-6);
        assert!(metrics.issues.is_empty(), "issues: {:?}", metrics.issues);
        assert!(matches!(
            metrics.level,
            QualityLevel::Excellent | QualityLevel::Good
        ));
    }

    #[test]
    fn clipped_square_wave_is_flagged() {
        let samples: Vec<f32> = (0..RATE as usize)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                if (2.0 * PI * 180.0 * t).sin() >= 0.0 { 1.0 } else { -1.0 }
            })
            .collect();
        let metrics = AudioQualityAnalyzer::new()
            .analyze(&AudioBuffer::new(samples, RATE))
            .unwrap();

        assert!(metrics.clipping_rate > 0.9);
        assert!(metrics.issues.iter().any(|i| i.contains("clipping")));
        assert!(!metrics.recommendations.is_empty());
    }

    #[test]
    fn mostly_silent_clip_is_flagged() {
        let mut samples = vec![0.0f32; 2 * RATE as usize];
        for (i, s) in samples.iter_mut().take(RATE as usize / 5).enumerate() {
            let t = i as f32 / RATE as f32;
            *s = 0.4 * (2.0 * PI * 330.0 * t).sin();
        }
        let metrics = AudioQualityAnalyzer::new()
            .analyze(&AudioBuffer::new(samples, RATE))
            .unwrap();

        assert!(metrics.silence_ratio > 0.7, "ratio {}", metrics.silence_ratio);
        assert!(metrics.issues.iter().any(|i| i.contains("silence")));
    }

    #[test]
    fn score_stays_in_bounds_for_varied_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise: Vec<f32> = (0..RATE as usize).map(|_| rng.gen_range(-0.5..0.5)).collect();

        let inputs = [
            speechlike(),
            sine(440.0, 0.8, 1.0),
            AudioBuffer::new(noise, RATE),
            AudioBuffer::new(vec![0.01; 100], RATE),
        ];
        for audio in &inputs {
            let metrics = AudioQualityAnalyzer::new().analyze(audio).unwrap();
            assert!((0.0..=100.0).contains(&metrics.overall_score));
            assert_eq!(metrics.level, QualityLevel::from_score(metrics.overall_score));
        }
    }

    #[test]
    fn level_breakpoints_are_exact() {
        assert_eq!(QualityLevel::from_score(85.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(84.999), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(70.0), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(50.0), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(30.0), QualityLevel::Poor);
        assert_eq!(QualityLevel::from_score(29.999), QualityLevel::Unacceptable);
        assert!(!QualityLevel::Poor.is_acceptable());
        assert!(QualityLevel::Fair.is_acceptable());
    }

    #[test]
    fn weights_sum_to_one() {
        let total =
            SNR_WEIGHT + CLIPPING_WEIGHT + SILENCE_WEIGHT + DYNAMIC_WEIGHT + FLATNESS_WEIGHT;
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn piecewise_map_interpolates_and_clamps() {
        assert_eq!(map_to_score(15.0, &SNR_CURVE), 50.0);
        assert!((map_to_score(20.0, &SNR_CURVE) - 65.0).abs() < 1e-4);
        assert_eq!(map_to_score(2.0, &SNR_CURVE), 0.0);
        assert_eq!(map_to_score(90.0, &SNR_CURVE), 100.0);
        assert!((map_to_score(0.0005, &CLIPPING_CURVE) - 95.0).abs() < 1e-4);
    }

    #[test]
    fn noise_reference_reads_as_spectrally_flat() {
        let mut rng = StdRng::seed_from_u64(11);
        let noise: Vec<f32> = (0..RATE as usize).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let metrics = AudioQualityAnalyzer::new()
            .analyze(&AudioBuffer::new(noise, RATE))
            .unwrap();

        assert!(metrics.spectral_flatness > 0.5, "flatness {}", metrics.spectral_flatness);
        assert!(metrics.issues.iter().any(|i| i.contains("spectrum")));
    }

    #[test]
    fn tonal_reference_reads_as_spectrally_peaked() {
        let metrics = AudioQualityAnalyzer::new()
            .analyze(&sine(440.0, 0.5, 1.0))
            .unwrap();
        assert!(metrics.spectral_flatness < 0.1, "flatness {}", metrics.spectral_flatness);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let err = AudioQualityAnalyzer::new()
            .analyze(&AudioBuffer::new(Vec::new(), RATE))
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
