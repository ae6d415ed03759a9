//! WAV file I/O for reference clips and assembled output.

use crate::audio::AudioBuffer;
use crate::error::{EnhanceError, Result};
use std::path::Path;
use tracing::debug;

/// Write mono f32 samples as 16-bit PCM.
pub fn write_wav_f32_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| EnhanceError::Audio(format!("failed to create wav writer: {e}")))?;

    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let v = (clamped * i16::MAX as f32).round() as i16;
        writer
            .write_sample(v)
            .map_err(|e| EnhanceError::Audio(format!("failed to write wav sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| EnhanceError::Audio(format!("failed to finalize wav: {e}")))?;
    debug!("wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Load a WAV file as mono f32 samples at the file's own rate.
/// Integer PCM is rescaled to [-1, 1]; multi-channel audio is averaged
/// down to mono.
pub fn read_wav_f32_mono(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| EnhanceError::Audio(format!("cannot open WAV {}: {e}", path.display())))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map_err(|e| EnhanceError::Audio(format!("WAV read error: {e}")))
                        .map(|v| v as f32 / max)
                })
                .collect::<Result<Vec<f32>>>()?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(|e| EnhanceError::Audio(format!("WAV read error: {e}"))))
            .collect::<Result<Vec<f32>>>()?,
    };

    let samples = if spec.channels > 1 {
        let ch = spec.channels as usize;
        samples
            .chunks(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    } else {
        samples
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn round_trip_preserves_samples_within_16_bit_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original: Vec<f32> = (0..2_400)
            .map(|i| {
                0.6 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 24_000.0).sin()
            })
            .collect();
        write_wav_f32_mono(&path, &original, 24_000).unwrap();

        let loaded = read_wav_f32_mono(&path).unwrap();
        assert_eq!(loaded.sample_rate, 24_000);
        assert_eq!(loaded.len(), original.len());
        // Quantization error bound for amplitudes below full scale.
        for (a, b) in original.iter().zip(&loaded.samples) {
            assert!((a - b).abs() <= 2.0 / 32_768.0);
        }
    }

    #[test]
    fn out_of_range_samples_are_clamped_not_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        write_wav_f32_mono(&path, &[2.0, -2.0, 0.0], 16_000).unwrap();
        let loaded = read_wav_f32_mono(&path).unwrap();

        assert!((loaded.samples[0] - 1.0).abs() < 1e-3);
        assert!((loaded.samples[1] + 1.0).abs() < 1e-3);
        assert!(loaded.samples[2].abs() < 1e-3);
    }

    #[test]
    fn missing_file_is_an_audio_error() {
        let err = read_wav_f32_mono(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(err.to_string().contains("clip.wav"));
    }
}
