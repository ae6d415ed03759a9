//! End-to-end pipeline tests with a mock synthesis engine.
//!
//! The engine stands in for the external voice model: it returns a
//! deterministic tone whose length tracks the chunk text, which is
//! enough to exercise chunking, knob selection, assembly and the
//! surrounding I/O without loading any weights.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use habla::audio::wav;
use habla::{
    AudioBuffer, ChunkRequest, EnhanceConfig, EnhancementPipeline, ReferenceClip, Result,
    SynthesisEngine, TranscriptionSidecar,
};
use std::f32::consts::PI;
use tokio_util::sync::CancellationToken;

const RATE: u32 = 24_000;

fn tone(n: usize, freq: f32, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amp * (2.0 * PI * freq * i as f32 / RATE as f32).sin())
        .collect()
}

/// Amplitude-modulated tone standing in for a clean reference clip.
fn reference_clip(seconds: f32, text: &str) -> ReferenceClip {
    let samples = (0..(seconds * RATE as f32) as usize)
        .map(|i| {
            let t = i as f32 / RATE as f32;
            let amp = if (t % 0.4) < 0.3 { 0.5 } else { 0.02 };
            amp * (2.0 * PI * 220.0 * t).sin()
        })
        .collect();
    ReferenceClip::new(AudioBuffer::new(samples, RATE), text)
}

struct ToneEngine;

#[async_trait]
impl SynthesisEngine for ToneEngine {
    async fn synthesize(&self, request: ChunkRequest<'_>) -> Result<AudioBuffer> {
        let n = request.text.chars().count() * 800;
        Ok(AudioBuffer::new(tone(n, 330.0, 0.4), RATE))
    }
}

/// Cancels its own token after the first chunk completes.
struct SelfCancellingEngine {
    cancel: CancellationToken,
}

#[async_trait]
impl SynthesisEngine for SelfCancellingEngine {
    async fn synthesize(&self, request: ChunkRequest<'_>) -> Result<AudioBuffer> {
        self.cancel.cancel();
        Ok(AudioBuffer::new(vec![0.2; request.text.len() * 400], RATE))
    }
}

// ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_pipeline_produces_one_continuous_waveform() {
    let mut config = EnhanceConfig::default();
    config.chunking.max_chars = 60;

    let pipeline = EnhancementPipeline::new(config);
    let text = "El Dr. García llega a las 09:30. Trae $100 para el almuerzo. \
                Después vamos todos juntos a la reunión del equipo.";
    let out = pipeline
        .synthesize(
            text,
            &reference_clip(2.0, "Hola, esta es la voz de referencia."),
            &ToneEngine,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // Normalization ran before chunking.
    assert!(out.analysis.normalized.contains("Doctor"));
    assert!(out.analysis.normalized.contains("cien dólares"));
    assert!(out.analysis.normalized.contains("nueve y media"));

    // Several chunks, one waveform shorter than their concatenation.
    assert!(out.analysis.chunks.len() >= 2);
    let concatenated: usize = out
        .analysis
        .chunks
        .iter()
        .map(|c| c.text.chars().count() * 800)
        .sum();
    assert!(!out.audio.is_empty());
    assert!(out.audio.len() < concatenated);

    // Edge fades pull the outer samples to zero.
    assert_eq!(out.audio.samples[0], 0.0);
    assert_eq!(*out.audio.samples.last().unwrap(), 0.0);

    // The reference was scored and did not block.
    let quality = out.reference_quality.unwrap();
    assert!((0.0..=100.0).contains(&quality.overall_score));
}

#[tokio::test]
async fn adaptive_chunking_derives_budget_from_the_reference() {
    let mut config = EnhanceConfig::default();
    config.chunking.mode = habla::config::ChunkMode::Adaptive;

    // 10 s of audio for 150 chars of transcript: 15 chars/s, so the
    // 30 s target yields 450-byte chunks.
    let ref_text = "Esta es la transcripción de la voz de referencia. ".repeat(3);
    let reference = reference_clip(10.0, ref_text.trim_end());

    let sentence = "Cada una de estas frases aporta contenido suficiente para llenar varios \
                    fragmentos del texto de entrada sin cortes raros. ";
    let text = sentence.repeat(12);

    let pipeline = EnhancementPipeline::new(config);
    let out = pipeline
        .synthesize(&text, &reference, &ToneEngine, &CancellationToken::new())
        .await
        .unwrap();

    assert!(out.analysis.chunks.len() >= 2);
    for chunk in &out.analysis.chunks {
        assert!(chunk.text.len() <= 450, "chunk has {} bytes", chunk.text.len());
    }
}

#[tokio::test]
async fn sidecar_transcription_feeds_the_reference_clip() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("referencia.wav");
    wav::write_wav_f32_mono(&wav_path, &tone(RATE as usize, 220.0, 0.4), RATE).unwrap();
    TranscriptionSidecar::new("La voz de la referencia grabada.")
        .save_for_audio(&wav_path)
        .unwrap();

    let reference = ReferenceClip::from_wav(&wav_path).unwrap();
    assert_eq!(reference.text, "La voz de la referencia grabada.");

    let out = EnhancementPipeline::new(EnhanceConfig::default())
        .synthesize(
            "Un saludo corto.",
            &reference,
            &ToneEngine,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(!out.audio.is_empty());
}

#[tokio::test]
async fn synthesized_audio_survives_a_wav_round_trip() {
    let out = EnhancementPipeline::new(EnhanceConfig::default())
        .synthesize(
            "Primera frase. Segunda frase.",
            &reference_clip(2.0, "Referencia."),
            &ToneEngine,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("salida.wav");
    wav::write_wav_f32_mono(&path, &out.audio.samples, out.audio.sample_rate).unwrap();

    let loaded = wav::read_wav_f32_mono(&path).unwrap();
    assert_eq!(loaded.len(), out.audio.len());
    assert_eq!(loaded.sample_rate, out.audio.sample_rate);
}

#[tokio::test]
async fn config_file_drives_regional_processing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = EnhanceConfig::default();
    config.regional.region = habla::Region::Chilean;
    config.regional.auto_detect = false;
    config.regional.apply_phonetics = true;
    config.save_to_file(&path).unwrap();

    let loaded = EnhanceConfig::from_file(&path).unwrap();
    let analysis = EnhancementPipeline::new(loaded)
        .analyze("Estamos listos para la reunión")
        .unwrap();

    assert_eq!(analysis.regional.region, habla::Region::Chilean);
    // Chilean aspiration drops word-final s.
    assert!(analysis.regional.phonetic.contains("Estamoh"));
    assert!(analysis.regional.phonetic.contains("listoh"));
}

#[tokio::test]
async fn cancelling_mid_request_aborts_the_remaining_chunks() {
    let mut config = EnhanceConfig::default();
    config.chunking.max_chars = 40;

    let cancel = CancellationToken::new();
    let engine = SelfCancellingEngine {
        cancel: cancel.clone(),
    };
    let err = EnhancementPipeline::new(config)
        .synthesize(
            "La primera frase es larga. La segunda frase es larga.",
            &reference_clip(1.0, "Referencia."),
            &engine,
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, habla::EnhanceError::Cancelled));
}
