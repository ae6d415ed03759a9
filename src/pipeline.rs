//! Pipeline orchestration.
//!
//! Wires the stages end to end: normalize, regional processing,
//! prosody/breath/discourse analysis, chunking, per-chunk knob
//! selection, synthesis through an injected [`SynthesisEngine`], and
//! crossfaded assembly. Chunks are synthesized strictly in order and a
//! failure on any chunk aborts the whole request, since crossfading
//! needs every neighbor.

use crate::audio::crossfade::{Crossfader, apply_edge_fades};
use crate::audio::quality::{AudioQualityAnalyzer, QualityMetrics};
use crate::audio::{AudioBuffer, wav};
use crate::chunk::{TextChunker, TextChunk};
use crate::config::{ChunkMode, EnhanceConfig};
use crate::error::{EnhanceError, Result};
use crate::params::AdaptiveParameterSelector;
use crate::prosody::breath::{BreathPattern, BreathPauseAnalyzer};
use crate::prosody::discourse::{DiscourseAnalysis, DiscourseProsodyAnalyzer};
use crate::prosody::{ProsodyAnalysis, ProsodyAnalyzer};
use crate::regional::{RegionalProcessor, RegionalText};
use crate::sidecar::TranscriptionSidecar;
use crate::text::normalize;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Window used to measure seam energies, independent of the crossfade
/// length being chosen.
const ENERGY_WINDOW_S: f32 = 0.05;

/// One chunk's worth of work for the external model.
#[derive(Debug)]
pub struct ChunkRequest<'a> {
    pub ref_audio: &'a AudioBuffer,
    pub ref_text: &'a str,
    pub text: &'a str,
    pub nfe_step: u32,
    pub cfg_strength: f32,
    pub speed: f32,
    pub seed: Option<u64>,
}

/// Contract for the external voice-synthesis model. The pipeline only
/// ever sees waveforms come back; everything model-specific stays
/// behind this seam.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    async fn synthesize(&self, request: ChunkRequest<'_>) -> Result<AudioBuffer>;
}

/// Reference recording plus its transcription, the voice to clone.
#[derive(Debug, Clone)]
pub struct ReferenceClip {
    pub audio: AudioBuffer,
    pub text: String,
}

impl ReferenceClip {
    pub fn new(audio: AudioBuffer, text: impl Into<String>) -> Self {
        Self {
            audio,
            text: text.into(),
        }
    }

    /// Load a reference WAV and its transcription sidecar. ASR is out
    /// of scope here, so a missing sidecar is an error rather than a
    /// fallback.
    pub fn from_wav(path: &Path) -> Result<Self> {
        let audio = wav::read_wav_f32_mono(path)?;
        let sidecar = TranscriptionSidecar::load_for_audio(path)?.ok_or_else(|| {
            EnhanceError::Sidecar(format!(
                "no transcription sidecar next to {}; supply the reference text explicitly",
                path.display()
            ))
        })?;
        Ok(Self::new(audio, sidecar.transcription))
    }
}

/// Every annotation derived from one input text. Serializable as the
/// response payload for analysis-only requests.
#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysis {
    pub normalized: String,
    pub regional: RegionalText,
    pub prosody: Option<ProsodyAnalysis>,
    pub breath: Option<BreathPattern>,
    pub discourse: Option<DiscourseAnalysis>,
    pub chunks: Vec<TextChunk>,
}

impl TextAnalysis {
    /// One-line digest for logs and response headers.
    pub fn summary(&self) -> String {
        let markers = self.prosody.as_ref().map_or(0, |p| p.markers.len());
        let breaths = self.breath.as_ref().map_or(0, |b| b.breath_points.len());
        format!(
            "region={} chunks={} markers={markers} breaths={breaths}",
            self.regional.region,
            self.chunks.len()
        )
    }
}

/// Final output of one synthesis request.
#[derive(Debug, Clone)]
pub struct EnhancedAudio {
    pub audio: AudioBuffer,
    pub analysis: TextAnalysis,
    pub reference_quality: Option<QualityMetrics>,
    pub synthesis_seconds: f32,
}

/// Orchestrates the full text-enhancement and audio-assembly flow.
#[derive(Debug, Clone)]
pub struct EnhancementPipeline {
    config: EnhanceConfig,
}

impl EnhancementPipeline {
    pub fn new(config: EnhanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Run every text stage without synthesizing. Adaptive chunking
    /// needs a reference clip, so analysis-only requests fall back to
    /// sentence packing at the configured budget.
    pub fn analyze(&self, text: &str) -> Result<TextAnalysis> {
        let chunker = match self.config.chunking.mode {
            ChunkMode::Adaptive => {
                debug!("adaptive chunking needs a reference clip; using sentence packing");
                TextChunker::sentence_based(self.config.chunking.max_chars)
            }
            ChunkMode::Sentence => TextChunker::sentence_based(self.config.chunking.max_chars),
            ChunkMode::Fixed => TextChunker::fixed(self.config.chunking.max_chars),
        };
        Ok(self.run_text_stages(text, &chunker))
    }

    /// Synthesize `text` in the voice of `reference`, assembling the
    /// per-chunk waveforms into one continuous buffer.
    pub async fn synthesize(
        &self,
        text: &str,
        reference: &ReferenceClip,
        engine: &dyn SynthesisEngine,
        cancel: &CancellationToken,
    ) -> Result<EnhancedAudio> {
        if reference.audio.is_empty() {
            return Err(EnhanceError::Audio("reference audio is empty".into()));
        }

        let reference_quality = if self.config.assembly.analyze_reference {
            let metrics = AudioQualityAnalyzer::new().analyze(&reference.audio)?;
            if !metrics.level.is_acceptable() {
                warn!(
                    "reference scored {:.1} ({:?}): {}",
                    metrics.overall_score,
                    metrics.level,
                    metrics.issues.join("; ")
                );
            }
            Some(metrics)
        } else {
            None
        };

        let chunker = match self.config.chunking.mode {
            ChunkMode::Adaptive => TextChunker::adaptive(
                reference.audio.duration_seconds(),
                reference.text.chars().count(),
            )?,
            ChunkMode::Sentence => TextChunker::sentence_based(self.config.chunking.max_chars),
            ChunkMode::Fixed => TextChunker::fixed(self.config.chunking.max_chars),
        };
        let mut analysis = self.run_text_stages(text, &chunker);
        info!("{}", analysis.summary());

        if analysis.chunks.is_empty() {
            return Ok(EnhancedAudio {
                audio: AudioBuffer::new(Vec::new(), reference.audio.sample_rate),
                analysis,
                reference_quality,
                synthesis_seconds: 0.0,
            });
        }

        let start = Instant::now();
        let buffers = self
            .synthesize_chunks(&analysis.chunks, reference, engine, cancel)
            .await?;
        let synthesis_seconds = start.elapsed().as_secs_f32();

        let audio = self.assemble(buffers, &mut analysis)?;
        info!(
            "synthesized {:.1}s of audio from {} chunks in {synthesis_seconds:.1}s",
            audio.duration_seconds(),
            analysis.chunks.len()
        );

        Ok(EnhancedAudio {
            audio,
            analysis,
            reference_quality,
            synthesis_seconds,
        })
    }

    /// Normalize, analyze and chunk one text. Downstream stages run
    /// over the phonetic rendition so every reported offset stays valid
    /// against the string the engine actually receives.
    fn run_text_stages(&self, text: &str, chunker: &TextChunker) -> TextAnalysis {
        let normalized = if self.config.text.normalize {
            normalize(text)
        } else {
            text.to_string()
        };

        let processor = RegionalProcessor::new(self.config.regional.region)
            .auto_detect(self.config.regional.auto_detect)
            .apply_phonetics(self.config.regional.apply_phonetics);
        let regional = processor.process(&normalized);
        let speech_text = regional.phonetic.clone();

        let prosody = self
            .config
            .prosody
            .enabled
            .then(|| ProsodyAnalyzer::new().analyze(&speech_text));
        let breath = self
            .config
            .prosody
            .breath
            .then(|| BreathPauseAnalyzer::new().analyze(&speech_text));
        let discourse = self.config.prosody.discourse.then(|| {
            DiscourseProsodyAnalyzer::new(regional.region, self.config.prosody.voice_type)
                .process(&speech_text)
        });

        let selector = AdaptiveParameterSelector::new(self.config.assembly.crossfade_duration_s);
        let mut chunks = chunker.chunk(&speech_text);
        for chunk in &mut chunks {
            let nfe = selector.nfe_step(&chunk.text, self.config.synthesis.nfe_step);
            chunk.nfe_step = Some(nfe);
        }

        TextAnalysis {
            normalized,
            regional,
            prosody,
            breath,
            discourse,
            chunks,
        }
    }

    /// Synthesize chunks strictly in order. Cancellation discards the
    /// in-flight chunk and everything after it.
    async fn synthesize_chunks(
        &self,
        chunks: &[TextChunk],
        reference: &ReferenceClip,
        engine: &dyn SynthesisEngine,
        cancel: &CancellationToken,
    ) -> Result<Vec<AudioBuffer>> {
        let mut buffers = Vec::with_capacity(chunks.len());
        let mut sample_rate: Option<u32> = None;

        for chunk in chunks {
            if cancel.is_cancelled() {
                return Err(EnhanceError::Cancelled);
            }
            let request = ChunkRequest {
                ref_audio: &reference.audio,
                ref_text: &reference.text,
                text: &chunk.text,
                nfe_step: chunk.nfe_step.unwrap_or(crate::params::NFE_MIN),
                cfg_strength: self.config.synthesis.cfg_strength,
                speed: self.config.synthesis.speed,
                seed: self.config.synthesis.seed,
            };
            debug!(
                "chunk {}: {} chars, nfe {}",
                chunk.index,
                chunk.text.chars().count(),
                request.nfe_step
            );

            let buffer = tokio::select! {
                () = cancel.cancelled() => return Err(EnhanceError::Cancelled),
                result = engine.synthesize(request) => {
                    result.map_err(|e| EnhanceError::Synthesis {
                        chunk: chunk.index,
                        message: e.to_string(),
                    })?
                }
            };

            if buffer.is_empty() {
                return Err(EnhanceError::Synthesis {
                    chunk: chunk.index,
                    message: "engine returned empty audio".into(),
                });
            }
            match sample_rate {
                None => sample_rate = Some(buffer.sample_rate),
                Some(rate) if rate != buffer.sample_rate => {
                    return Err(EnhanceError::Audio(format!(
                        "chunk {} came back at {} Hz, expected {rate} Hz",
                        chunk.index, buffer.sample_rate
                    )));
                }
                Some(_) => {}
            }
            buffers.push(buffer);
        }

        Ok(buffers)
    }

    /// Left-to-right crossfade with per-seam adaptive durations, then
    /// edge fades on the final waveform. Seam durations are recorded
    /// back onto the chunk that fades in.
    fn assemble(&self, buffers: Vec<AudioBuffer>, analysis: &mut TextAnalysis) -> Result<AudioBuffer> {
        let seam_energies: Vec<(f32, f32)> = buffers
            .windows(2)
            .map(|pair| {
                let window = (ENERGY_WINDOW_S * pair[0].sample_rate as f32) as usize;
                (pair[0].tail_rms(window), pair[1].head_rms(window))
            })
            .collect();

        let crossfader = Crossfader::new(self.config.assembly.crossfade_curve);
        let selector = AdaptiveParameterSelector::new(self.config.assembly.crossfade_duration_s);

        let mut assembled: Option<AudioBuffer> = None;
        for (idx, buffer) in buffers.into_iter().enumerate() {
            assembled = Some(match assembled {
                None => buffer,
                Some(prev) => {
                    let prev_text = &analysis.chunks[idx - 1].text;
                    let next_text = &analysis.chunks[idx].text;
                    let seam_chars = prev_text.chars().count().min(next_text.chars().count());
                    let duration = selector.crossfade_duration(
                        seam_chars,
                        seam_energies[idx - 1],
                        ends_at_pause(prev_text),
                    );
                    analysis.chunks[idx].crossfade_duration_s = Some(duration);
                    crossfader.crossfade(&prev, &buffer, duration)?
                }
            });
        }

        let mut audio = assembled
            .unwrap_or_else(|| AudioBuffer::new(Vec::new(), 0));
        apply_edge_fades(&mut audio, self.config.assembly.edge_fade_s);
        Ok(audio)
    }
}

/// Seams that land on punctuation get a longer blend; the silence
/// around the pause hides it.
fn ends_at_pause(text: &str) -> bool {
    text.trim_end()
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | '!' | '?' | '…' | ',' | ';' | ':'))
}
