//! Habla: Spanish text enhancement and adaptive audio assembly for
//! voice cloning.
//!
//! This crate sits between raw input text and a neural voice-synthesis
//! engine. It turns text into speakable Spanish and stitches the
//! engine's per-chunk output into one continuous waveform:
//!
//! Text → normalize → regional processing → prosody/breath/discourse →
//! chunking → per-chunk knobs → \[external synthesis\] → crossfade →
//! final audio
//!
//! # Architecture
//!
//! Each stage is a pure function over its input; the only shared state
//! is read-only static tables (slang dictionaries, regional profiles,
//! pause durations):
//! - **Normalizer**: Expands numbers, dates, times, currency and
//!   abbreviations into words
//! - **RegionalProcessor**: Detects regional slang, applies phonetic
//!   respellings, and selects a prosodic profile
//! - **ProsodyAnalyzer / BreathPauseAnalyzer / DiscourseProsodyAnalyzer**:
//!   Annotate intonation, pauses, breath points and nuclear tones
//! - **TextChunker**: Splits text into bounded chunks, optionally sized
//!   from a reference recording's speaking rate
//! - **AdaptiveParameterSelector**: Picks NFE steps and crossfade
//!   durations per chunk
//! - **AudioQualityAnalyzer**: Scores reference recordings before
//!   synthesis (warn-only)
//! - **Crossfader**: Blends adjacent chunk waveforms with equal-power,
//!   raised-cosine or linear envelopes
//!
//! The synthesis model itself stays behind the
//! [`pipeline::SynthesisEngine`] trait; this crate never loads weights.

pub mod audio;
pub mod chunk;
pub mod config;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod prosody;
pub mod regional;
pub mod sidecar;
pub mod text;

pub use audio::AudioBuffer;
pub use audio::crossfade::{CrossfadeCurve, Crossfader};
pub use audio::quality::{AudioQualityAnalyzer, QualityLevel, QualityMetrics};
pub use chunk::{ChunkStrategy, TextChunk, TextChunker};
pub use config::EnhanceConfig;
pub use error::{EnhanceError, Result};
pub use params::AdaptiveParameterSelector;
pub use pipeline::{
    ChunkRequest, EnhancedAudio, EnhancementPipeline, ReferenceClip, SynthesisEngine, TextAnalysis,
};
pub use prosody::ProsodyAnalyzer;
pub use prosody::breath::BreathPauseAnalyzer;
pub use prosody::discourse::DiscourseProsodyAnalyzer;
pub use regional::{Region, RegionalProcessor, RegionalText};
pub use sidecar::TranscriptionSidecar;
