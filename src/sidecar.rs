//! Pre-transcription sidecar files.
//!
//! Batch transcription jobs leave a `<stem>.json` next to each
//! reference WAV. When one is present its text is authoritative and
//! the whole ASR step is skipped, which matters on machines where
//! transcribing the reference takes longer than synthesis itself.

use crate::error::{EnhanceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata written next to a reference recording by the transcription
/// step. Only `transcription` is required; hand-written sidecars
/// frequently carry nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSidecar {
    pub transcription: String,
    #[serde(default)]
    pub audio_path: Option<PathBuf>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<f32>,
    #[serde(default)]
    pub transcription_time_seconds: Option<f32>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}

impl TranscriptionSidecar {
    pub fn new(transcription: impl Into<String>) -> Self {
        Self {
            transcription: transcription.into(),
            audio_path: None,
            sample_rate: None,
            duration_seconds: None,
            transcription_time_seconds: None,
            device: None,
            model: None,
            generated_at: Some(Utc::now()),
        }
    }

    /// Look for `<stem>.json` next to the given audio file. A missing
    /// sidecar is not an error; a malformed one is, so that a typo in a
    /// hand-edited file cannot silently fall back to re-transcription.
    pub fn load_for_audio(audio_path: &Path) -> Result<Option<Self>> {
        let sidecar_path = audio_path.with_extension("json");
        if !sidecar_path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&sidecar_path)?;
        let sidecar: Self = serde_json::from_str(&raw).map_err(|e| {
            EnhanceError::Sidecar(format!(
                "malformed sidecar {}: {e}",
                sidecar_path.display()
            ))
        })?;
        debug!("loaded transcription sidecar from {}", sidecar_path.display());
        Ok(Some(sidecar))
    }

    /// Write the sidecar as pretty JSON next to the audio file.
    pub fn save_for_audio(&self, audio_path: &Path) -> Result<()> {
        let sidecar_path = audio_path.with_extension("json");
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| EnhanceError::Sidecar(format!("failed to serialize sidecar: {e}")))?;
        std::fs::write(&sidecar_path, data)?;
        Ok(())
    }
}
