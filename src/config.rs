//! Configuration types for the enhancement pipeline.

use crate::audio::crossfade::CrossfadeCurve;
use crate::regional::{Region, VoiceType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for text enhancement and audio assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Text normalization settings.
    pub text: TextConfig,
    /// Regional Spanish processing settings.
    pub regional: RegionalConfig,
    /// Prosody, breath and discourse analysis settings.
    pub prosody: ProsodyConfig,
    /// Text chunking settings.
    pub chunking: ChunkingConfig,
    /// Per-chunk synthesis knobs passed to the external engine.
    pub synthesis: SynthesisConfig,
    /// Waveform assembly settings.
    pub assembly: AssemblyConfig,
}

/// Text normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Whether to expand numbers, dates, times, currency and
    /// abbreviations into words before synthesis.
    pub normalize: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// Regional Spanish configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalConfig {
    /// Region used when auto-detection is off or finds nothing.
    pub region: Region,
    /// Detect the region from slang when the text disagrees with the
    /// configured one.
    pub auto_detect: bool,
    /// Rewrite text with regional phonetic spellings (e.g. rioplatense
    /// sheísmo). Off by default since most voices render standard
    /// orthography better.
    pub apply_phonetics: bool,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self {
            region: Region::Neutral,
            auto_detect: true,
            apply_phonetics: false,
        }
    }
}

/// Prosody analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProsodyConfig {
    /// Whether to run marker/contour analysis at all.
    pub enabled: bool,
    /// Whether to schedule breath points over the pause structure.
    pub breath: bool,
    /// Whether to run the discourse-level nuclear-tone layer.
    pub discourse: bool,
    /// Voice register used to pick the F0 range from the regional
    /// profile.
    pub voice_type: VoiceType,
}

impl Default for ProsodyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            breath: true,
            discourse: true,
            voice_type: VoiceType::Female,
        }
    }
}

/// Chunking strategy selector, flat for TOML friendliness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Split on sentence boundaries, pack greedily (default).
    Sentence,
    /// Derive the byte budget from the reference clip's speaking rate.
    Adaptive,
    /// Raw byte-offset splitting. Baseline only.
    Fixed,
}

/// Text chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub mode: ChunkMode,
    /// Chunk budget in UTF-8 bytes. Ignored in adaptive mode, which
    /// measures the reference instead.
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            mode: ChunkMode::Sentence,
            max_chars: 400,
        }
    }
}

/// Knobs forwarded to the external synthesis engine per chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Fixed NFE step count. None lets the selector pick per chunk.
    pub nfe_step: Option<u32>,
    /// Classifier-free guidance strength.
    pub cfg_strength: f32,
    /// Playback speed multiplier applied by the engine.
    pub speed: f32,
    /// Sampling seed for reproducible synthesis.
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            nfe_step: None,
            cfg_strength: 2.0,
            speed: 1.0,
            seed: None,
        }
    }
}

/// Waveform assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Base crossfade length in seconds before adaptive adjustment.
    pub crossfade_duration_s: f32,
    /// Fade envelope shape at chunk seams.
    pub crossfade_curve: CrossfadeCurve,
    /// Linear fade applied to the outer edges of the final waveform.
    pub edge_fade_s: f32,
    /// Score the reference clip and log issues before synthesis. Never
    /// blocks a request.
    pub analyze_reference: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            crossfade_duration_s: 0.5,
            crossfade_curve: CrossfadeCurve::EqualPower,
            edge_fade_s: 0.01,
            analyze_reference: true,
        }
    }
}

impl EnhanceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::EnhanceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EnhanceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/habla/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("habla").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("habla")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/habla-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EnhanceConfig::default();
        assert_eq!(config.regional.region, Region::Neutral);
        assert!(config.regional.auto_detect);
        assert!(!config.regional.apply_phonetics);
        assert!(config.prosody.enabled);
        assert_eq!(config.chunking.mode, ChunkMode::Sentence);
        assert!(config.chunking.max_chars > 0);
        assert!(config.synthesis.cfg_strength > 0.0);
        assert!(config.assembly.crossfade_duration_s > 0.0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = EnhanceConfig::default();
        config.regional.region = Region::Rioplatense;
        config.regional.apply_phonetics = true;
        config.synthesis.cfg_strength = 2.5;
        config.chunking.max_chars = 350;
        config.assembly.crossfade_curve = CrossfadeCurve::Linear;

        config.save_to_file(&path).unwrap();
        assert!(path.exists());

        let loaded = EnhanceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.regional.region, Region::Rioplatense);
        assert!(loaded.regional.apply_phonetics);
        assert!((loaded.synthesis.cfg_strength - 2.5).abs() < f32::EPSILON);
        assert_eq!(loaded.chunking.max_chars, 350);
        assert_eq!(loaded.assembly.crossfade_curve, CrossfadeCurve::Linear);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: EnhanceConfig = toml::from_str(
            r#"
            [regional]
            region = "mexican"
            "#,
        )
        .unwrap();

        assert_eq!(config.regional.region, Region::Mexican);
        // Everything else comes from defaults.
        assert!(config.regional.auto_detect);
        assert_eq!(config.chunking.max_chars, 400);
        assert!((config.assembly.crossfade_duration_s - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_region_fails_to_parse() {
        let result: std::result::Result<EnhanceConfig, _> = toml::from_str(
            r#"
            [regional]
            region = "klingon"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = EnhanceConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("habla"));
    }

    #[test]
    fn chunk_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChunkMode::Adaptive).unwrap(),
            "\"adaptive\""
        );
    }
}
