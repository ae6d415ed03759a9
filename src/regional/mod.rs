//! Regional Spanish processing.
//!
//! Detects region-specific slang, optionally respells text for dialect
//! pronunciation, and attaches the region's prosodic profile. Region can
//! be fixed by configuration or auto-detected from slang markers.
//!
//! ```
//! use habla::regional::{Region, RegionalProcessor};
//!
//! let processor = RegionalProcessor::new(Region::Rioplatense);
//! let result = processor.process("Che, ¿vos querés un mate?");
//! assert!(result.detected_slang.iter().any(|t| t.term == "che"));
//! ```

pub mod phonetics;
pub mod profile;
pub mod slang;

pub use phonetics::{PhoneticRule, RuleScope};
pub use profile::{RegionalProsodicProfile, VoiceType};
pub use slang::{Register, SlangCategory, SlangTerm};

use crate::error::{EnhanceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Supported Spanish regions, a closed set. Any other region name is a
/// validation error before processing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Neutral,
    Rioplatense,
    Colombian,
    Mexican,
    Chilean,
    Caribbean,
    Andean,
}

impl Region {
    /// Every supported region. The order doubles as the tie-break order
    /// for auto-detection.
    pub const ALL: [Region; 7] = [
        Region::Neutral,
        Region::Rioplatense,
        Region::Colombian,
        Region::Mexican,
        Region::Chilean,
        Region::Caribbean,
        Region::Andean,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Neutral => "neutral",
            Region::Rioplatense => "rioplatense",
            Region::Colombian => "colombian",
            Region::Mexican => "mexican",
            Region::Chilean => "chilean",
            Region::Caribbean => "caribbean",
            Region::Andean => "andean",
        }
    }

    /// Prosodic constants for this region.
    pub fn profile(self) -> &'static RegionalProsodicProfile {
        match self {
            Region::Neutral => &profile::NEUTRAL,
            Region::Rioplatense => &profile::RIOPLATENSE,
            Region::Colombian => &profile::COLOMBIAN,
            Region::Mexican => &profile::MEXICAN,
            Region::Chilean => &profile::CHILEAN,
            Region::Caribbean => &profile::CARIBBEAN,
            Region::Andean => &profile::ANDEAN,
        }
    }

    /// Slang dictionary for this region. Neutral carries none.
    pub fn slang(self) -> &'static [SlangTerm] {
        match self {
            Region::Neutral => &[],
            Region::Rioplatense => slang::RIOPLATENSE,
            Region::Colombian => slang::COLOMBIAN,
            Region::Mexican => slang::MEXICAN,
            Region::Chilean => slang::CHILEAN,
            Region::Caribbean => slang::CARIBBEAN,
            Region::Andean => slang::ANDEAN,
        }
    }

    /// Ordered phonetic respelling rules for this region.
    pub fn phonetic_rules(self) -> &'static [PhoneticRule] {
        match self {
            Region::Rioplatense => phonetics::RIOPLATENSE,
            Region::Chilean => phonetics::CHILEAN,
            Region::Caribbean => phonetics::CARIBBEAN,
            _ => phonetics::NONE,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = EnhanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Ok(Region::Neutral),
            "rioplatense" | "argentina" | "uruguay" => Ok(Region::Rioplatense),
            "colombian" | "colombia" => Ok(Region::Colombian),
            "mexican" | "mexico" | "méxico" => Ok(Region::Mexican),
            "chilean" | "chile" => Ok(Region::Chilean),
            "caribbean" | "caribe" | "cuba" | "puerto rico" | "dominicana" => Ok(Region::Caribbean),
            "andean" | "andino" | "peru" | "perú" | "bolivia" | "ecuador" => Ok(Region::Andean),
            other => Err(EnhanceError::Region(other.to_owned())),
        }
    }
}

/// Score text against every region's slang markers. The highest
/// match count wins; ties keep the earlier region in [`Region::ALL`].
/// `None` when no marker matched at all.
pub fn detect_region(text: &str) -> Option<Region> {
    let lower = text.to_lowercase();
    let mut best: Option<(Region, usize)> = None;
    for region in Region::ALL {
        let score = slang::find_terms(&lower, region.slang()).len();
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((region, score));
        }
    }
    best.map(|(region, _)| region)
}

/// Output of regional processing for one text.
#[derive(Debug, Clone, Serialize)]
pub struct RegionalText {
    /// The analyzed text, unchanged.
    pub source: String,
    /// Text after phonetic respelling. Equal to `source` when respelling
    /// is disabled or the region has no rules.
    pub phonetic: String,
    /// Region the analysis ran under, detected or configured.
    pub region: Region,
    pub detected_slang: Vec<SlangTerm>,
    /// Free-form guidance for the synthesis stage.
    pub prosodic_hints: Vec<String>,
    pub profile: &'static RegionalProsodicProfile,
}

/// Applies region-specific processing to normalized text.
#[derive(Debug, Clone)]
pub struct RegionalProcessor {
    region: Region,
    auto_detect: bool,
    apply_phonetics: bool,
}

impl RegionalProcessor {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            auto_detect: false,
            apply_phonetics: false,
        }
    }

    /// Build from a configured region name. Unknown names fail here,
    /// before any text is touched.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Let slang markers override the configured region when they point
    /// somewhere specific.
    pub fn auto_detect(mut self, enabled: bool) -> Self {
        self.auto_detect = enabled;
        self
    }

    /// Enable dialect respelling of the output text.
    pub fn apply_phonetics(mut self, enabled: bool) -> Self {
        self.apply_phonetics = enabled;
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn process(&self, text: &str) -> RegionalText {
        let region = if self.auto_detect {
            detect_region(text).unwrap_or(self.region)
        } else {
            self.region
        };

        let lower = text.to_lowercase();
        let detected_slang = slang::find_terms(&lower, region.slang());
        let phonetic = if self.apply_phonetics {
            phonetics::apply(text, region.phonetic_rules())
        } else {
            text.to_owned()
        };
        let profile = region.profile();
        let prosodic_hints = build_hints(region, profile, &detected_slang);

        debug!(
            "regional pass: {region} with {} slang hits",
            detected_slang.len()
        );

        RegionalText {
            source: text.to_owned(),
            phonetic,
            region,
            detected_slang,
            prosodic_hints,
            profile,
        }
    }
}

fn build_hints(
    region: Region,
    profile: &RegionalProsodicProfile,
    slang_hits: &[SlangTerm],
) -> Vec<String> {
    let mut hints = Vec::new();
    if region != Region::Neutral {
        hints.push(format!("{region} intonation: {}", profile.intonation));
        hints.push(format!("rhythm: {}", profile.rhythm));
    }
    if (profile.pace - 1.0).abs() > f32::EPSILON {
        hints.push(format!("speech rate x{:.2}", profile.pace));
    }
    if slang_hits.iter().any(|t| t.register == Register::Vulgar) {
        hints.push("register: very informal, relaxed articulation".to_owned());
    } else if !slang_hits.is_empty() {
        hints.push("register: colloquial".to_owned());
    }
    hints
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn detects_rioplatense_slang() {
        let processor = RegionalProcessor::new(Region::Neutral).auto_detect(true);
        let result = processor.process("Che boludo, ¿vos querés tomar unos mates?");

        assert_eq!(result.region, Region::Rioplatense);
        let terms: Vec<&str> = result.detected_slang.iter().map(|t| t.term).collect();
        for expected in ["che", "boludo", "vos", "querés"] {
            assert!(terms.contains(&expected), "missing {expected} in {terms:?}");
        }
    }

    #[test]
    fn detects_chilean_slang() {
        assert_eq!(
            detect_region("cachai que el carrete estuvo bacán po"),
            Some(Region::Chilean)
        );
    }

    #[test]
    fn containment_fires_inside_longer_words() {
        // "che" sits inside "noche" and "leche"; substring scoring
        // counts it and tips detection to rioplatense.
        let result = RegionalProcessor::new(Region::Rioplatense)
            .process("Esta noche tomamos leche.");
        let terms: Vec<&str> = result.detected_slang.iter().map(|t| t.term).collect();
        assert_eq!(terms, ["che"]);

        let detected = RegionalProcessor::new(Region::Neutral)
            .auto_detect(true)
            .process("Esta noche tomamos leche.");
        assert_eq!(detected.region, Region::Rioplatense);
    }

    #[test]
    fn detection_tie_keeps_earlier_region() {
        // "vaina" sits in both the Colombian and Caribbean dictionaries.
        assert_eq!(detect_region("qué vaina"), Some(Region::Colombian));
    }

    #[test]
    fn no_slang_means_no_detection() {
        assert_eq!(detect_region("el informe trimestral está listo"), None);

        let processor = RegionalProcessor::new(Region::Mexican).auto_detect(true);
        let result = processor.process("el informe trimestral está listo");
        assert_eq!(result.region, Region::Mexican);
    }

    #[test]
    fn unknown_region_name_is_rejected() {
        let err = "klingon".parse::<Region>().unwrap_err();
        assert!(err.to_string().contains("unsupported region"));
    }

    #[test]
    fn region_names_round_trip() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn phonetics_are_opt_in() {
        let plain = RegionalProcessor::new(Region::Rioplatense);
        assert_eq!(plain.process("la calle").phonetic, "la calle");

        let respelled = RegionalProcessor::new(Region::Rioplatense).apply_phonetics(true);
        assert_eq!(respelled.process("la calle").phonetic, "la cashe");
    }

    #[test]
    fn hints_reflect_register() {
        let processor = RegionalProcessor::new(Region::Rioplatense);
        let result = processor.process("che boludo");
        assert!(
            result
                .prosodic_hints
                .iter()
                .any(|h| h.contains("very informal"))
        );
    }

    #[test]
    fn region_serializes_lowercase() {
        let json = serde_json::to_string(&Region::Rioplatense).unwrap();
        assert_eq!(json, "\"rioplatense\"");
    }
}
