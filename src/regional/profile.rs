//! Per-region prosodic constants.
//!
//! Each region carries one immutable profile describing how its speech
//! differs from the neutral baseline: pace multipliers, stress and rhythm
//! descriptions, and typical F0 ranges per voice type. The discourse
//! analysis copies the F0 bounds into its declination units.

use serde::{Deserialize, Serialize};

/// Voice type used to select an F0 range from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceType {
    Female,
    Male,
}

/// Immutable prosodic constants for one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionalProsodicProfile {
    /// Conversational speed multiplier relative to neutral Latin American
    /// Spanish (1.0).
    pub pace: f32,
    /// Speed multiplier for read-aloud material, always a little slower
    /// than free conversation.
    pub reading_pace: f32,
    pub stress_pattern: &'static str,
    pub intonation: &'static str,
    /// Typical fundamental-frequency range (min, max) in Hz.
    pub f0_female_hz: (f32, f32),
    pub f0_male_hz: (f32, f32),
    pub rhythm: &'static str,
    pub emotional_coloring: &'static str,
}

impl RegionalProsodicProfile {
    /// F0 bounds (min, max) in Hz for the given voice type.
    pub fn f0_range(&self, voice: VoiceType) -> (f32, f32) {
        match voice {
            VoiceType::Female => self.f0_female_hz,
            VoiceType::Male => self.f0_male_hz,
        }
    }
}

pub(crate) static NEUTRAL: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 1.0,
    reading_pace: 0.95,
    stress_pattern: "paroxytone-dominant",
    intonation: "moderate final falls",
    f0_female_hz: (165.0, 255.0),
    f0_male_hz: (85.0, 155.0),
    rhythm: "syllable-timed",
    emotional_coloring: "even",
};

pub(crate) static RIOPLATENSE: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 1.02,
    reading_pace: 0.97,
    stress_pattern: "paroxytone-dominant, voseo oxytone verb forms",
    intonation: "italianate rise-fall",
    f0_female_hz: (160.0, 280.0),
    f0_male_hz: (80.0, 165.0),
    rhythm: "syllable-timed with lengthened stressed vowels",
    emotional_coloring: "expressive",
};

pub(crate) static MEXICAN: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 0.98,
    reading_pace: 0.94,
    stress_pattern: "paroxytone-dominant",
    intonation: "circumflex final contours",
    f0_female_hz: (170.0, 260.0),
    f0_male_hz: (90.0, 150.0),
    rhythm: "syllable-timed",
    emotional_coloring: "courteous, soft",
};

pub(crate) static CARIBBEAN: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 1.12,
    reading_pace: 1.05,
    stress_pattern: "paroxytone-dominant, weakened codas",
    intonation: "high plateau with sharp falls",
    f0_female_hz: (175.0, 270.0),
    f0_male_hz: (95.0, 160.0),
    rhythm: "quick, reduced unstressed syllables",
    emotional_coloring: "animated",
};

pub(crate) static ANDEAN: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 0.92,
    reading_pace: 0.88,
    stress_pattern: "paroxytone-dominant",
    intonation: "gentle falls in a narrow range",
    f0_female_hz: (170.0, 240.0),
    f0_male_hz: (90.0, 140.0),
    rhythm: "measured",
    emotional_coloring: "reserved",
};

pub(crate) static CHILEAN: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 1.1,
    reading_pace: 1.02,
    stress_pattern: "paroxytone-dominant, clipped codas",
    intonation: "rapid rise-falls",
    f0_female_hz: (165.0, 265.0),
    f0_male_hz: (85.0, 155.0),
    rhythm: "fast, elided final syllables",
    emotional_coloring: "lively",
};

pub(crate) static COLOMBIAN: RegionalProsodicProfile = RegionalProsodicProfile {
    pace: 0.97,
    reading_pace: 0.93,
    stress_pattern: "paroxytone-dominant",
    intonation: "clear melodic falls",
    f0_female_hz: (170.0, 255.0),
    f0_male_hz: (90.0, 150.0),
    rhythm: "even, fully articulated",
    emotional_coloring: "warm",
};
