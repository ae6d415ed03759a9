//! Discourse-level prosody enrichment.
//!
//! Segments text into intonational phrases, assigns nuclear tones and
//! groups phrases into declination units that reset at topic boundaries.
//! F0 bounds come from the active region's profile for the chosen voice
//! type.

use crate::regional::{Region, RegionalProsodicProfile, VoiceType};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NuclearTone {
    Descending,
    Suspensive,
    Ascending,
}

/// Qualitative F0 level at a phrase edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum F0Level {
    High,
    Mid,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscourseRole {
    Opening,
    Continuation,
    Closure,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntonationalPhrase {
    pub text: String,
    pub nuclear_tone: NuclearTone,
    pub f0_start: F0Level,
    pub f0_end: F0Level,
    pub topic_boundary: bool,
    pub role: DiscourseRole,
}

/// Consecutive phrases between topic boundaries, annotated with the F0
/// bounds the declination should span.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeclinationUnit {
    /// Phrase index range, end exclusive.
    pub start: usize,
    pub end: usize,
    pub f0_max_hz: f32,
    pub f0_min_hz: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscourseAnalysis {
    pub phrases: Vec<IntonationalPhrase>,
    pub declination_units: Vec<DeclinationUnit>,
    /// (min, max) F0 in Hz for the configured voice.
    pub f0_range_hz: (f32, f32),
}

/// Lexical markers of given (already known) information; these phrases
/// take an anticadence instead of falling.
const GIVEN_INFO: &[&str] = &[
    "como dije",
    "como sabes",
    "ya sabes",
    "como mencioné",
    "por supuesto",
    "obviamente",
    "evidentemente",
    "claro que",
];

/// Markers that open a new topic mid-discourse.
const DISCOURSE_MARKERS: &[&str] = &[
    "bueno",
    "ahora bien",
    "por otro lado",
    "por otra parte",
    "en primer lugar",
    "en segundo lugar",
    "además",
    "finalmente",
    "en conclusión",
    "por último",
    "cambiando de tema",
    "en resumen",
];

/// Conjunctions that can open a new phrase mid-clause.
const CONJUNCTIONS: &[&str] = &[
    "sin embargo",
    "así que",
    "mientras que",
    "pero",
    "sino",
    "aunque",
    "porque",
];

/// Both sides of a conjunction split must keep at least this many bytes;
/// anything shorter stays one phrase.
const MIN_CLAUSE_BYTES: usize = 15;

#[derive(Debug, Clone)]
pub struct DiscourseProsodyAnalyzer {
    profile: &'static RegionalProsodicProfile,
    voice: VoiceType,
}

impl DiscourseProsodyAnalyzer {
    pub fn new(region: Region, voice: VoiceType) -> Self {
        Self {
            profile: region.profile(),
            voice,
        }
    }

    pub fn process(&self, text: &str) -> DiscourseAnalysis {
        let (f0_min, f0_max) = self.profile.f0_range(self.voice);

        let mut phrases: Vec<IntonationalPhrase> = Vec::new();
        for sentence in split_sentences(text) {
            let parts = split_phrases(&sentence);
            let count = parts.len();
            for (idx, part) in parts.into_iter().enumerate() {
                let lower = part.to_lowercase();
                let sentence_initial = idx == 0;
                let tone = nuclear_tone(&part, &lower, idx + 1 == count);
                let topic_boundary = sentence_initial
                    || DISCOURSE_MARKERS.iter().any(|m| opens_with(&lower, m));

                phrases.push(IntonationalPhrase {
                    text: part,
                    nuclear_tone: tone,
                    f0_start: if topic_boundary { F0Level::High } else { F0Level::Mid },
                    f0_end: match tone {
                        NuclearTone::Ascending => F0Level::High,
                        NuclearTone::Suspensive => F0Level::Mid,
                        NuclearTone::Descending => F0Level::Low,
                    },
                    topic_boundary,
                    role: DiscourseRole::Continuation,
                });
            }
        }

        let declination_units = group_units(&phrases, f0_max, f0_min);
        for unit in &declination_units {
            for idx in unit.start..unit.end {
                phrases[idx].role = if idx == unit.start {
                    DiscourseRole::Opening
                } else if idx + 1 == unit.end {
                    DiscourseRole::Closure
                } else {
                    DiscourseRole::Continuation
                };
            }
        }

        debug!(
            "discourse: {} phrases in {} declination units",
            phrases.len(),
            declination_units.len()
        );

        DiscourseAnalysis {
            phrases,
            declination_units,
            f0_range_hz: (f0_min, f0_max),
        }
    }
}

/// Nuclear-tone priority chain; first match wins. The order is load
/// bearing: a final question phrase still ascends.
fn nuclear_tone(phrase: &str, lower: &str, last_in_sentence: bool) -> NuclearTone {
    if phrase.contains('?') || phrase.contains('¿') {
        NuclearTone::Ascending
    } else if last_in_sentence {
        NuclearTone::Descending
    } else if GIVEN_INFO.iter().any(|m| lower.contains(m)) {
        NuclearTone::Ascending
    } else {
        NuclearTone::Suspensive
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?' | '…' | '\n') {
            let run_continues = chars
                .peek()
                .is_some_and(|n| matches!(n, '.' | '!' | '?' | '…' | '\n'));
            if !run_continues {
                push_trimmed(&mut sentences, &current);
                current.clear();
            }
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn split_phrases(sentence: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in sentence.chars() {
        if matches!(c, ',' | ';' | ':') {
            push_trimmed(&mut pieces, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_trimmed(&mut pieces, &current);

    pieces
        .iter()
        .flat_map(|p| split_on_conjunctions(p))
        .collect()
}

fn split_on_conjunctions(piece: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest: &str = piece;

    'outer: loop {
        let words = words_of(rest);
        for (i, &(byte_start, _)) in words.iter().enumerate() {
            for conj in CONJUNCTIONS {
                let conj_words: Vec<&str> = conj.split_whitespace().collect();
                let matched = conj_words
                    .iter()
                    .enumerate()
                    .all(|(k, cw)| words.get(i + k).is_some_and(|(_, w)| w == cw));
                if matched
                    && byte_start >= MIN_CLAUSE_BYTES
                    && rest.len() - byte_start >= MIN_CLAUSE_BYTES
                {
                    parts.push(rest[..byte_start].trim().to_owned());
                    rest = &rest[byte_start..];
                    continue 'outer;
                }
            }
        }
        push_trimmed(&mut parts, rest);
        break;
    }

    parts
}

/// Lowercased word tokens with their byte offsets.
fn words_of(text: &str) -> Vec<(usize, String)> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    for (b, c) in text.char_indices() {
        if c.is_alphabetic() {
            if start.is_none() {
                start = Some(b);
            }
        } else if let Some(s) = start.take() {
            words.push((s, text[s..b].to_lowercase()));
        }
    }
    if let Some(s) = start {
        words.push((s, text[s..].to_lowercase()));
    }
    words
}

fn opens_with(phrase_lower: &str, marker: &str) -> bool {
    let words = words_of(phrase_lower);
    let marker_words: Vec<&str> = marker.split_whitespace().collect();
    marker_words
        .iter()
        .enumerate()
        .all(|(k, m)| words.get(k).is_some_and(|(_, w)| w == m))
}

fn push_trimmed(list: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        list.push(trimmed.to_owned());
    }
}

fn group_units(phrases: &[IntonationalPhrase], f0_max: f32, f0_min: f32) -> Vec<DeclinationUnit> {
    let mut units = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, phrase) in phrases.iter().enumerate() {
        if phrase.topic_boundary {
            if let Some(s) = start.take() {
                units.push(DeclinationUnit {
                    start: s,
                    end: idx,
                    f0_max_hz: f0_max,
                    f0_min_hz: f0_min,
                });
            }
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        units.push(DeclinationUnit {
            start: s,
            end: phrases.len(),
            f0_max_hz: f0_max,
            f0_min_hz: f0_min,
        });
    }

    units
}
