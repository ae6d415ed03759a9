//! Prosodic annotation of Spanish text.
//!
//! Finds question and exclamation spans, emphasis, pause sites, stress
//! candidates and per-sentence pitch-contour labels. Positions are byte
//! offsets into the exact string analyzed; they are invalid against any
//! mutated copy of it.
//!
//! ```
//! use habla::prosody::{MarkerType, ProsodyAnalyzer};
//!
//! let analysis = ProsodyAnalyzer::new().analyze("¿Quieres café?");
//! assert!(analysis.markers.iter().any(|m| m.marker_type == MarkerType::Rising));
//! ```

pub mod breath;
pub mod discourse;

use serde::Serialize;
use tracing::debug;

/// Kinds of prosodic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Question,
    Exclamation,
    Emphasis,
    Pause,
    Rising,
    Falling,
}

/// One prosodic event, positioned by byte offset into the analyzed text.
#[derive(Debug, Clone, Serialize)]
pub struct ProsodyMarker {
    pub marker_type: MarkerType,
    pub position: usize,
    pub length: usize,
    /// Relative strength in `0.0..=1.0`.
    pub intensity: f32,
    pub metadata: String,
}

/// Per-sentence contour label from a majority vote over marker types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourLabel {
    Rising,
    Falling,
    Emphatic,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
pub struct PitchContour {
    /// Byte span of the sentence.
    pub start: usize,
    pub end: usize,
    pub label: ContourLabel,
}

/// Full prosodic annotation of one text.
#[derive(Debug, Clone, Serialize)]
pub struct ProsodyAnalysis {
    pub markers: Vec<ProsodyMarker>,
    /// Byte offsets one past each sentence-terminal punctuation run.
    pub sentence_boundaries: Vec<usize>,
    /// Coarse breath candidates. The breath scheduler makes the final
    /// call; see [`breath::BreathPauseAnalyzer`].
    pub breath_points: Vec<usize>,
    /// Byte offsets of content words, a coarse proxy for lexical stress.
    pub stress_points: Vec<usize>,
    pub pitch_contours: Vec<PitchContour>,
}

/// Wh-lexemes that open falling (pronominal) questions. Yes/no questions
/// rise instead.
const INTERROGATIVES: &[&str] = &[
    "qué",
    "quién",
    "quiénes",
    "cuál",
    "cuáles",
    "cuándo",
    "cuánto",
    "cuánta",
    "cuántos",
    "cuántas",
    "cómo",
    "dónde",
    "adónde",
    "por qué",
    "para qué",
];

/// Words that escalate a question or exclamation span's intensity.
const ESCALATION: &[&str] = &[
    "urgente",
    "ahora",
    "ya",
    "rápido",
    "inmediatamente",
    "nunca",
    "jamás",
    "ayuda",
    "cuidado",
    "peligro",
];

const INTENSIFIERS: &[&str] = &[
    "muy",
    "tan",
    "tanto",
    "demasiado",
    "súper",
    "sumamente",
    "increíblemente",
    "totalmente",
    "completamente",
    "absolutamente",
    "extremadamente",
    "realmente",
    "verdaderamente",
    "bastante",
];

const NEGATORS: &[&str] = &[
    "nunca", "jamás", "nada", "nadie", "ninguno", "ninguna", "tampoco",
];

/// Connectors that deserve a small pause when no punctuation provides one.
const CONNECTORS: &[&str] = &[
    "pero",
    "aunque",
    "sin embargo",
    "no obstante",
    "además",
    "entonces",
    "mientras",
    "porque",
    "por lo tanto",
    "es decir",
    "o sea",
    "así que",
];

/// Function words excluded from stress candidates. Only forms longer
/// than three characters matter; shorter words never qualify anyway.
const FUNCTION_WORDS: &[&str] = &[
    "para", "pero", "como", "esta", "este", "esto", "estas", "estos", "esa", "ese", "esas",
    "esos", "aquel", "aquella", "cuando", "donde", "mientras", "porque", "aunque", "entre",
    "sobre", "desde", "hasta", "contra", "durante", "mediante", "según", "todos", "todas",
    "otros", "otras", "unos", "unas", "ellos", "ellas", "usted", "ustedes", "nosotros",
    "vosotros", "también", "tampoco", "sino", "pues",
];

const QUESTION_BASE_INTENSITY: f32 = 0.7;
const EXCLAMATION_BASE_INTENSITY: f32 = 0.8;
const ESCALATION_BOOST: f32 = 0.2;

/// Minimum chars between coarse breath candidates at commas.
const BREATH_CANDIDATE_GAP_CHARS: usize = 60;

/// Stateless analyzer; all knowledge lives in the closed word lists
/// above.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProsodyAnalyzer;

impl ProsodyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> ProsodyAnalysis {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let words = scan_words(text, &chars);

        let mut markers = Vec::new();
        let (pause_markers, punct_char_positions) = scan_pauses(text, &chars);
        markers.extend(pause_markers);
        markers.extend(scan_spans(text, &chars));
        markers.extend(emphasis_markers(&words));
        markers.extend(connector_markers(&words, &punct_char_positions));

        let sentence_boundaries = sentence_boundaries(&chars);
        let stress_points = stress_points(&words);
        let breath_points = breath_candidates(&chars, &sentence_boundaries);

        markers.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.marker_type.cmp(&b.marker_type))
        });

        let pitch_contours = pitch_contours(text.len(), &sentence_boundaries, &markers);

        debug!(
            "prosody: {} markers, {} sentences, {} stress points",
            markers.len(),
            sentence_boundaries.len(),
            stress_points.len()
        );

        ProsodyAnalysis {
            markers,
            sentence_boundaries,
            breath_points,
            stress_points,
            pitch_contours,
        }
    }
}

/// A word token from the alphabetic-run scan.
struct Word {
    byte_start: usize,
    byte_len: usize,
    char_start: usize,
    char_len: usize,
    lower: String,
    all_caps: bool,
}

fn scan_words(text: &str, chars: &[(usize, char)]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].1.is_alphabetic() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].1.is_alphabetic() {
            i += 1;
        }
        let byte_start = chars[start].0;
        let byte_end = chars.get(i).map_or(text.len(), |&(b, _)| b);
        let raw = &text[byte_start..byte_end];
        words.push(Word {
            byte_start,
            byte_len: byte_end - byte_start,
            char_start: start,
            char_len: i - start,
            lower: raw.to_lowercase(),
            all_caps: i - start >= 2 && raw.chars().all(char::is_uppercase),
        });
    }
    words
}

/// Pause markers for punctuation, plus the char positions of every
/// punctuation mark (used by the connector proximity check).
fn scan_pauses(text: &str, chars: &[(usize, char)]) -> (Vec<ProsodyMarker>, Vec<usize>) {
    let mut markers = Vec::new();
    let mut punct_positions = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (byte, ch) = chars[i];
        let (class, intensity, run) = match ch {
            ',' => ("comma", 0.3, 1),
            ';' => ("semicolon", 0.5, 1),
            ':' => ("colon", 0.45, 1),
            '…' => ("ellipsis", 0.8, 1),
            '.' | '!' | '?' => {
                let mut j = i;
                while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?') {
                    j += 1;
                }
                let run = j - i;
                if ch == '.' && run >= 3 {
                    ("ellipsis", 0.8, run)
                } else {
                    ("terminal", 0.7, run)
                }
            }
            '\n' => {
                let mut j = i;
                while j < chars.len() && chars[j].1 == '\n' {
                    j += 1;
                }
                let run = j - i;
                if run >= 2 {
                    ("paragraph", 0.9, run)
                } else {
                    ("newline", 0.7, run)
                }
            }
            _ => {
                i += 1;
                continue;
            }
        };

        punct_positions.push(i);
        let end_byte = chars.get(i + run).map_or(text.len(), |&(b, _)| b);
        markers.push(ProsodyMarker {
            marker_type: MarkerType::Pause,
            position: byte,
            length: end_byte - byte,
            intensity,
            metadata: class.to_owned(),
        });
        i += run;
    }

    (markers, punct_positions)
}

/// Question and exclamation spans. A `¿`/`¡` opener binds to the next
/// matching closer; a bare closer binds back to the sentence start.
fn scan_spans(text: &str, chars: &[(usize, char)]) -> Vec<ProsodyMarker> {
    let mut markers = Vec::new();
    let mut open_question: Option<usize> = None;
    let mut open_exclamation: Option<usize> = None;
    let mut sentence_start = 0usize;

    for (i, &(_, ch)) in chars.iter().enumerate() {
        match ch {
            '¿' => open_question = Some(i),
            '¡' => open_exclamation = Some(i),
            '?' => {
                let start = open_question.take().unwrap_or(sentence_start);
                markers.extend(question_markers(text, chars, start, i));
            }
            '!' => {
                let start = open_exclamation.take().unwrap_or(sentence_start);
                markers.extend(exclamation_markers(text, chars, start, i));
            }
            '.' | '…' | '\n' => sentence_start = i + 1,
            _ => {}
        }
        if matches!(ch, '?' | '!') {
            sentence_start = i + 1;
        }
    }

    markers
}

fn span_bytes(text: &str, chars: &[(usize, char)], start: usize, end: usize) -> (usize, usize) {
    let byte_start = chars[start].0;
    let byte_end = chars.get(end + 1).map_or(text.len(), |&(b, _)| b);
    (byte_start, byte_end - byte_start)
}

fn question_markers(
    text: &str,
    chars: &[(usize, char)],
    start: usize,
    end: usize,
) -> Vec<ProsodyMarker> {
    let (position, length) = span_bytes(text, chars, start, end);
    let inner = text[position..position + length].to_lowercase();

    let is_wh = INTERROGATIVES
        .iter()
        .any(|w| first_word_is(&inner, w));
    let intensity = escalate(QUESTION_BASE_INTENSITY, &inner);

    let (tone, tone_meta, kind) = if is_wh {
        (MarkerType::Falling, "terminal_fall", "wh_question")
    } else {
        (MarkerType::Rising, "terminal_rise", "yes_no_question")
    };

    vec![
        ProsodyMarker {
            marker_type: MarkerType::Question,
            position,
            length,
            intensity,
            metadata: kind.to_owned(),
        },
        ProsodyMarker {
            marker_type: tone,
            position,
            length,
            intensity,
            metadata: tone_meta.to_owned(),
        },
    ]
}

fn exclamation_markers(
    text: &str,
    chars: &[(usize, char)],
    start: usize,
    end: usize,
) -> Vec<ProsodyMarker> {
    let (position, length) = span_bytes(text, chars, start, end);
    let inner = text[position..position + length].to_lowercase();

    vec![ProsodyMarker {
        marker_type: MarkerType::Exclamation,
        position,
        length,
        intensity: escalate(EXCLAMATION_BASE_INTENSITY, &inner),
        metadata: "exclamation".to_owned(),
    }]
}

/// First alphabetic word of a span, ignoring leading punctuation.
/// Multi-word lexemes ("por qué") compare against the same number of
/// leading words.
fn first_word_is(span_lower: &str, lexeme: &str) -> bool {
    let lexeme_words: Vec<&str> = lexeme.split_whitespace().collect();
    let span_words: Vec<String> = span_lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .take(lexeme_words.len())
        .map(str::to_owned)
        .collect();
    span_words.len() == lexeme_words.len()
        && span_words
            .iter()
            .zip(&lexeme_words)
            .all(|(a, b)| a == *b)
}

fn escalate(base: f32, span_lower: &str) -> f32 {
    if ESCALATION.iter().any(|w| span_lower.contains(w)) {
        (base + ESCALATION_BOOST).min(1.0)
    } else {
        base
    }
}

fn emphasis_markers(words: &[Word]) -> Vec<ProsodyMarker> {
    let mut markers = Vec::new();
    for word in words {
        let (intensity, metadata) = if word.all_caps {
            (0.9, format!("all_caps:{}", word.lower))
        } else if INTENSIFIERS.contains(&word.lower.as_str()) {
            (0.6, format!("intensifier:{}", word.lower))
        } else if NEGATORS.contains(&word.lower.as_str()) {
            (0.6, format!("negator:{}", word.lower))
        } else {
            continue;
        };
        markers.push(ProsodyMarker {
            marker_type: MarkerType::Emphasis,
            position: word.byte_start,
            length: word.byte_len,
            intensity,
            metadata,
        });
    }
    markers
}

/// A connector earns a small pause unless punctuation already sits
/// within five characters of it.
fn connector_markers(words: &[Word], punct_char_positions: &[usize]) -> Vec<ProsodyMarker> {
    let mut markers = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        let matched = CONNECTORS.iter().find(|c| {
            let parts: Vec<&str> = c.split_whitespace().collect();
            parts
                .iter()
                .enumerate()
                .all(|(k, part)| words.get(idx + k).is_some_and(|w| w.lower == *part))
        });
        let Some(connector) = matched else { continue };

        let near_punct = punct_char_positions
            .iter()
            .any(|&p| p.abs_diff(word.char_start) <= 5);
        if near_punct {
            continue;
        }

        markers.push(ProsodyMarker {
            marker_type: MarkerType::Pause,
            position: word.byte_start,
            length: word.byte_len,
            intensity: 0.25,
            metadata: format!("connector:{connector}"),
        });
    }
    markers
}

fn sentence_boundaries(chars: &[(usize, char)]) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if matches!(chars[i].1, '.' | '!' | '?' | '…' | '\n') {
            let mut j = i;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '…' | '\n') {
                j += 1;
            }
            let end_byte = chars
                .get(j)
                .map_or_else(|| byte_end_of(chars), |&(b, _)| b);
            boundaries.push(end_byte);
            i = j;
        } else {
            i += 1;
        }
    }
    boundaries
}

fn byte_end_of(chars: &[(usize, char)]) -> usize {
    chars
        .last()
        .map_or(0, |&(b, c)| b + c.len_utf8())
}

fn stress_points(words: &[Word]) -> Vec<usize> {
    words
        .iter()
        .filter(|w| w.char_len > 3 && !FUNCTION_WORDS.contains(&w.lower.as_str()))
        .map(|w| w.byte_start)
        .collect()
}

/// Breath candidates: every sentence boundary, plus commas far enough
/// from the previous candidate.
fn breath_candidates(chars: &[(usize, char)], sentence_boundaries: &[usize]) -> Vec<usize> {
    let mut candidates: Vec<usize> = sentence_boundaries.to_vec();
    let mut last_candidate_char = 0usize;
    let mut boundary_chars: Vec<usize> = Vec::new();
    for (i, &(byte, _)) in chars.iter().enumerate() {
        if sentence_boundaries.binary_search(&byte).is_ok() {
            boundary_chars.push(i);
        }
    }

    let mut next_boundary = 0usize;
    for (i, &(byte, ch)) in chars.iter().enumerate() {
        while next_boundary < boundary_chars.len() && boundary_chars[next_boundary] < i {
            last_candidate_char = boundary_chars[next_boundary];
            next_boundary += 1;
        }
        if ch == ',' && i - last_candidate_char >= BREATH_CANDIDATE_GAP_CHARS {
            candidates.push(byte);
            last_candidate_char = i;
        }
    }

    candidates.sort_unstable();
    candidates
}

fn pitch_contours(
    text_len: usize,
    boundaries: &[usize],
    markers: &[ProsodyMarker],
) -> Vec<PitchContour> {
    let mut contours = Vec::new();
    let mut start = 0usize;
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for &b in boundaries {
        if b > start {
            spans.push((start, b));
        }
        start = b;
    }
    if start < text_len {
        spans.push((start, text_len));
    }

    for (span_start, span_end) in spans {
        let mut rising = 0usize;
        let mut falling = 0usize;
        let mut emphatic = 0usize;
        for m in markers {
            if m.position < span_start || m.position >= span_end {
                continue;
            }
            match m.marker_type {
                MarkerType::Rising => rising += 1,
                MarkerType::Falling => falling += 1,
                MarkerType::Exclamation | MarkerType::Emphasis => emphatic += 1,
                _ => {}
            }
        }

        let best = [
            (ContourLabel::Rising, rising),
            (ContourLabel::Falling, falling),
            (ContourLabel::Emphatic, emphatic),
        ]
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .filter(|&(_, count)| count > 0);

        contours.push(PitchContour {
            start: span_start,
            end: span_end,
            label: best.map_or(ContourLabel::Neutral, |(label, _)| label),
        });
    }

    contours
}
