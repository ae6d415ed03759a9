//! Pause extraction and breath scheduling.
//!
//! Every punctuation mark gets a fixed-duration pause. Breaths are then
//! scheduled in a single greedy pass over the major pauses: paragraph
//! breaks always breathe, sentence ends breathe once enough estimated
//! speaking time has accumulated. The scheduler is deliberately biased
//! toward under-breathing and never places a breath mid-clause.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum estimated speaking time between breaths at sentence ends.
pub const MIN_BREATH_INTERVAL_MS: u32 = 8_000;

/// Speaking-rate estimate used to convert character counts into time.
pub const SPEAKING_CHARS_PER_SEC: f32 = 15.0;

/// Extra silence added to a pause selected as a breath point.
const BREATH_EXTENSION_MS: u32 = 150;

/// Cap on any breath-extended pause.
const MAX_BREATH_PAUSE_MS: u32 = 1_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseType {
    /// Dashes and parentheses.
    Micro,
    /// Commas.
    Short,
    /// Semicolons and colons.
    Medium,
    /// Sentence terminators, ellipses and single newlines.
    Long,
    /// Blank-line paragraph breaks.
    Paragraph,
    /// Reserved for explicitly scheduled inhale pauses. The scheduler
    /// keeps the punctuation type on selected pauses and flags them via
    /// `is_breath_point` instead.
    Breath,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pause {
    /// Byte offset of the punctuation that produced this pause.
    pub position: usize,
    pub pause_type: PauseType,
    pub duration_ms: u32,
    pub is_breath_point: bool,
    /// Punctuation class, e.g. "comma" or "paragraph".
    pub context: String,
}

/// Derived pause-and-breath structure for one text. Recomputed per call,
/// never cached.
#[derive(Debug, Clone, Serialize)]
pub struct BreathPattern {
    /// All pauses, sorted by position.
    pub pauses: Vec<Pause>,
    /// Positions of pauses selected as breath points. Always a subset of
    /// the long and paragraph pause positions.
    pub breath_points: Vec<usize>,
    /// Mean estimated speaking time between consecutive pauses.
    pub avg_pause_interval_ms: f32,
    /// Speaking time plus pause time for the whole text, in seconds.
    pub total_duration_estimate_s: f32,
}

#[derive(Debug, Clone)]
pub struct BreathPauseAnalyzer {
    pub chars_per_sec: f32,
    pub min_breath_interval_ms: u32,
}

impl Default for BreathPauseAnalyzer {
    fn default() -> Self {
        Self {
            chars_per_sec: SPEAKING_CHARS_PER_SEC,
            min_breath_interval_ms: MIN_BREATH_INTERVAL_MS,
        }
    }
}

impl BreathPauseAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&self, text: &str) -> BreathPattern {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let (mut pauses, char_positions) = scan_pauses(&chars);

        let mut breath_points = Vec::new();
        let mut last_breath_char = 0usize;
        for (k, pause) in pauses.iter_mut().enumerate() {
            if !matches!(pause.pause_type, PauseType::Long | PauseType::Paragraph) {
                continue;
            }
            let char_pos = char_positions[k];
            let speaking_ms =
                (char_pos - last_breath_char) as f32 / self.chars_per_sec * 1000.0;
            let elapsed_ms = speaking_ms + pause.duration_ms as f32;

            let breathe = pause.pause_type == PauseType::Paragraph
                || elapsed_ms >= self.min_breath_interval_ms as f32;
            if breathe {
                pause.is_breath_point = true;
                pause.duration_ms =
                    (pause.duration_ms + BREATH_EXTENSION_MS).min(MAX_BREATH_PAUSE_MS);
                breath_points.push(pause.position);
                last_breath_char = char_pos;
            }
        }

        let avg_pause_interval_ms = average_interval(&char_positions, self.chars_per_sec);
        let speech_s = chars.len() as f32 / self.chars_per_sec;
        let pause_s: f32 = pauses.iter().map(|p| p.duration_ms as f32 / 1000.0).sum();

        debug!(
            "breath schedule: {} pauses, {} breaths over ~{:.1}s",
            pauses.len(),
            breath_points.len(),
            speech_s + pause_s
        );

        BreathPattern {
            pauses,
            breath_points,
            avg_pause_interval_ms,
            total_duration_estimate_s: speech_s + pause_s,
        }
    }
}

/// Fixed duration table keyed by punctuation class.
fn classify(context: &str) -> (PauseType, u32) {
    match context {
        "comma" => (PauseType::Short, 200),
        "semicolon" => (PauseType::Medium, 400),
        "colon" => (PauseType::Medium, 350),
        "terminal" => (PauseType::Long, 600),
        "ellipsis" => (PauseType::Long, 800),
        "newline" => (PauseType::Long, 600),
        "paragraph" => (PauseType::Paragraph, 1000),
        _ => (PauseType::Micro, 150),
    }
}

/// One pause per punctuation run, in position order, with the parallel
/// char index of each pause for the scheduler's time math.
fn scan_pauses(chars: &[(usize, char)]) -> (Vec<Pause>, Vec<usize>) {
    let mut pauses = Vec::new();
    let mut char_positions = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (byte, ch) = chars[i];
        let (context, run) = match ch {
            ',' => ("comma", 1),
            ';' => ("semicolon", 1),
            ':' => ("colon", 1),
            '…' => ("ellipsis", 1),
            '—' | '–' => ("dash", 1),
            '(' | ')' => ("paren", 1),
            '.' | '!' | '?' => {
                let mut j = i;
                while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?') {
                    j += 1;
                }
                let run = j - i;
                if ch == '.' && run >= 3 {
                    ("ellipsis", run)
                } else {
                    ("terminal", run)
                }
            }
            '\n' => {
                let mut j = i;
                while j < chars.len() && chars[j].1 == '\n' {
                    j += 1;
                }
                let run = j - i;
                if run >= 2 { ("paragraph", run) } else { ("newline", run) }
            }
            _ => {
                i += 1;
                continue;
            }
        };

        let (pause_type, duration_ms) = classify(context);
        pauses.push(Pause {
            position: byte,
            pause_type,
            duration_ms,
            is_breath_point: false,
            context: context.to_owned(),
        });
        char_positions.push(i);
        i += run;
    }

    (pauses, char_positions)
}

fn average_interval(char_positions: &[usize], chars_per_sec: f32) -> f32 {
    if char_positions.len() < 2 {
        return 0.0;
    }
    let total_gap: usize = char_positions
        .windows(2)
        .map(|w| w[1] - w[0])
        .sum();
    let mean_chars = total_gap as f32 / (char_positions.len() - 1) as f32;
    mean_chars / chars_per_sec * 1000.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn analyze(text: &str) -> BreathPattern {
        BreathPauseAnalyzer::new().analyze(text)
    }

    #[test]
    fn duration_table() {
        let pattern = analyze("a, b; c: d. e… (f)");
        let by_context: Vec<(&str, u32)> = pattern
            .pauses
            .iter()
            .map(|p| (p.context.as_str(), p.duration_ms))
            .collect();
        assert!(by_context.contains(&("comma", 200)));
        assert!(by_context.contains(&("semicolon", 400)));
        assert!(by_context.contains(&("colon", 350)));
        assert!(by_context.contains(&("terminal", 600)));
        assert!(by_context.contains(&("ellipsis", 800)));
        assert!(by_context.contains(&("paren", 150)));
    }

    #[test]
    fn short_text_takes_no_breath() {
        let pattern = analyze("Hola mundo.");
        assert!(pattern.breath_points.is_empty());
        assert!(!pattern.pauses[0].is_breath_point);
    }

    #[test]
    fn paragraph_break_always_breathes() {
        let pattern = analyze("Primer párrafo.\n\nSegundo párrafo.");
        let paragraph = pattern
            .pauses
            .iter()
            .find(|p| p.pause_type == PauseType::Paragraph)
            .unwrap();
        assert!(paragraph.is_breath_point);
        assert_eq!(paragraph.duration_ms, 1000 + 150);
        assert!(pattern.breath_points.contains(&paragraph.position));
    }

    #[test]
    fn long_sentence_earns_a_breath() {
        // 15 words of 8 chars each puts the terminator at char 120,
        // which is 8 seconds of estimated speech.
        let text = format!("{}.", "palabra ".repeat(15).trim_end());
        let pattern = analyze(&text);
        assert_eq!(pattern.breath_points.len(), 1);

        let terminal = pattern.pauses.last().unwrap();
        assert!(terminal.is_breath_point);
        assert_eq!(terminal.duration_ms, 600 + 150);
    }

    #[test]
    fn commas_never_breathe() {
        let long_listing = "uno, dos, tres, cuatro, cinco, seis, siete, ocho, nueve, diez, \
                            once, doce, trece, catorce, quince, dieciséis, diecisiete, \
                            dieciocho, diecinueve, veinte, veintiuno, veintidós, veintitrés";
        let pattern = analyze(long_listing);
        assert!(pattern.breath_points.is_empty());
    }

    #[test]
    fn breath_points_subset_of_major_pauses() {
        let text = "Una frase larga que sigue y sigue hasta cansar al lector, con una coma. \
                    Otra frase igual de larga que también sigue y sigue sin parar nunca jamás. \
                    Y una tercera frase para rematar el párrafo con algo de contundencia.\n\n\
                    Nuevo párrafo final.";
        let pattern = analyze(text);

        let major: Vec<usize> = pattern
            .pauses
            .iter()
            .filter(|p| matches!(p.pause_type, PauseType::Long | PauseType::Paragraph))
            .map(|p| p.position)
            .collect();
        for bp in &pattern.breath_points {
            assert!(major.contains(bp), "breath at {bp} is not a major pause");
        }
    }

    #[test]
    fn estimates_are_positive() {
        let pattern = analyze("Una frase. Otra frase, con coma.");
        assert!(pattern.avg_pause_interval_ms > 0.0);
        assert!(pattern.total_duration_estimate_s > 0.0);
    }

    #[test]
    fn pauses_are_sorted() {
        let pattern = analyze("a, b. c; d.");
        let positions: Vec<usize> = pattern.pauses.iter().map(|p| p.position).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}
