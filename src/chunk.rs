//! Text chunking for bounded synthesis requests.
//!
//! The synthesis model degrades on long inputs, so text is cut into
//! ordered chunks bounded by UTF-8 byte length. Sentence-based packing is
//! the production strategy; the adaptive variant sizes chunks from a
//! reference recording's measured speaking rate; fixed splitting survives
//! only as a baseline.
//!
//! Chunks never split inside a UTF-8 code point. The byte bound is
//! exceeded only when a single word is longer than the bound itself.

use crate::error::{EnhanceError, Result};
use serde::Serialize;
use tracing::debug;

/// Target seconds of synthesized audio per adaptive chunk.
const TARGET_CHUNK_SECONDS: f32 = 30.0;

/// Floor for the adaptive byte bound; tiny reference clips would
/// otherwise produce degenerate chunking.
const ADAPTIVE_MIN_CHARS: usize = 200;

/// How to cut text, chosen once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "strategy")]
pub enum ChunkStrategy {
    /// Split at sentence and newline boundaries, greedily packed.
    SentenceBased { max_chars: usize },
    /// Sentence-based with the bound derived from a reference
    /// recording's chars-per-second, targeting
    /// [`TARGET_CHUNK_SECONDS`] of audio per chunk.
    Adaptive { max_chars: usize },
    /// Raw byte-offset splitting. Baseline only; cuts mid-sentence.
    Fixed { max_chars: usize },
}

/// One bounded piece of the input, in original order. The pipeline
/// annotates synthesis knobs before dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
    pub nfe_step: Option<u32>,
    pub crossfade_duration_s: Option<f32>,
}

impl TextChunk {
    fn new(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            nfe_step: None,
            crossfade_duration_s: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextChunker {
    strategy: ChunkStrategy,
}

impl TextChunker {
    pub fn sentence_based(max_chars: usize) -> Self {
        Self {
            strategy: ChunkStrategy::SentenceBased {
                max_chars: max_chars.max(1),
            },
        }
    }

    /// Derive the chunk bound from a reference recording. Both the
    /// duration and the transcript length are required; a zero or
    /// non-finite value is a caller error surfaced at construction.
    pub fn adaptive(ref_audio_seconds: f32, ref_text_chars: usize) -> Result<Self> {
        if !ref_audio_seconds.is_finite() || ref_audio_seconds <= 0.0 {
            return Err(EnhanceError::Config(format!(
                "adaptive chunking needs a positive reference duration, got {ref_audio_seconds}"
            )));
        }
        if ref_text_chars == 0 {
            return Err(EnhanceError::Config(
                "adaptive chunking needs a non-empty reference transcript".into(),
            ));
        }

        let chars_per_sec = ref_text_chars as f32 / ref_audio_seconds;
        let derived = (chars_per_sec * TARGET_CHUNK_SECONDS).round() as usize;
        let max_chars = derived.max(ADAPTIVE_MIN_CHARS);
        debug!(
            "adaptive chunk bound: {max_chars} bytes ({chars_per_sec:.1} chars/s reference)"
        );
        Ok(Self {
            strategy: ChunkStrategy::Adaptive { max_chars },
        })
    }

    pub fn fixed(max_chars: usize) -> Self {
        Self {
            strategy: ChunkStrategy::Fixed {
                max_chars: max_chars.max(1),
            },
        }
    }

    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// The byte bound in effect.
    pub fn max_chars(&self) -> usize {
        match self.strategy {
            ChunkStrategy::SentenceBased { max_chars }
            | ChunkStrategy::Adaptive { max_chars }
            | ChunkStrategy::Fixed { max_chars } => max_chars,
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let max = self.max_chars();
        let pieces = match self.strategy {
            ChunkStrategy::SentenceBased { .. } | ChunkStrategy::Adaptive { .. } => {
                pack_sentences(text, max)
            }
            ChunkStrategy::Fixed { .. } => split_fixed(text, max),
        };

        debug!("chunked {} bytes into {} chunks", text.len(), pieces.len());
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, t)| TextChunk::new(i, t))
            .collect()
    }
}

/// Sentence segments including their terminal punctuation, trimmed.
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
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_owned());
                }
                current.clear();
            }
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_owned());
    }
    sentences
}

fn pack_sentences(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if sentence.len() > max {
            // Over-long sentence: flush and fall back to word packing.
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(pack_words(&sentence, max));
            continue;
        }

        if current.is_empty() {
            current = sentence;
        } else if current.len() + 1 + sentence.len() <= max {
            current.push(' ');
            current.push_str(&sentence);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn pack_words(sentence: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        if word.len() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_fixed(word, max));
            continue;
        }

        if current.is_empty() {
            current = word.to_owned();
        } else if current.len() + 1 + word.len() <= max {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = word.to_owned();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Byte-offset splitting, snapped back to char boundaries. A bound
/// smaller than one code point degrades to single-char pieces.
fn split_fixed(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            end = start + 1;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
        }
        chunks.push(text[start..end].to_owned());
        start = end;
    }
    chunks
}
