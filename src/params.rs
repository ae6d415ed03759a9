//! Per-chunk synthesis knob selection.
//!
//! Longer and more expressive chunks get more sampling iterations;
//! crossfade duration adapts to chunk length, neighbor energy and pause
//! boundaries. All outputs stay inside hard bounds regardless of input
//! or override.

use tracing::debug;

pub const NFE_MIN: u32 = 12;
pub const NFE_MAX: u32 = 32;

const NFE_SHORT: u32 = 16;
const NFE_MEDIUM: u32 = 22;
const NFE_LONG: u32 = 28;

/// Char-count bands for the NFE base value.
const SHORT_TEXT_CHARS: usize = 50;
const MEDIUM_TEXT_CHARS: usize = 200;

/// Default crossfade between adjacent chunks, in seconds.
pub const DEFAULT_CROSSFADE_S: f32 = 0.5;

/// Both neighbors louder than this RMS count as continuous speech.
const CONTINUOUS_ENERGY_THRESHOLD: f32 = 0.7;

/// Fixed short-chunk crossfades. A long blend would eat a meaningful
/// fraction of a short chunk.
const TINY_CHUNK_CHARS: usize = 15;
const TINY_CHUNK_CROSSFADE_S: f32 = 0.05;
const SMALL_CHUNK_CHARS: usize = 30;
const SMALL_CHUNK_CROSSFADE_S: f32 = 0.08;

#[derive(Debug, Clone)]
pub struct AdaptiveParameterSelector {
    pub base_crossfade_s: f32,
}

impl Default for AdaptiveParameterSelector {
    fn default() -> Self {
        Self {
            base_crossfade_s: DEFAULT_CROSSFADE_S,
        }
    }
}

impl AdaptiveParameterSelector {
    pub fn new(base_crossfade_s: f32) -> Self {
        Self { base_crossfade_s }
    }

    /// Sampling iteration count for one chunk. An explicit request
    /// short-circuits the heuristics; every path clamps to
    /// [`NFE_MIN`]..=[`NFE_MAX`].
    pub fn nfe_step(&self, text: &str, requested: Option<u32>) -> u32 {
        if let Some(step) = requested {
            return step.clamp(NFE_MIN, NFE_MAX);
        }

        let chars = text.chars().count();
        let mut step = if chars < SHORT_TEXT_CHARS {
            NFE_SHORT
        } else if chars < MEDIUM_TEXT_CHARS {
            NFE_MEDIUM
        } else {
            NFE_LONG
        };

        if text.contains(['?', '¿', '!', '¡']) {
            step += 2;
        }
        if terminator_runs(text) > 2 && chars > 100 {
            step += 2;
        }

        let step = step.clamp(NFE_MIN, NFE_MAX);
        debug!("nfe_step {step} for {chars} chars");
        step
    }

    /// Crossfade duration in seconds for the seam after a chunk.
    ///
    /// `energies` are the neighbor RMS levels at the seam; `at_pause`
    /// marks seams that land on a detected pause boundary.
    pub fn crossfade_duration(
        &self,
        chunk_chars: usize,
        energies: (f32, f32),
        at_pause: bool,
    ) -> f32 {
        if chunk_chars < TINY_CHUNK_CHARS {
            return TINY_CHUNK_CROSSFADE_S;
        }
        if chunk_chars < SMALL_CHUNK_CHARS {
            return SMALL_CHUNK_CROSSFADE_S;
        }

        let mut duration = self.base_crossfade_s;
        if energies.0 > CONTINUOUS_ENERGY_THRESHOLD && energies.1 > CONTINUOUS_ENERGY_THRESHOLD {
            duration *= 0.6;
        }
        if at_pause {
            duration *= 1.25;
        }
        duration
    }
}

/// Number of sentence-terminator runs; "..." counts once.
fn terminator_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        if matches!(c, '.' | '!' | '?' | '…') {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn selector() -> AdaptiveParameterSelector {
        AdaptiveParameterSelector::default()
    }

    // ── NFE steps ───────────────────────────────────────────────────────

    #[test]
    fn length_bands() {
        assert_eq!(selector().nfe_step("Hola", None), 16);
        assert_eq!(selector().nfe_step(&"palabra ".repeat(12), None), 22);
        assert_eq!(selector().nfe_step(&"palabra ".repeat(30), None), 28);
    }

    #[test]
    fn questions_add_iterations() {
        assert_eq!(selector().nfe_step("¿Vienes?", None), 18);
        assert_eq!(selector().nfe_step("¡Cuidado!", None), 18);
    }

    #[test]
    fn busy_text_adds_more() {
        // Over 100 chars, more than two sentences, plus a question.
        let text = "Primera frase del texto. Segunda frase con más contenido. \
                    Tercera frase que alarga. ¿Y una pregunta final?";
        assert_eq!(selector().nfe_step(text, None), 26);
    }

    #[test]
    fn override_short_circuits_but_stays_bounded() {
        assert_eq!(selector().nfe_step("cualquier texto", Some(20)), 20);
        assert_eq!(selector().nfe_step("cualquier texto", Some(99)), NFE_MAX);
        assert_eq!(selector().nfe_step("cualquier texto", Some(1)), NFE_MIN);
    }

    #[test]
    fn nfe_always_in_bounds() {
        let texts = [
            "",
            "x",
            "¿¡?!",
            &"a. ".repeat(100),
            &"¿pregunta? ".repeat(50),
        ];
        for text in texts {
            let step = selector().nfe_step(text, None);
            assert!((NFE_MIN..=NFE_MAX).contains(&step), "{step} for {text:?}");
        }
    }

    #[test]
    fn ellipsis_counts_as_one_terminator() {
        assert_eq!(terminator_runs("espera... y sigue."), 2);
    }

    // ── Crossfade ───────────────────────────────────────────────────────

    #[test]
    fn short_chunks_use_fixed_crossfades() {
        let s = selector();
        assert_eq!(s.crossfade_duration(10, (0.0, 0.0), false), 0.05);
        assert_eq!(s.crossfade_duration(20, (0.9, 0.9), true), 0.08);
    }

    #[test]
    fn continuous_speech_shortens_the_blend() {
        let d = selector().crossfade_duration(100, (0.8, 0.9), false);
        assert!((d - 0.3).abs() < 1e-6);
    }

    #[test]
    fn pause_boundary_lengthens_the_blend() {
        let d = selector().crossfade_duration(100, (0.1, 0.1), true);
        assert!((d - 0.625).abs() < 1e-6);
    }

    #[test]
    fn both_adjustments_compose() {
        let d = selector().crossfade_duration(100, (0.8, 0.9), true);
        assert!((d - 0.375).abs() < 1e-6);
    }

    #[test]
    fn quiet_mid_chunk_seam_keeps_default() {
        let d = selector().crossfade_duration(100, (0.2, 0.9), false);
        assert!((d - DEFAULT_CROSSFADE_S).abs() < 1e-6);
    }
}
