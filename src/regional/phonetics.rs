//! Ordered phonetic respelling rules per region.
//!
//! Rules rewrite orthography so the synthesis model pronounces dialect
//! features (sheísmo, s-aspiration, coda weakening). Ordering is an
//! explicit contract: rules run in list order, each in a single
//! left-to-right pass whose output is never re-scanned by the same rule.

use serde::Serialize;

/// Where a pattern must sit relative to word boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    /// Replace every occurrence.
    Anywhere,
    /// Only where the pattern begins a word.
    WordStart,
    /// Only where the pattern ends a word.
    WordEnd,
    /// Only where the pattern is a whole word.
    WholeWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhoneticRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub scope: RuleScope,
}

const fn rule(pattern: &'static str, replacement: &'static str, scope: RuleScope) -> PhoneticRule {
    PhoneticRule {
        pattern,
        replacement,
        scope,
    }
}

use RuleScope::{Anywhere, WholeWord, WordEnd, WordStart};

/// Sheísmo: ⟨ll⟩ and word-initial ⟨y⟩+vowel rendered as ⟨sh⟩.
/// Order matters: the ⟨ll⟩ rules run before the ⟨y⟩ rules so "llama"
/// is already "shama" when the word-start pass scans.
pub(crate) static RIOPLATENSE: &[PhoneticRule] = &[
    rule("ll", "sh", Anywhere),
    rule("Ll", "Sh", Anywhere),
    rule("ya", "sha", WordStart),
    rule("ye", "she", WordStart),
    rule("yo", "sho", WordStart),
    rule("yu", "shu", WordStart),
    rule("Ya", "Sha", WordStart),
    rule("Ye", "She", WordStart),
    rule("Yo", "Sho", WordStart),
    rule("Yu", "Shu", WordStart),
];

/// Coda weakening and participle reduction.
pub(crate) static CHILEAN: &[PhoneticRule] = &[
    rule("ado", "ao", WordEnd),
    rule("s", "h", WordEnd),
    rule("para", "pa", WholeWord),
];

/// s-aspiration, lambdacism, participle reduction.
pub(crate) static CARIBBEAN: &[PhoneticRule] = &[
    rule("ado", "ao", WordEnd),
    rule("s", "h", WordEnd),
    rule("r", "l", WordEnd),
];

// Mexican, Andean, Colombian highland and neutral Latin American Spanish
// keep conservative articulation: no respelling.
pub(crate) static NONE: &[PhoneticRule] = &[];

/// Apply the rule list in order. Each rule makes one pass; replacements
/// are not re-scanned by the rule that produced them.
pub(crate) fn apply(text: &str, rules: &[PhoneticRule]) -> String {
    let mut out = text.to_owned();
    for rule in rules {
        out = match rule.scope {
            Anywhere => out.replace(rule.pattern, rule.replacement),
            WordStart => replace_bounded(&out, rule.pattern, rule.replacement, true, false),
            WordEnd => replace_bounded(&out, rule.pattern, rule.replacement, false, true),
            WholeWord => replace_bounded(&out, rule.pattern, rule.replacement, true, true),
        };
    }
    out
}

fn replace_bounded(
    text: &str,
    pattern: &str,
    replacement: &str,
    check_start: bool,
    check_end: bool,
) -> String {
    let mut result = String::with_capacity(text.len());
    let mut remaining = text;

    while let Some(pos) = remaining.find(pattern) {
        let start_ok = !check_start
            || remaining[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after = pos + pattern.len();
        let end_ok = !check_end
            || remaining[after..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());

        if start_ok && end_ok {
            result.push_str(&remaining[..pos]);
            result.push_str(replacement);
            remaining = &remaining[after..];
        } else {
            let step = remaining[pos..].chars().next().map_or(1, |c| c.len_utf8());
            result.push_str(&remaining[..pos + step]);
            remaining = &remaining[pos + step..];
        }
    }

    result.push_str(remaining);
    result
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn rioplatense_sheismo() {
        assert_eq!(
            apply("La lluvia cae en la calle", RIOPLATENSE),
            "La shuvia cae en la cashe"
        );
        assert_eq!(apply("Yo ya llegué", RIOPLATENSE), "Sho sha shegué");
    }

    #[test]
    fn conjunction_y_is_untouched() {
        assert_eq!(apply("pan y agua", RIOPLATENSE), "pan y agua");
    }

    #[test]
    fn caribbean_coda_weakening() {
        assert_eq!(apply("estamos listos", CARIBBEAN), "estamoh listoh");
        assert_eq!(apply("amor y calor", CARIBBEAN), "amol y calol");
        assert_eq!(apply("cansado", CARIBBEAN), "cansao");
    }

    #[test]
    fn chilean_reductions() {
        assert_eq!(apply("cansado para todos", CHILEAN), "cansao pa todoh");
    }

    #[test]
    fn whole_word_scope_skips_prefixes() {
        // "para" must not fire inside "parar".
        assert_eq!(apply("va a parar", CHILEAN), "va a parar");
    }

    #[test]
    fn rules_apply_once_not_recursively() {
        let growing = [rule("a", "aa", Anywhere)];
        assert_eq!(apply("la", &growing), "laa");
    }
}
