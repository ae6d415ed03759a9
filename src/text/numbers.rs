//! Spanish number-to-words conversion.
//!
//! Cardinal conversion is recursive over thousands/millions groups and
//! covers everything below one thousand million. Callers treat `None` as
//! "leave the digits alone" — numbers the converter does not cover pass
//! through normalization verbatim.
//!
//! # Examples
//!
//! ```
//! use habla::text::numbers::{cardinal, ordinal};
//!
//! assert_eq!(cardinal(21).as_deref(), Some("veintiuno"));
//! assert_eq!(cardinal(100).as_deref(), Some("cien"));
//! assert_eq!(cardinal(105).as_deref(), Some("ciento cinco"));
//! assert_eq!(cardinal(2024).as_deref(), Some("dos mil veinticuatro"));
//! assert_eq!(ordinal(1), Some("primero"));
//! ```

/// Words for 0–29. The 21–29 forms are single words ("veintidós"), not
/// "veinte y dos".
const UNITS: &[&str] = &[
    "cero",
    "uno",
    "dos",
    "tres",
    "cuatro",
    "cinco",
    "seis",
    "siete",
    "ocho",
    "nueve",
    "diez",
    "once",
    "doce",
    "trece",
    "catorce",
    "quince",
    "dieciséis",
    "diecisiete",
    "dieciocho",
    "diecinueve",
    "veinte",
    "veintiuno",
    "veintidós",
    "veintitrés",
    "veinticuatro",
    "veinticinco",
    "veintiséis",
    "veintisiete",
    "veintiocho",
    "veintinueve",
];

/// Tens words, indexed by `n / 10` (3..=9; 1–2 live in [`UNITS`]).
const TENS: &[&str] = &[
    "", "diez", "veinte", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta",
    "noventa",
];

/// Hundreds words, indexed by `n / 100`. Index 1 is "ciento" — the bare
/// "cien" form for exactly 100 is special-cased in [`below_thousand`].
const HUNDREDS: &[&str] = &[
    "",
    "ciento",
    "doscientos",
    "trescientos",
    "cuatrocientos",
    "quinientos",
    "seiscientos",
    "setecientos",
    "ochocientos",
    "novecientos",
];

/// Masculine ordinals for 1–20.
const ORDINALS: &[&str] = &[
    "primero",
    "segundo",
    "tercero",
    "cuarto",
    "quinto",
    "sexto",
    "séptimo",
    "octavo",
    "noveno",
    "décimo",
    "undécimo",
    "duodécimo",
    "decimotercero",
    "decimocuarto",
    "decimoquinto",
    "decimosexto",
    "decimoséptimo",
    "decimoctavo",
    "decimonoveno",
    "vigésimo",
];

fn below_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    if n < 30 {
        return UNITS[n as usize].to_owned();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_owned(),
        unit => format!("{tens} y {}", UNITS[unit as usize]),
    }
}

fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    if n == 100 {
        return "cien".to_owned();
    }
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds == 0 {
        below_hundred(rest)
    } else if rest == 0 {
        HUNDREDS[hundreds as usize].to_owned()
    } else {
        format!("{} {}", HUNDREDS[hundreds as usize], below_hundred(rest))
    }
}

/// Apocopate a trailing "uno" for use before a masculine noun or a group
/// word: "veintiuno" → "veintiún", "treinta y uno" → "treinta y un".
fn apocopate(words: String) -> String {
    if let Some(stem) = words.strip_suffix("veintiuno") {
        format!("{stem}veintiún")
    } else if let Some(stem) = words.strip_suffix("uno") {
        format!("{stem}un")
    } else {
        words
    }
}

/// Convert a cardinal number to Spanish words.
///
/// Returns `None` for numbers at or above one thousand million; the
/// normalizer leaves those digit runs untouched. Years ≥ 2000 come out
/// naturally as "dos mil N".
pub fn cardinal(n: u64) -> Option<String> {
    if n >= 1_000_000_000 {
        return None;
    }
    if n == 0 {
        return Some("cero".to_owned());
    }

    let millions = n / 1_000_000;
    let thousands = (n / 1_000) % 1_000;
    let rest = n % 1_000;

    let mut parts: Vec<String> = Vec::with_capacity(3);
    if millions == 1 {
        parts.push("un millón".to_owned());
    } else if millions > 1 {
        parts.push(format!("{} millones", apocopate(below_thousand(millions))));
    }
    if thousands == 1 {
        parts.push("mil".to_owned());
    } else if thousands > 1 {
        parts.push(format!("{} mil", apocopate(below_thousand(thousands))));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    Some(parts.join(" "))
}

/// Cardinal form used immediately before a masculine noun ("veintiún
/// dólares"). Identical to [`cardinal`] except for the trailing apocope.
pub fn cardinal_for_unit(n: u64) -> Option<String> {
    cardinal(n).map(apocopate)
}

/// Masculine ordinal word for 1–20 ("N°" markers). `None` beyond the
/// table; the normalizer falls back to the cardinal there.
pub fn ordinal(n: u64) -> Option<&'static str> {
    if n == 0 || n > 20 {
        return None;
    }
    Some(ORDINALS[(n - 1) as usize])
}

/// Feminine ordinal for "Nª" markers ("primera", "segunda", …).
pub fn ordinal_feminine(n: u64) -> Option<String> {
    let masculine = ordinal(n)?;
    // Every entry in the 1–20 table ends in "o".
    Some(format!("{}a", &masculine[..masculine.len() - 1]))
}
