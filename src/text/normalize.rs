//! Spanish text normalization pipeline.
//!
//! Converts written forms (numbers, dates, times, currency, abbreviations)
//! into the words a voice should speak. The pipeline is an explicit ordered
//! list of passes — order is a contract, not an accident: currency and
//! time/date patterns must consume their digit runs before the generic
//! cardinal pass sees them.
//!
//! Normalization never fails. Anything a pass does not recognize passes
//! through verbatim.

use crate::text::numbers;
use tracing::trace;

/// A single normalization pass.
type Pass = fn(&str) -> String;

/// The ordered pass pipeline. **Order matters** — each pass assumes the
/// previous ones already consumed their patterns (e.g. `cardinals` must
/// run after every pass that interprets digit runs in context).
pub const PASSES: &[(&str, Pass)] = &[
    ("abbreviations", expand_abbreviations),
    ("currency", expand_currency),
    ("times", expand_times),
    ("dates", expand_dates),
    ("ordinals", expand_ordinals),
    ("decimals", expand_decimals),
    ("cardinals", expand_cardinals),
    ("whitespace", clean_whitespace),
];

/// Normalize text for Spanish speech synthesis.
///
/// Applies every pass in [`PASSES`] in order. Idempotent once all raw
/// numbers, dates and currency have been expanded.
pub fn normalize(text: &str) -> String {
    let mut out = text.to_owned();
    for (name, pass) in PASSES {
        out = pass(&out);
        trace!("normalize pass {name}: {} chars", out.len());
    }
    out
}

// ---------------------------------------------------------------------------
// Abbreviations
// ---------------------------------------------------------------------------

/// Abbreviation → expansion pairs. Longer forms precede their prefixes
/// ("Srta." before "Sra." before "Sr.") so a match never shadows a longer
/// candidate.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("EE.UU.", "Estados Unidos"),
    ("Srta.", "Señorita"),
    ("Sra.", "Señora"),
    ("Sr.", "Señor"),
    ("Dra.", "Doctora"),
    ("Dr.", "Doctor"),
    ("Lic.", "Licenciado"),
    ("Ing.", "Ingeniero"),
    ("Prof.", "Profesor"),
    ("Gral.", "General"),
    ("Avda.", "Avenida"),
    ("Av.", "Avenida"),
    ("Uds.", "ustedes"),
    ("Ud.", "usted"),
    ("Nro.", "número"),
    ("núm.", "número"),
    ("etc.", "etcétera"),
    ("p. ej.", "por ejemplo"),
];

fn expand_abbreviations(text: &str) -> String {
    let mut result = text.to_owned();
    for &(abbrev, expansion) in ABBREVIATIONS {
        result = replace_word_boundary(&result, abbrev, expansion);
    }
    result
}

/// Replace `pattern` only where it is delimited by non-alphanumeric
/// characters (or the string edges) on both sides.
fn replace_word_boundary(text: &str, pattern: &str, replacement: &str) -> String {
    if pattern.is_empty() {
        return text.to_owned();
    }

    let mut result = String::with_capacity(text.len());
    let mut remaining = text;

    while let Some(pos) = remaining.find(pattern) {
        let at_start = pos == 0
            || remaining[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after = pos + pattern.len();
        let at_end = remaining[after..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());

        if at_start && at_end {
            result.push_str(&remaining[..pos]);
            result.push_str(replacement);
            remaining = &remaining[after..];
        } else {
            // Not a word boundary — emit up to and past the first char of
            // the match, then keep scanning.
            let step = remaining[pos..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
            result.push_str(&remaining[..pos + step]);
            remaining = &remaining[pos + step..];
        }
    }

    result.push_str(remaining);
    result
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

struct Currency {
    symbol: char,
    one: &'static str,
    many: &'static str,
    cent_one: &'static str,
    cent_many: &'static str,
}

const CURRENCIES: &[Currency] = &[
    Currency {
        symbol: '$',
        one: "dólar",
        many: "dólares",
        cent_one: "centavo",
        cent_many: "centavos",
    },
    Currency {
        symbol: '€',
        one: "euro",
        many: "euros",
        cent_one: "céntimo",
        cent_many: "céntimos",
    },
    Currency {
        symbol: '£',
        one: "libra",
        many: "libras",
        cent_one: "penique",
        cent_many: "peniques",
    },
];

/// Expand `$100` → "cien dólares", `€10,50` → "diez euros con cincuenta
/// céntimos". Only matches a symbol immediately followed by digits; a bare
/// symbol passes through.
fn expand_currency(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let Some(currency) = CURRENCIES.iter().find(|c| c.symbol == chars[i]) else {
            result.push(chars[i]);
            i += 1;
            continue;
        };

        let digits_start = i + 1;
        let mut j = digits_start;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j == digits_start {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let amount: String = chars[digits_start..j].iter().collect();
        // Optional decimal cents: `.50` or `,50` (one or two digits).
        let mut cents: Option<String> = None;
        if j + 1 < chars.len() && (chars[j] == '.' || chars[j] == ',') {
            let mut k = j + 1;
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }
            let frac_len = k - (j + 1);
            if (1..=2).contains(&frac_len) {
                cents = Some(chars[j + 1..k].iter().collect());
                j = k;
            }
        }

        match spell_amount(&amount, cents.as_deref(), currency) {
            Some(spoken) => result.push_str(&spoken),
            None => {
                // Out-of-range amount: leave the symbol and digits alone.
                result.push(chars[i]);
                result.push_str(&amount);
            }
        }
        i = j;
    }

    result
}

fn spell_amount(amount: &str, cents: Option<&str>, currency: &Currency) -> Option<String> {
    let n: u64 = amount.parse().ok()?;
    let mut spoken = if n == 1 {
        format!("un {}", currency.one)
    } else {
        format!("{} {}", numbers::cardinal_for_unit(n)?, currency.many)
    };
    if let Some(cents) = cents {
        let c: u64 = cents.parse().ok()?;
        if c == 1 {
            spoken.push_str(&format!(" con un {}", currency.cent_one));
        } else if c > 1 {
            spoken.push_str(&format!(
                " con {} {}",
                numbers::cardinal(c)?,
                currency.cent_many
            ));
        }
    }
    Some(spoken)
}

// ---------------------------------------------------------------------------
// Times
// ---------------------------------------------------------------------------

/// Expand `HH:MM` to spoken 12-hour time. `:15`, `:30` and `:45` use the
/// idiomatic "y cuarto" / "y media" / "menos cuarto" forms; `:00` is
/// "en punto"; everything else is "<hora> y <minutos>".
fn expand_times(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() || (i > 0 && chars[i - 1].is_ascii_digit()) {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        // Hour: one or two digits.
        let mut j = i;
        while j < chars.len() && chars[j].is_ascii_digit() && j - i < 2 {
            j += 1;
        }
        let matches_time = chars.get(j) == Some(&':')
            && chars.get(j + 1).is_some_and(char::is_ascii_digit)
            && chars.get(j + 2).is_some_and(char::is_ascii_digit)
            && chars.get(j + 3).is_none_or(|c| *c != ':' && !c.is_ascii_digit());

        if matches_time {
            let hour: u32 = chars[i..j].iter().collect::<String>().parse().unwrap_or(99);
            let minute: u32 = chars[j + 1..j + 3]
                .iter()
                .collect::<String>()
                .parse()
                .unwrap_or(99);
            if hour <= 23 && minute <= 59 {
                result.push_str(&spell_time(hour, minute));
                i = j + 3;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

fn hour_word(hour12: u32) -> String {
    if hour12 == 1 {
        "una".to_owned()
    } else {
        numbers::cardinal(u64::from(hour12)).unwrap_or_else(|| hour12.to_string())
    }
}

fn spell_time(hour: u32, minute: u32) -> String {
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    match minute {
        0 => format!("{} en punto", hour_word(hour12)),
        15 => format!("{} y cuarto", hour_word(hour12)),
        30 => format!("{} y media", hour_word(hour12)),
        45 => {
            let next = match (hour + 1) % 12 {
                0 => 12,
                h => h,
            };
            format!("{} menos cuarto", hour_word(next))
        }
        m => format!(
            "{} y {}",
            hour_word(hour12),
            numbers::cardinal(u64::from(m)).unwrap_or_else(|| m.to_string())
        ),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const MONTHS: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Expand `d/m/yyyy` dates: `01/01/2024` → "primero de enero de dos mil
/// veinticuatro". Day 1 is the ordinal "primero"; other days are cardinal.
fn expand_dates(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() || (i > 0 && chars[i - 1].is_ascii_digit()) {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        if let Some((spoken, end)) = match_date(&chars, i) {
            result.push_str(&spoken);
            i = end;
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }

    result
}

/// Try to match `d/m/yyyy` starting at `start`. Returns the spoken form
/// and the index one past the match.
fn match_date(chars: &[char], start: usize) -> Option<(String, usize)> {
    let (day, after_day) = take_digits(chars, start, 2)?;
    if chars.get(after_day) != Some(&'/') {
        return None;
    }
    let (month, after_month) = take_digits(chars, after_day + 1, 2)?;
    if chars.get(after_month) != Some(&'/') {
        return None;
    }
    let (year, after_year) = take_digits(chars, after_month + 1, 4)?;
    if year.len() != 4 || chars.get(after_year).is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }

    let day: u64 = day.parse().ok()?;
    let month: usize = month.parse().ok()?;
    let year: u64 = year.parse().ok()?;
    if day == 0 || day > 31 || month == 0 || month > 12 {
        return None;
    }

    let day_word = if day == 1 {
        "primero".to_owned()
    } else {
        numbers::cardinal(day)?
    };
    let spoken = format!(
        "{day_word} de {} de {}",
        MONTHS[month - 1],
        numbers::cardinal(year)?
    );
    Some((spoken, after_year))
}

/// Collect 1..=max digits starting at `start`.
fn take_digits(chars: &[char], start: usize, max: usize) -> Option<(String, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() && end - start < max {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((chars[start..end].iter().collect(), end))
}

// ---------------------------------------------------------------------------
// Ordinals
// ---------------------------------------------------------------------------

/// Expand `N°` / `Nº` (masculine) and `Nª` (feminine) ordinal markers.
/// Numbers beyond the ordinal table fall back to the cardinal reading.
fn expand_ordinals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() || (i > 0 && chars[i - 1].is_ascii_digit()) {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let mut j = i;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        let marker = chars.get(j).copied();
        let feminine = matches!(marker, Some('ª'));
        let masculine = matches!(marker, Some('°' | 'º'));
        if !feminine && !masculine {
            result.extend(&chars[i..j]);
            i = j;
            continue;
        }

        let n: u64 = match chars[i..j].iter().collect::<String>().parse() {
            Ok(n) => n,
            Err(_) => {
                result.extend(&chars[i..=j]);
                i = j + 1;
                continue;
            }
        };
        let spoken = if feminine {
            numbers::ordinal_feminine(n)
        } else {
            numbers::ordinal(n).map(str::to_owned)
        };
        let spoken = spoken
            .or_else(|| numbers::cardinal(n))
            .unwrap_or_else(|| chars[i..j].iter().collect());
        result.push_str(&spoken);
        i = j + 1;
    }

    result
}

// ---------------------------------------------------------------------------
// Decimals
// ---------------------------------------------------------------------------

/// Expand decimal numbers: `3,5` → "tres coma cinco", `3.14` →
/// "tres punto catorce". A dot followed by exactly-three-digit groups is
/// a Spanish thousands grouping (`1.000` → "1000") and is re-joined for
/// the cardinal pass instead of being read as a decimal.
fn expand_decimals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() || (i > 0 && chars[i - 1].is_ascii_digit()) {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let (token, end) = collect_number_token(&chars, i);
        result.push_str(&spell_number_token(&token));
        i = end;
    }

    result
}

/// A digit run optionally followed by separator-delimited digit runs.
struct NumberToken {
    first: String,
    groups: Vec<(char, String)>,
}

impl NumberToken {
    fn verbatim(&self) -> String {
        let mut out = self.first.clone();
        for (sep, run) in &self.groups {
            out.push(*sep);
            out.push_str(run);
        }
        out
    }
}

fn collect_number_token(chars: &[char], start: usize) -> (NumberToken, usize) {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let first: String = chars[start..i].iter().collect();

    let mut groups = Vec::new();
    while i + 1 < chars.len()
        && (chars[i] == '.' || chars[i] == ',')
        && chars[i + 1].is_ascii_digit()
    {
        let sep = chars[i];
        let run_start = i + 1;
        let mut j = run_start;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        groups.push((sep, chars[run_start..j].iter().collect()));
        i = j;
    }

    (NumberToken { first, groups }, i)
}

fn spell_number_token(token: &NumberToken) -> String {
    if token.groups.is_empty() {
        return token.first.clone();
    }

    // `1.000` / `1.234.567`: dot-separated three-digit groups are a
    // thousands grouping; re-join and let the cardinal pass read it.
    let all_dot_triplets = token.first.len() <= 3
        && token
            .groups
            .iter()
            .all(|(sep, run)| *sep == '.' && run.len() == 3);
    if all_dot_triplets {
        let mut joined = token.first.clone();
        for (_, run) in &token.groups {
            joined.push_str(run);
        }
        return joined;
    }

    // Single decimal fraction: `3,5`, `3.14`, `1.234,56`.
    let (frac_sep, frac) = match token.groups.last() {
        Some((sep, run)) if token.groups.len() == 1 => (*sep, run.clone()),
        Some((sep, run))
            if *sep == ','
                && token
                    .groups
                    .iter()
                    .take(token.groups.len() - 1)
                    .all(|(s, r)| *s == '.' && r.len() == 3) =>
        {
            (*sep, run.clone())
        }
        _ => return token.verbatim(),
    };

    let mut int_digits = token.first.clone();
    for (_, run) in token.groups.iter().take(token.groups.len() - 1) {
        int_digits.push_str(run);
    }

    let Some(int_words) = int_digits
        .parse::<u64>()
        .ok()
        .and_then(numbers::cardinal)
    else {
        return token.verbatim();
    };

    let sep_word = if frac_sep == ',' { "coma" } else { "punto" };
    let frac_words = if frac.len() <= 2 {
        frac.parse::<u64>().ok().and_then(numbers::cardinal)
    } else {
        spell_digits(&frac)
    };
    match frac_words {
        Some(frac_words) => format!("{int_words} {sep_word} {frac_words}"),
        None => token.verbatim(),
    }
}

/// Read digits one by one ("141" → "uno cuatro uno").
fn spell_digits(digits: &str) -> Option<String> {
    let words: Option<Vec<String>> = digits
        .chars()
        .map(|c| numbers::cardinal(u64::from(c.to_digit(10)?)))
        .collect();
    words.map(|w| w.join(" "))
}

// ---------------------------------------------------------------------------
// Cardinals
// ---------------------------------------------------------------------------

/// Expand every remaining maximal digit run to cardinal words. Runs the
/// converter does not cover (≥ 10⁹) stay as digits.
fn expand_cardinals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        let mut j = i;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        let run: String = chars[i..j].iter().collect();
        match run.parse::<u64>().ok().and_then(numbers::cardinal) {
            Some(words) => {
                // Keep the words separated when the run abuts a letter.
                if i > 0 && chars[i - 1].is_alphanumeric() {
                    result.push(' ');
                }
                result.push_str(&words);
                if j < chars.len() && chars[j].is_alphanumeric() {
                    result.push(' ');
                }
            }
            None => result.push_str(&run),
        }
        i = j;
    }

    result
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

/// Collapse runs of spaces/tabs and cap consecutive blank lines at one,
/// preserving paragraph breaks for the downstream pause analysis.
fn clean_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !lines.is_empty() {
                lines.push(String::new());
            }
        } else {
            blank_run = 0;
            lines.push(collapsed);
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}
