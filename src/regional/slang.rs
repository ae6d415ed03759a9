//! Static per-region slang dictionaries.
//!
//! Detection is case-insensitive substring containment over lowercased
//! text. Terms are stored lowercase. The dictionaries stay deliberately
//! small (well under a hundred entries each) so a linear scan per term
//! is cheap.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlangCategory {
    Interjection,
    Pronoun,
    /// Voseo or otherwise regional verb conjugation.
    VerbForm,
    Noun,
    Adjective,
    Expression,
}

/// Usage register, coarsest-grain. Vulgar terms still synthesize; the
/// register only feeds prosodic hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    Colloquial,
    Informal,
    Vulgar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlangTerm {
    pub term: &'static str,
    pub category: SlangCategory,
    pub meaning: &'static str,
    pub register: Register,
}

const fn term(
    term: &'static str,
    category: SlangCategory,
    meaning: &'static str,
    register: Register,
) -> SlangTerm {
    SlangTerm {
        term,
        category,
        meaning,
        register,
    }
}

use Register::{Colloquial, Informal, Vulgar};
use SlangCategory::{Adjective, Expression, Interjection, Noun, Pronoun, VerbForm};

pub(crate) static RIOPLATENSE: &[SlangTerm] = &[
    term("che", Interjection, "hey / vocative filler", Colloquial),
    term("boludo", Noun, "dude (affectionate insult)", Vulgar),
    term("boluda", Noun, "dude, feminine", Vulgar),
    term("vos", Pronoun, "you (voseo)", Colloquial),
    term("querés", VerbForm, "you want (voseo)", Colloquial),
    term("tenés", VerbForm, "you have (voseo)", Colloquial),
    term("sabés", VerbForm, "you know (voseo)", Colloquial),
    term("podés", VerbForm, "you can (voseo)", Colloquial),
    term("laburo", Noun, "job, work", Colloquial),
    term("laburar", VerbForm, "to work", Colloquial),
    term("quilombo", Noun, "mess, chaos", Vulgar),
    term("pibe", Noun, "kid, young man", Colloquial),
    term("piba", Noun, "girl, young woman", Colloquial),
    term("mina", Noun, "woman", Informal),
    term("copado", Adjective, "cool, great", Colloquial),
    term("posta", Interjection, "for real", Colloquial),
    term("dale", Interjection, "okay, go ahead", Colloquial),
];

pub(crate) static MEXICAN: &[SlangTerm] = &[
    term("órale", Interjection, "wow / come on", Colloquial),
    term("güey", Noun, "dude", Informal),
    term("wey", Noun, "dude (spelling variant)", Informal),
    term("chido", Adjective, "cool", Colloquial),
    term("chamba", Noun, "job, work", Colloquial),
    term("chambear", VerbForm, "to work", Colloquial),
    term("neta", Noun, "the truth / for real", Colloquial),
    term("chale", Interjection, "bummer", Colloquial),
    term("ándale", Interjection, "that's it / hurry up", Colloquial),
    term("ahorita", Interjection, "right now (eventually)", Colloquial),
    term("cuate", Noun, "buddy", Colloquial),
    term("padrísimo", Adjective, "awesome", Colloquial),
    term("qué onda", Expression, "what's up", Colloquial),
];

pub(crate) static CARIBBEAN: &[SlangTerm] = &[
    term("chévere", Adjective, "cool, nice", Colloquial),
    term("asere", Noun, "buddy (Cuba)", Colloquial),
    term("qué bolá", Expression, "what's up (Cuba)", Colloquial),
    term("guagua", Noun, "bus", Colloquial),
    term("jeva", Noun, "girlfriend, young woman", Informal),
    term("bregar", VerbForm, "to deal with, to work at", Colloquial),
    term("chin", Noun, "a little bit (DR)", Colloquial),
    term("vaina", Noun, "thing, stuff", Informal),
    term("coño", Interjection, "damn", Vulgar),
];

pub(crate) static ANDEAN: &[SlangTerm] = &[
    term("pe", Interjection, "filler particle (Peru)", Colloquial),
    term("causa", Noun, "buddy (Peru)", Colloquial),
    term("pata", Noun, "friend", Colloquial),
    term("harto", Adjective, "a lot of", Colloquial),
    term("ñaño", Noun, "brother, close friend (Ecuador)", Colloquial),
    term("chibolo", Noun, "kid (Peru)", Colloquial),
    term("jato", Noun, "house (Peru)", Informal),
    term("chévere", Adjective, "cool, nice", Colloquial),
];

pub(crate) static CHILEAN: &[SlangTerm] = &[
    term("po", Interjection, "emphatic particle", Colloquial),
    term("cachai", VerbForm, "you get it?", Colloquial),
    term("fome", Adjective, "boring", Colloquial),
    term("pololo", Noun, "boyfriend", Colloquial),
    term("polola", Noun, "girlfriend", Colloquial),
    term("bacán", Adjective, "great", Colloquial),
    term("al tiro", Expression, "right away", Colloquial),
    term("luca", Noun, "a thousand pesos", Informal),
    term("weón", Noun, "dude (affectionate insult)", Vulgar),
    term("huevón", Noun, "dude (full form)", Vulgar),
    term("carrete", Noun, "party", Colloquial),
];

pub(crate) static COLOMBIAN: &[SlangTerm] = &[
    term("parce", Noun, "buddy", Colloquial),
    term("parcero", Noun, "buddy (full form)", Colloquial),
    term("chimba", Adjective, "great / awful, by tone", Vulgar),
    term("bacano", Adjective, "cool", Colloquial),
    term("berraco", Adjective, "tough, impressive", Colloquial),
    term("tinto", Noun, "black coffee", Colloquial),
    term("rumba", Noun, "party", Colloquial),
    term("ñero", Noun, "street-styled person", Informal),
    term("vaina", Noun, "thing, stuff", Informal),
];

/// All dictionary terms contained in the text, in dictionary order.
/// Plain substring containment, so a term also fires inside a longer
/// word ("che" inside "noche").
pub(crate) fn find_terms(text_lower: &str, terms: &[SlangTerm]) -> Vec<SlangTerm> {
    terms
        .iter()
        .copied()
        .filter(|t| text_lower.contains(t.term))
        .collect()
}
