//! Heuristic lexical similarity between two free-text animal descriptions.
//!
//! Descriptions are written by people in Peru, so the vocabulary below is
//! Spanish with the usual regional variants, with and without accents. Every
//! category awards its points at most once; the maximum is 50.

use std::collections::HashSet;

use crate::models::MatchedKeywords;

pub const COLOR_POINTS: u8 = 15;
pub const SIZE_POINTS: u8 = 10;
pub const BREED_POINTS: u8 = 20;
pub const OVERLAP_POINTS: u8 = 5;

/// Upper bound of [`description_similarity`]
pub const MAX_SIMILARITY: u8 = COLOR_POINTS + SIZE_POINTS + BREED_POINTS + OVERLAP_POINTS;

/// Shared generic tokens needed for the overlap bonus
const MIN_SHARED_TOKENS: usize = 2;

/// Generic tokens must be longer than this many characters
const MIN_TOKEN_CHARS: usize = 3;

type SynonymGroup = (&'static str, &'static [&'static str]);

static COLOR_GROUPS: &[SynonymGroup] = &[
    ("black", &["negro", "negra", "negrito", "negrita", "oscuro", "azabache"]),
    ("white", &["blanco", "blanca", "blanquito", "blanquita", "albino"]),
    ("brown", &["marron", "marrón", "cafe", "café", "chocolate", "canela"]),
    ("gray", &["gris", "plomo", "plomito", "ceniza", "plateado"]),
    ("yellow", &["amarillo", "amarilla", "dorado", "dorada", "rubio", "crema"]),
    ("orange", &["naranja", "anaranjado", "anaranjada", "rojizo", "colorado"]),
];

static SIZE_GROUPS: &[SynonymGroup] = &[
    ("large", &["grande", "grandote", "grandota", "enorme", "gigante"]),
    ("small", &["pequeño", "pequeña", "pequeno", "pequena", "chico", "chica", "chiquito", "chiquita"]),
    ("medium", &["mediano", "mediana", "tamaño medio", "tamano medio"]),
];

static BREEDS: &[&str] = &[
    "labrador",
    "golden",
    "pastor aleman",
    "pastor alemán",
    "bulldog",
    "poodle",
    "caniche",
    "chihuahua",
    "beagle",
    "husky",
    "schnauzer",
    "pitbull",
    "rottweiler",
    "boxer",
    "dalmata",
    "dálmata",
    "shih tzu",
    "pug",
    "siames",
    "siamés",
    "persa",
];

/// Which categories two descriptions agree on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimilarityBreakdown {
    pub color: bool,
    pub size: bool,
    pub breed: bool,
    pub overlap: bool,
}

impl SimilarityBreakdown {
    pub fn total(&self) -> u8 {
        let mut score = 0;
        if self.color {
            score += COLOR_POINTS;
        }
        if self.size {
            score += SIZE_POINTS;
        }
        if self.breed {
            score += BREED_POINTS;
        }
        if self.overlap {
            score += OVERLAP_POINTS;
        }
        score
    }
}

/// Score the lexical overlap of two descriptions, in `[0, 50]`.
///
/// Absent or blank descriptions score 0. Symmetric in its arguments.
pub fn description_similarity(a: Option<&str>, b: Option<&str>) -> u8 {
    similarity_breakdown(a, b).total()
}

/// Per-category view of [`description_similarity`]
pub fn similarity_breakdown(a: Option<&str>, b: Option<&str>) -> SimilarityBreakdown {
    let (Some(a), Some(b)) = (normalize(a), normalize(b)) else {
        return SimilarityBreakdown::default();
    };

    SimilarityBreakdown {
        color: shared_group(&a, &b, COLOR_GROUPS).is_some(),
        size: shared_group(&a, &b, SIZE_GROUPS).is_some(),
        breed: shared_breed(&a, &b).is_some(),
        overlap: shared_token_count(&a, &b) >= MIN_SHARED_TOKENS,
    }
}

/// Pick a display keyword per category for a source/candidate pair.
///
/// Colors and sizes report the synonym found in the candidate's text for the
/// first group both descriptions hit; breeds are literal so the shared name is
/// reported as is. Display only, never fed back into scoring.
pub fn extract_matched_keywords(source: Option<&str>, candidate: Option<&str>) -> MatchedKeywords {
    let (Some(source), Some(candidate)) = (normalize(source), normalize(candidate)) else {
        return MatchedKeywords::default();
    };

    MatchedKeywords {
        color: shared_group(&source, &candidate, COLOR_GROUPS).map(str::to_string),
        size: shared_group(&source, &candidate, SIZE_GROUPS).map(str::to_string),
        breed: shared_breed(&source, &candidate).map(str::to_string),
    }
}

fn normalize(text: Option<&str>) -> Option<String> {
    let text = text?.trim().to_lowercase();
    (!text.is_empty()).then_some(text)
}

fn first_synonym_in(text: &str, synonyms: &'static [&'static str]) -> Option<&'static str> {
    synonyms.iter().copied().find(|synonym| text.contains(synonym))
}

/// Synonym from `b` of the first group that both texts mention
fn shared_group(a: &str, b: &str, groups: &'static [SynonymGroup]) -> Option<&'static str> {
    groups.iter().find_map(|&(_, synonyms)| {
        first_synonym_in(a, synonyms)?;
        first_synonym_in(b, synonyms)
    })
}

fn shared_breed(a: &str, b: &str) -> Option<&'static str> {
    BREEDS
        .iter()
        .copied()
        .find(|breed| a.contains(breed) && b.contains(breed))
}

fn significant_tokens(text: &str) -> HashSet<&str> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect()
}

fn shared_token_count(a: &str, b: &str) -> usize {
    let a_tokens = significant_tokens(a);
    let b_tokens = significant_tokens(b);
    a_tokens.intersection(&b_tokens).count()
}
