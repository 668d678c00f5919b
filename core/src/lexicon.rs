//! Declarative gluten lexicon and the matchers compiled from it.
//!
//! Each entry lists the surface spellings of one canonical term. Spellings are
//! accent-folded and regex-escaped at compile time, then joined into a single
//! whole-word alternation, so accent equivalence and word boundaries are
//! defined here and nowhere else.

use regex::Regex;
use thiserror::Error;

use glutenscan_types::NonEmptyStaticStr;

use crate::normalize::fold_accents;

/// One canonical term and the spellings that count as a mention of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconEntry {
    pub canonical: NonEmptyStaticStr,
    pub surface_forms: &'static [&'static str],
    pub rationale: &'static str,
}

impl LexiconEntry {
    #[must_use]
    pub const fn new(
        canonical: &'static str,
        surface_forms: &'static [&'static str],
        rationale: &'static str,
    ) -> Self {
        Self {
            canonical: NonEmptyStaticStr::new(canonical),
            surface_forms,
            rationale,
        }
    }
}

/// A label claim written as a multi-token phrase (`gluten free`, `sans gluten`).
///
/// Tokens may be separated by any run of whitespace or hyphens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimEntry {
    pub canonical: NonEmptyStaticStr,
    pub phrases: &'static [&'static [&'static str]],
    pub rationale: &'static str,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Gluten-containing ingredients, in reporting order.
    pub ingredients: Vec<LexiconEntry>,
    /// Contamination-risk grain (oats).
    pub oat: LexiconEntry,
    pub gluten_free_claim: ClaimEntry,
}

pub const DEFAULT_INGREDIENTS: &[LexiconEntry] = &[
    LexiconEntry::new("wheat", &["wheat", "blé"], "Wheat detected"),
    LexiconEntry::new("gluten", &["gluten"], "Explicit mention of gluten"),
    LexiconEntry::new("barley", &["barley", "orge"], "Barley detected"),
    LexiconEntry::new("rye", &["rye", "seigle"], "Rye detected"),
    LexiconEntry::new("triticale", &["triticale"], "Triticale detected"),
    LexiconEntry::new("spelt", &["spelt", "épeautre"], "Spelt detected"),
];

pub const DEFAULT_OAT: LexiconEntry =
    LexiconEntry::new("oat", &["oat", "oats", "avoine"], "Oat detected");

pub const DEFAULT_GLUTEN_FREE_CLAIM: ClaimEntry = ClaimEntry {
    canonical: NonEmptyStaticStr::new("gluten-free"),
    phrases: &[&["gluten", "free"], &["sans", "gluten"]],
    rationale: "Gluten-free claim",
};

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            ingredients: DEFAULT_INGREDIENTS.to_vec(),
            oat: DEFAULT_OAT,
            gluten_free_claim: DEFAULT_GLUTEN_FREE_CLAIM,
        }
    }
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("lexicon entry '{0}' has no surface forms")]
    NoSurfaceForms(&'static str),
    #[error("lexicon entry '{0}' contains an empty surface form")]
    EmptySurfaceForm(&'static str),
    #[error("invalid matcher for '{term}': {source}")]
    Regex {
        term: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Whole-word matcher for one lexicon entry.
#[derive(Debug, Clone)]
pub(crate) struct TermMatcher {
    pub(crate) entry: LexiconEntry,
    regex: Regex,
}

impl TermMatcher {
    pub(crate) fn compile(entry: LexiconEntry) -> Result<Self, LexiconError> {
        let name = entry.canonical.as_str();
        let alternation = escaped_forms(name, entry.surface_forms.iter().copied())?;
        let regex = compile(name, &format!(r"\b(?:{})\b", alternation.join("|")))?;
        Ok(Self { entry, regex })
    }

    /// `text` must already be in matching form.
    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Phrase matcher for a label claim.
#[derive(Debug, Clone)]
pub(crate) struct ClaimMatcher {
    pub(crate) entry: ClaimEntry,
    regex: Regex,
}

impl ClaimMatcher {
    pub(crate) fn compile(entry: ClaimEntry) -> Result<Self, LexiconError> {
        let name = entry.canonical.as_str();
        if entry.phrases.is_empty() {
            return Err(LexiconError::NoSurfaceForms(name));
        }

        let mut alternatives = Vec::with_capacity(entry.phrases.len());
        for tokens in entry.phrases {
            let tokens = escaped_forms(name, tokens.iter().copied())?;
            alternatives.push(format!(r"\b{}\b", tokens.join(r"[\s\-]+")));
        }
        let regex = compile(name, &alternatives.join("|"))?;
        Ok(Self { entry, regex })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Blank out every claim phrase so its tokens are not read as ingredients.
    pub(crate) fn mask<'t>(&self, text: &'t str) -> std::borrow::Cow<'t, str> {
        self.regex.replace_all(text, " ")
    }
}

fn escaped_forms<'a>(
    name: &'static str,
    forms: impl Iterator<Item = &'a str>,
) -> Result<Vec<String>, LexiconError> {
    let mut escaped = Vec::new();
    for form in forms {
        let folded = fold_accents(&form.trim().to_lowercase());
        if folded.is_empty() {
            return Err(LexiconError::EmptySurfaceForm(name));
        }
        escaped.push(regex::escape(&folded));
    }
    if escaped.is_empty() {
        return Err(LexiconError::NoSurfaceForms(name));
    }
    Ok(escaped)
}

fn compile(term: &'static str, pattern: &str) -> Result<Regex, LexiconError> {
    Regex::new(pattern).map_err(|source| LexiconError::Regex { term, source })
}
