//! Analysis verdicts and results.

use serde::{Deserialize, Serialize};

use crate::{Confidence, NonEmptyString};

/// Coarse gluten-risk classification.
///
/// Variants are declared in ascending severity so the derived `Ord` is the
/// escalation order: `Unknown < Safe < Warning < Unsafe`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Unknown,
    Safe,
    Warning,
    Unsafe,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Unknown,
        Verdict::Safe,
        Verdict::Warning,
        Verdict::Unsafe,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Verdict::Unknown => "unknown",
            Verdict::Safe => "safe",
            Verdict::Warning => "warning",
            Verdict::Unsafe => "unsafe",
        }
    }

    /// The more severe of `self` and `other`.
    #[must_use]
    pub fn escalate(self, other: Self) -> Self {
        self.max(other)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected or claimed lexical signal.
///
/// `matched` is `true` for risk hits and `false` for recorded claims such as
/// a gluten-free label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisTerm {
    pub term: NonEmptyString,
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl AnalysisTerm {
    #[must_use]
    pub fn hit(term: NonEmptyString, rationale: impl Into<String>) -> Self {
        Self {
            term,
            matched: true,
            rationale: Some(rationale.into()),
        }
    }

    #[must_use]
    pub fn claim(term: NonEmptyString, rationale: impl Into<String>) -> Self {
        Self {
            term,
            matched: false,
            rationale: Some(rationale.into()),
        }
    }
}

/// Complete classifier output. Built fresh per request and never mutated after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisResult {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub reasoning: NonEmptyString,
    pub terms: Vec<AnalysisTerm>,
}

impl AnalysisResult {
    /// Terms that indicate gluten presence or risk.
    pub fn risk_terms(&self) -> impl Iterator<Item = &AnalysisTerm> {
        self.terms.iter().filter(|term| term.matched)
    }
}
