//! Verdict rules and the fold that combines them.
//!
//! Rules run in [`Rule::ORDERED`] order. Each one that fires yields a
//! [`Contribution`], and [`Assessment::absorb`] merges it: the verdict can only
//! escalate, confidence can only rise, and rationale is appended.

use glutenscan_types::{Confidence, NonEmptyStaticStr, NonEmptyString, Verdict};

use crate::Signals;

pub const BASELINE_CONFIDENCE: Confidence = Confidence::from_static(0.4);
pub const GLUTEN_CONFIDENCE: Confidence = Confidence::from_static(0.85);
pub const OAT_CONFIDENCE: Confidence = Confidence::from_static(0.75);
pub const CLAIM_CONFIDENCE: Confidence = Confidence::from_static(0.6);

pub const GLUTEN_RATIONALE: NonEmptyStaticStr =
    NonEmptyStaticStr::new("Gluten-containing ingredients detected.");
pub const OAT_RATIONALE: NonEmptyStaticStr =
    NonEmptyStaticStr::new("Contains oats, which may be cross-contaminated with gluten.");
pub const CLAIM_RATIONALE: NonEmptyStaticStr =
    NonEmptyStaticStr::new("Explicit gluten-free claim detected.");
pub const DEFAULT_RATIONALE: NonEmptyStaticStr =
    NonEmptyStaticStr::new("No problematic ingredient detected by heuristics.");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub rationale: NonEmptyStaticStr,
}

/// Running state of the fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub rationale: Vec<NonEmptyStaticStr>,
}

impl Default for Assessment {
    fn default() -> Self {
        Self {
            verdict: Verdict::Unknown,
            confidence: BASELINE_CONFIDENCE,
            rationale: Vec::new(),
        }
    }
}

impl Assessment {
    pub fn absorb(&mut self, contribution: Contribution) {
        self.verdict = self.verdict.escalate(contribution.verdict);
        self.confidence = self.confidence.max(contribution.confidence);
        self.rationale.push(contribution.rationale);
    }

    /// Triggered rationale joined by single spaces, or the default sentence.
    #[must_use]
    pub fn reasoning(&self) -> NonEmptyString {
        match self.rationale.split_first() {
            Some((first, rest)) => NonEmptyString::join(*first, rest, " "),
            None => NonEmptyString::from(DEFAULT_RATIONALE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    GlutenIngredients,
    OatContamination,
    GlutenFreeClaim,
}

impl Rule {
    pub const ORDERED: [Rule; 3] = [
        Rule::GlutenIngredients,
        Rule::OatContamination,
        Rule::GlutenFreeClaim,
    ];

    /// The contribution of this rule, if it fires against `signals` given the state so far.
    #[must_use]
    pub fn evaluate(self, signals: &Signals, current: &Assessment) -> Option<Contribution> {
        match self {
            Rule::GlutenIngredients => (!signals.ingredients.is_empty()).then_some(Contribution {
                verdict: Verdict::Unsafe,
                confidence: GLUTEN_CONFIDENCE,
                rationale: GLUTEN_RATIONALE,
            }),
            Rule::OatContamination => signals.oat.then_some(Contribution {
                verdict: Verdict::Warning,
                confidence: OAT_CONFIDENCE,
                rationale: OAT_RATIONALE,
            }),
            // A label claim never speaks over detected gluten.
            Rule::GlutenFreeClaim => (signals.gluten_free_claim
                && current.verdict != Verdict::Unsafe)
                .then_some(Contribution {
                    verdict: Verdict::Safe,
                    confidence: CLAIM_CONFIDENCE,
                    rationale: CLAIM_RATIONALE,
                }),
        }
    }
}

/// Fold every rule over `signals`, starting from the baseline.
#[must_use]
pub fn assess(signals: &Signals) -> Assessment {
    Rule::ORDERED
        .iter()
        .fold(Assessment::default(), |mut state, rule| {
            if let Some(contribution) = rule.evaluate(signals, &state) {
                state.absorb(contribution);
            }
            state
        })
}
