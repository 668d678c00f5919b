use std::sync::OnceLock;

use glutenscan_types::{AnalysisResult, AnalysisTerm, NonEmptyString};

use crate::lexicon::{ClaimMatcher, Lexicon, LexiconEntry, LexiconError, TermMatcher};
use crate::normalize::matching_form;
use crate::rules::assess;
use crate::sentences::RelevantSentences;

/// Signals detected in one piece of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals<'l> {
    /// Matched gluten-ingredient entries, in lexicon order.
    pub ingredients: Vec<&'l LexiconEntry>,
    pub oat: bool,
    pub gluten_free_claim: bool,
}

impl Signals<'_> {
    #[must_use]
    pub fn any(&self) -> bool {
        !self.ingredients.is_empty() || self.oat || self.gluten_free_claim
    }
}

/// Deterministic rule-based gluten classifier.
///
/// Holds only the compiled lexicon; every call is independent.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    ingredients: Vec<TermMatcher>,
    oat: TermMatcher,
    claim: ClaimMatcher,
}

impl HeuristicClassifier {
    pub fn new(lexicon: Lexicon) -> Result<Self, LexiconError> {
        let ingredients = lexicon
            .ingredients
            .into_iter()
            .map(TermMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            ingredients,
            oat: TermMatcher::compile(lexicon.oat)?,
            claim: ClaimMatcher::compile(lexicon.gluten_free_claim)?,
        })
    }

    /// Process-wide classifier built from the default lexicon.
    pub fn shared() -> &'static Self {
        static CLASSIFIER: OnceLock<HeuristicClassifier> = OnceLock::new();
        CLASSIFIER
            .get_or_init(|| Self::new(Lexicon::default()).expect("default lexicon compiles"))
    }

    #[must_use]
    pub fn detect(&self, text: &str) -> Signals<'_> {
        let normalized = matching_form(text);
        // "gluten" inside a gluten-free claim is not an ingredient mention.
        let ingredient_text = self.claim.mask(&normalized);

        Signals {
            ingredients: self
                .ingredients
                .iter()
                .filter(|matcher| matcher.is_match(&ingredient_text))
                .map(|matcher| &matcher.entry)
                .collect(),
            oat: self.oat.is_match(&normalized),
            gluten_free_claim: self.claim.is_match(&normalized),
        }
    }

    /// Classify `text`. Accepts any string, including the empty one.
    #[must_use]
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let signals = self.detect(text);
        let assessment = assess(&signals);

        let mut terms = Vec::with_capacity(signals.ingredients.len() + 2);
        for entry in &signals.ingredients {
            terms.push(AnalysisTerm::hit(
                NonEmptyString::from(entry.canonical),
                entry.rationale,
            ));
        }
        if signals.oat {
            let oat = &self.oat.entry;
            terms.push(AnalysisTerm::hit(
                NonEmptyString::from(oat.canonical),
                oat.rationale,
            ));
        }
        if signals.gluten_free_claim {
            let claim = &self.claim.entry;
            terms.push(AnalysisTerm::claim(
                NonEmptyString::from(claim.canonical),
                claim.rationale,
            ));
        }

        tracing::debug!(
            verdict = %assessment.verdict,
            confidence = assessment.confidence.value(),
            ingredient_hits = signals.ingredients.len(),
            oat = signals.oat,
            gluten_free_claim = signals.gluten_free_claim,
            "Heuristic analysis complete"
        );

        AnalysisResult {
            verdict: assessment.verdict,
            confidence: assessment.confidence,
            reasoning: assessment.reasoning(),
            terms,
        }
    }

    /// Sentences of `text` that carry at least one signal, in source order.
    #[must_use]
    pub fn relevant_sentences<'t>(&self, text: &'t str) -> RelevantSentences<'_, 't> {
        RelevantSentences::new(self, text)
    }
}
