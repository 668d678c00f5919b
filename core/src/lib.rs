//! Deterministic gluten-risk classifier.
//!
//! Pure text in, structured verdict out: no IO, no async, no state between calls.
//! This is both the standalone classifier and the fallback used when
//! refinement is unavailable.
//!
//! # Pipeline
//!
//! ```text
//! text -> normalize -> fold accents -> detect Signals -> fold Rules -> AnalysisResult
//! ```
//!
//! - [`lexicon`] - declarative table of terms and the matchers compiled from it
//! - [`normalize`] - lowercasing, newline collapsing, accent folding
//! - [`rules`] - ordered verdict rules and the monotone fold that combines them
//! - [`sentences`] - sentence splitting for highlighting

mod classifier;
pub mod lexicon;
pub mod normalize;
pub mod rules;
pub mod sentences;

pub use classifier::{HeuristicClassifier, Signals};
pub use lexicon::{Lexicon, LexiconEntry, LexiconError};
pub use sentences::RelevantSentences;

use glutenscan_types::AnalysisResult;

/// Classify `text` with the default lexicon. Never fails.
///
/// ```rust
/// use glutenscan_types::Verdict;
///
/// let result = glutenscan_core::analyze("Ingredients: wheat flour, water");
/// assert_eq!(result.verdict, Verdict::Unsafe);
/// assert_eq!(result.terms[0].term.as_str(), "wheat");
/// ```
#[must_use]
pub fn analyze(text: &str) -> AnalysisResult {
    HeuristicClassifier::shared().analyze(text)
}

/// Sentences of `text` mentioning any gluten, oat or gluten-free signal.
#[must_use]
pub fn extract_relevant_sentences(text: &str) -> RelevantSentences<'static, '_> {
    HeuristicClassifier::shared().relevant_sentences(text)
}
