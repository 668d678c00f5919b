//! Sentence splitting for UI highlighting.
//!
//! A sentence ends at `.`, `!` or `?` immediately followed by whitespace. The
//! whitespace run is the separator and is dropped; the punctuation stays with
//! the sentence.

use crate::HeuristicClassifier;

/// Iterator over trimmed, non-empty sentences of a text.
#[derive(Debug, Clone)]
pub struct Sentences<'t> {
    rest: &'t str,
}

impl<'t> Sentences<'t> {
    #[must_use]
    pub fn new(text: &'t str) -> Self {
        Self { rest: text }
    }
}

impl<'t> Iterator for Sentences<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let (sentence, rest) = split_first_sentence(self.rest);
            self.rest = rest;
            let sentence = sentence.trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

fn split_first_sentence(text: &str) -> (&str, &str) {
    let mut chars = text.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?')
            && let Some(&(end, next)) = chars.peek()
            && next.is_whitespace()
        {
            return (&text[..end], text[end..].trim_start());
        }
    }
    (text, "")
}

/// Sentences that carry a gluten, oat or gluten-free signal.
///
/// Cloning the iterator restarts it from the current position, so a fresh
/// clone taken before iteration can be replayed.
#[derive(Debug, Clone)]
pub struct RelevantSentences<'c, 't> {
    classifier: &'c HeuristicClassifier,
    sentences: Sentences<'t>,
}

impl<'c, 't> RelevantSentences<'c, 't> {
    pub(crate) fn new(classifier: &'c HeuristicClassifier, text: &'t str) -> Self {
        Self {
            classifier,
            sentences: Sentences::new(text),
        }
    }
}

impl<'t> Iterator for RelevantSentences<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        let classifier = self.classifier;
        self.sentences
            .by_ref()
            .find(|sentence| classifier.detect(sentence).any())
    }
}
