//! Heuristic classifier properties

use glutenscan_core::{
    HeuristicClassifier, Lexicon, LexiconEntry, analyze, extract_relevant_sentences,
};
use glutenscan_types::Verdict;

fn confidence(text: &str) -> f64 {
    analyze(text).confidence.value()
}

#[test]
fn example_scenarios() {
    let wheat = analyze("Ingredients: wheat flour, water");
    assert_eq!(wheat.verdict, Verdict::Unsafe);
    assert!((wheat.confidence.value() - 0.85).abs() < f64::EPSILON);
    assert_eq!(wheat.terms[0].term.as_str(), "wheat");
    assert!(wheat.terms[0].matched);

    let oats = analyze("Oat flakes, certified gluten-free");
    assert_eq!(oats.verdict, Verdict::Warning);
    assert!((oats.confidence.value() - 0.75).abs() < f64::EPSILON);
    let names: Vec<_> = oats.terms.iter().map(|t| (t.term.as_str(), t.matched)).collect();
    assert_eq!(names, [("oat", true), ("gluten-free", false)]);

    let crackers = analyze("Rice crackers, gluten-free");
    assert_eq!(crackers.verdict, Verdict::Safe);
    assert!((crackers.confidence.value() - 0.6).abs() < f64::EPSILON);

    let plain = analyze("Rice, water, salt");
    assert_eq!(plain.verdict, Verdict::Unknown);
    assert!((plain.confidence.value() - 0.4).abs() < f64::EPSILON);
    assert_eq!(
        plain.reasoning.as_str(),
        "No problematic ingredient detected by heuristics."
    );
    assert!(plain.terms.is_empty());
}

#[test]
fn claim_never_downgrades_unsafe() {
    for text in [
        "Gluten-free bread made with barley malt",
        "Sans gluten. Contient: seigle",
        "wheat starch (gluten free)",
    ] {
        let result = analyze(text);
        assert_eq!(result.verdict, Verdict::Unsafe, "{text}");
        assert!((result.confidence.value() - 0.85).abs() < f64::EPSILON);
        assert!(
            !result.reasoning.contains("gluten-free claim"),
            "claim rationale must not be added once unsafe: {}",
            result.reasoning
        );
    }
}

#[test]
fn oat_without_ingredients_is_warning_with_or_without_claim() {
    for text in ["rolled oats", "OATS, gluten free", "flocons d'avoine sans gluten"] {
        let result = analyze(text);
        assert_eq!(result.verdict, Verdict::Warning, "{text}");
        assert!(result.confidence.value() >= 0.75);
    }
}

#[test]
fn term_order_is_ingredients_then_oat_then_claim() {
    let result = analyze("Spelt, oats, rye, wheat. Not gluten-free.");
    let names: Vec<_> = result.terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(names, ["wheat", "rye", "spelt", "oat", "gluten-free"]);
    assert_eq!(
        result.reasoning.as_str(),
        "Gluten-containing ingredients detected. Contains oats, which may be cross-contaminated with gluten."
    );
}

#[test]
fn accented_and_plain_spellings_are_equivalent() {
    for (accented, plain) in [("farine de blé", "farine de ble"), ("épeautre", "epeautre")] {
        assert_eq!(analyze(accented), analyze(plain));
        assert_eq!(analyze(accented).verdict, Verdict::Unsafe);
    }
}

#[test]
fn whole_words_only() {
    for text in ["buckwheat", "ryegrass? no: rice", "oatmeal-free zone", "glutenous rice"] {
        let result = analyze(text);
        assert!(
            !matches!(result.verdict, Verdict::Unsafe),
            "{text} should not be unsafe, got {:?}",
            result.terms
        );
    }
}

#[test]
fn confidence_never_decreases_as_rules_trigger() {
    let stages = [
        "Rice",
        "Rice, gluten free",
        "Rice, oats, gluten free",
        "Rice, oats, wheat, gluten free",
    ];
    let values: Vec<_> = stages.iter().map(|t| confidence(t)).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
}

#[test]
fn custom_lexicon_extends_ingredients() {
    let mut lexicon = Lexicon::default();
    lexicon
        .ingredients
        .push(LexiconEntry::new("kamut", &["kamut", "khorasan"], "Kamut detected"));

    let classifier = HeuristicClassifier::new(lexicon).unwrap();
    let result = classifier.analyze("Khorasan wheat berries");
    let names: Vec<_> = result.terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(names, ["wheat", "kamut"]);
    assert_eq!(result.verdict, Verdict::Unsafe);
}

#[test]
fn relevant_sentences_keep_order_and_are_restartable() {
    let text = "Made in a facility. Contains oats! Sugar, cocoa. Certified gluten free? Enjoy.";
    let sentences = extract_relevant_sentences(text);

    let first: Vec<_> = sentences.clone().collect();
    let second: Vec<_> = sentences.collect();
    assert_eq!(first, ["Contains oats!", "Certified gluten free?"]);
    assert_eq!(first, second);

    let joined = first.join(" ");
    let again: Vec<_> = extract_relevant_sentences(&joined).collect();
    assert_eq!(again, first);
}
