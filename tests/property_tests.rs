//! Property-based tests using proptest.
//!
//! These tests verify invariants of cleaning, feature projection and
//! prediction over generated narratives.

use complaint_loss::prelude::*;
use proptest::prelude::*;
use std::sync::OnceLock;

/// Lowercase words that are neither stop words nor entity candidates, and
/// whose lemmas are not stop words either.
const VOCABULARY: &[&str] = &[
    "charged", "charges", "refund", "refunded", "fee", "fees", "account", "closed", "called",
    "denied", "paid", "bank", "loan", "mortgage", "payment", "late", "credit", "report",
    "disputed", "never", "twice", "interest", "balance", "statement", "stopped", "getting",
    "applied", "received", "overdraft", "collection", "debt", "card", "fraud", "told",
];

const SEPARATORS: &[&str] = &[" ", ", ", ". ", "! ", " 42 ", " $10.00 ", "\t", " - "];

fn narrative_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        (
            proptest::sample::select(VOCABULARY),
            proptest::sample::select(SEPARATORS),
        ),
        0..20,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, sep)| format!("{word}{sep}"))
            .collect()
    })
}

fn normalizer() -> &'static TextNormalizer {
    static NORMALIZER: OnceLock<TextNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(|| TextNormalizer::with_workers(Some(4)).expect("normalizer"))
}

fn fitted() -> &'static FittedPipeline {
    static FITTED: OnceLock<FittedPipeline> = OnceLock::new();
    FITTED.get_or_init(|| {
        let texts = [
            "bank charged overdraft fee twice refund denied",
            "refund overdraft fee charged again",
            "fee charged twice never refunded",
            "letter explained account policy",
            "account policy letter received",
            "received letter explaining policy",
        ];
        ComplaintPipeline::new(
            PipelineConfig::new()
                .with_df_bounds(2, 1.0)
                .with_workers(Some(2)),
        )
        .expect("pipeline")
        .fit(&texts, &[1, 1, 1, 0, 0, 0])
        .expect("fit")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn normalize_is_idempotent(text in narrative_strategy()) {
        let once = normalizer().normalize(&text);
        let twice = normalizer().normalize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_text_is_single_spaced_without_digits(text in ".{0,200}") {
        let cleaned = normalizer().normalize(&text);
        prop_assert!(!cleaned.starts_with(' '));
        prop_assert!(!cleaned.ends_with(' '));
        prop_assert!(!cleaned.contains("  "));
        prop_assert!(!cleaned.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn batch_matches_single_in_order(texts in proptest::collection::vec(narrative_strategy(), 0..32)) {
        let batch = normalizer().normalize_many(&texts);
        let single: Vec<String> = texts.iter().map(|t| normalizer().normalize(t)).collect();
        prop_assert_eq!(batch, single);
    }

    #[test]
    fn features_are_well_formed(text in ".{0,200}") {
        let pipeline = fitted();
        let cleaned = pipeline.normalizer().normalize(&text);
        let features = pipeline.features(&cleaned);
        let dim = pipeline.artifact().features.vocabulary_size();

        prop_assert_eq!(features.dim(), dim);
        prop_assert!(features.indices().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(features.indices().iter().all(|&i| i < dim));
        if !features.is_zero() {
            prop_assert!((features.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prediction_never_fails(text in ".{0,200}") {
        let pipeline = fitted();
        let prediction = pipeline.predict_one(&text);
        prop_assert!((0.0..=1.0).contains(&prediction.probability));
        prop_assert_eq!(prediction.label.class(), usize::from(prediction.probability > 0.5));
    }

    #[test]
    fn derive_never_fails(code in ".{0,40}") {
        match derive(&code) {
            LabelOutcome::Labeled(labels) => {
                prop_assert!(labels.binary <= 1);
                prop_assert!(labels.severity <= 2);
                prop_assert_eq!(labels.binary == 1, labels.severity == 2);
            }
            LabelOutcome::Excluded(_) => {}
        }
    }
}
