//! Tests for classification module.

pub(crate) use super::*;

fn one_hot(dim: usize, col: usize) -> FeatureVector {
    FeatureVector::from_pairs(dim, vec![(col, 1.0)]).expect("column in range")
}

fn separable() -> (Vec<FeatureVector>, Vec<usize>) {
    let x = vec![
        one_hot(3, 0),
        one_hot(3, 0),
        one_hot(3, 2),
        one_hot(3, 1),
        one_hot(3, 1),
        FeatureVector::from_pairs(3, vec![(1, 0.8), (2, 0.6)]).expect("in range"),
    ];
    let y = vec![0, 0, 0, 1, 1, 1];
    (x, y)
}

#[test]
fn test_sigmoid() {
    assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    assert!(sigmoid(10.0) > 0.99);
    assert!(sigmoid(-10.0) < 0.01);
    assert!(sigmoid(-1000.0) >= 0.0);
    assert!(sigmoid(1000.0) <= 1.0);
}

#[test]
fn test_logistic_regression_defaults() {
    let model = LogisticRegression::new();
    assert_eq!(model.c, 1.0);
    assert_eq!(model.learning_rate, 0.5);
    assert_eq!(model.max_iter, 10_000);
    assert_eq!(model.tol, 1e-6);
    assert_eq!(model.class_weight, ClassWeight::Balanced);
}

#[test]
fn test_logistic_regression_builder() {
    let model = LogisticRegression::new()
        .with_c(0.5)
        .with_learning_rate(0.1)
        .with_max_iter(500)
        .with_tolerance(1e-3)
        .with_class_weight(ClassWeight::None);

    assert_eq!(model.c, 0.5);
    assert_eq!(model.learning_rate, 0.1);
    assert_eq!(model.max_iter, 500);
    assert_eq!(model.tol, 1e-3);
    assert_eq!(model.class_weight, ClassWeight::None);
}

#[test]
fn test_balanced_class_weights() {
    let y = vec![0, 0, 0, 1];
    let w = ClassWeight::Balanced.class_weights(&y, 2);
    assert!((w[0] - 4.0 / 6.0).abs() < 1e-12);
    assert!((w[1] - 2.0).abs() < 1e-12);

    // Total sample weight equals the sample count.
    let total: f64 = ClassWeight::Balanced.sample_weights(&y, 2).iter().sum();
    assert!((total - 4.0).abs() < 1e-12);

    assert_eq!(ClassWeight::None.class_weights(&y, 2), vec![1.0, 1.0]);
}

#[test]
fn test_balanced_weights_absent_class() {
    let y = vec![0, 2, 2];
    let w = ClassWeight::Balanced.class_weights(&y, 3);
    assert_eq!(w[1], 0.0);
    assert!((w[0] - 1.5).abs() < 1e-12);
    assert!((w[2] - 0.75).abs() < 1e-12);
}

#[test]
fn test_fit_separable() {
    let (x, y) = separable();
    let model = LogisticRegression::new().fit(&x, &y).expect("fit should succeed");

    assert_eq!(model.n_features(), 3);
    for (row, &label) in x.iter().zip(&y) {
        assert_eq!(model.predict(row), label);
    }
    assert!((model.score(&x, &y) - 1.0).abs() < 1e-12);
    assert!(model.coefficients()[1] > 0.0);
    assert!(model.coefficients()[0] < 0.0);
}

#[test]
fn test_probability_matches_decision() {
    let (x, y) = separable();
    let model = LogisticRegression::new().fit(&x, &y).expect("fit should succeed");
    for row in &x {
        let p = model.predict_proba(row);
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(model.predict(row), usize::from(p > 0.5));
        assert_eq!(model.predict_labeled(row).label.class(), model.predict(row));
    }
}

#[test]
fn test_balanced_weights_center_intercept() {
    // No informative features: the intercept alone carries the class prior.
    let x = vec![FeatureVector::zeros(1); 10];
    let mut y = vec![0; 9];
    y.push(1);

    let balanced = LogisticRegression::new().fit(&x, &y).expect("fit should succeed");
    assert!(balanced.intercept().abs() < 1e-3);
    assert!(balanced.converged());

    let plain = LogisticRegression::new()
        .with_class_weight(ClassWeight::None)
        .fit(&x, &y)
        .expect("fit should succeed");
    let expected = (0.1f64 / 0.9).ln();
    assert!((plain.intercept() - expected).abs() < 1e-3);
}

#[test]
fn test_stronger_penalty_shrinks_coefficients() {
    let (x, y) = separable();
    let norm = |m: &BinaryLinearModel| m.coefficients().iter().map(|b| b * b).sum::<f64>();

    let loose = LogisticRegression::new().with_c(10.0).fit(&x, &y).expect("fit");
    let tight = LogisticRegression::new().with_c(0.1).fit(&x, &y).expect("fit");
    assert!(norm(&tight) < norm(&loose));
}

#[test]
fn test_max_iter_bounds_training() {
    let (x, y) = separable();
    let model = LogisticRegression::new().with_max_iter(3).fit(&x, &y).expect("fit");
    assert_eq!(model.iterations(), 3);
    assert!(!model.converged());
}

#[test]
fn test_fit_errors() {
    let (x, y) = separable();
    let lr = LogisticRegression::new();

    assert!(matches!(lr.fit(&[], &[]), Err(ComplaintError::EmptyInput(_))));
    assert!(matches!(
        lr.fit(&x, &y[..2]),
        Err(ComplaintError::DimensionMismatch { .. })
    ));
    assert!(lr.fit(&x, &[0, 0, 0, 1, 1, 2]).is_err());
    assert!(matches!(
        lr.fit(&x, &[0; 6]),
        Err(ComplaintError::EmptyInput(_))
    ));

    let mixed = vec![one_hot(3, 0), one_hot(4, 1)];
    assert!(matches!(
        lr.fit(&mixed, &[0, 1]),
        Err(ComplaintError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_invalid_hyperparameters() {
    let (x, y) = separable();
    for lr in [
        LogisticRegression::new().with_c(0.0),
        LogisticRegression::new().with_c(f64::INFINITY),
        LogisticRegression::new().with_learning_rate(-1.0),
        LogisticRegression::new().with_max_iter(0),
        LogisticRegression::new().with_tolerance(0.0),
    ] {
        assert!(matches!(
            lr.fit(&x, &y),
            Err(ComplaintError::InvalidHyperparameter { .. })
        ));
    }
}

#[test]
fn test_one_vs_rest() {
    let x = vec![
        one_hot(3, 0),
        one_hot(3, 0),
        one_hot(3, 1),
        one_hot(3, 1),
        one_hot(3, 2),
        one_hot(3, 2),
    ];
    let y = vec![0, 0, 1, 1, 2, 2];
    let model = LogisticRegression::new()
        .fit_one_vs_rest(&x, &y, 3)
        .expect("fit should succeed");

    assert_eq!(model.classes(), &[0, 1, 2]);
    assert_eq!(model.n_features(), 3);
    for (row, &label) in x.iter().zip(&y) {
        assert_eq!(model.predict(row), label);
        let total: f64 = model.predict_proba(row).iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_one_vs_rest_skips_absent_class() {
    let x = vec![one_hot(2, 0), one_hot(2, 0), one_hot(2, 1)];
    let y = vec![0, 0, 2];
    let model = LogisticRegression::new()
        .fit_one_vs_rest(&x, &y, 3)
        .expect("fit should succeed");
    assert_eq!(model.classes(), &[0, 2]);
    assert_eq!(model.predict(&x[2]), 2);
}

#[test]
fn test_one_vs_rest_errors() {
    let x = vec![one_hot(2, 0), one_hot(2, 1)];
    let lr = LogisticRegression::new();
    assert!(lr.fit_one_vs_rest(&x, &[1, 1], 3).is_err());
    assert!(lr.fit_one_vs_rest(&x, &[0, 3], 3).is_err());
}

#[test]
fn test_prediction_threshold() {
    assert_eq!(Prediction::from_probability(0.5).label, LossLabel::Low);
    assert_eq!(Prediction::from_probability(0.51).label, LossLabel::Likely);
    assert_eq!(Prediction::from_probability(0.2).label, LossLabel::Low);
}

#[test]
fn test_class_weight_serde_names() {
    let json = serde_json::to_string(&ClassWeight::Balanced).expect("serialize");
    assert_eq!(json, "\"balanced\"");
    let back: ClassWeight = serde_json::from_str("\"none\"").expect("deserialize");
    assert_eq!(back, ClassWeight::None);
}
