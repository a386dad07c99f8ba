//! Linear classifiers over sparse TF-IDF features.
//!
//! - [`LogisticRegression`]: training settings; `fit` returns a
//!   [`BinaryLinearModel`], `fit_one_vs_rest` a [`SeverityModel`]
//! - [`ClassWeight`]: imbalance compensation
//! - [`Prediction`]: binary decision plus its probability
//!
//! # Example
//!
//! ```
//! use complaint_loss::classification::LogisticRegression;
//! use complaint_loss::text::vectorize::FeatureVector;
//!
//! let x = vec![
//!     FeatureVector::from_pairs(2, vec![(0, 1.0)]).unwrap(),
//!     FeatureVector::from_pairs(2, vec![(0, 1.0)]).unwrap(),
//!     FeatureVector::from_pairs(2, vec![(1, 1.0)]).unwrap(),
//! ];
//! let y = vec![0, 0, 1];
//!
//! let model = LogisticRegression::new()
//!     .with_max_iter(2000)
//!     .fit(&x, &y)
//!     .expect("two classes present");
//! assert_eq!(model.predict(&x[2]), 1);
//! assert_eq!(model.predict(&x[0]), 0);
//! ```

use crate::error::{ComplaintError, Result};
use crate::labels::LossLabel;
use crate::text::vectorize::FeatureVector;
use serde::{Deserialize, Serialize};

/// Binary decision with the model's probability of monetary loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decided label
    pub label: LossLabel,
    /// Probability of class 1
    pub probability: f64,
}

impl Prediction {
    /// Decide from a class-1 probability at the 0.5 threshold.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        Self {
            label: LossLabel::from_class(usize::from(probability > 0.5)),
            probability,
        }
    }
}

/// Per-class sample weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// `w_c = n / (k × n_c)`: every class contributes equally
    #[default]
    Balanced,
    /// Every sample weighs 1
    None,
}

impl ClassWeight {
    /// Weight of each class `0..n_classes` for labels `y`. Absent classes
    /// get weight 0.
    #[must_use]
    pub fn class_weights(self, y: &[usize], n_classes: usize) -> Vec<f64> {
        match self {
            Self::None => vec![1.0; n_classes],
            Self::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &label in y {
                    if label < n_classes {
                        counts[label] += 1;
                    }
                }
                #[allow(clippy::cast_precision_loss)]
                let n = y.len() as f64;
                let k = counts.iter().filter(|&&c| c > 0).count().max(1);
                #[allow(clippy::cast_precision_loss)]
                let weights = counts
                    .iter()
                    .map(|&c| if c == 0 { 0.0 } else { n / (k as f64 * c as f64) })
                    .collect();
                weights
            }
        }
    }

    /// Weight of each sample.
    #[must_use]
    pub fn sample_weights(self, y: &[usize], n_classes: usize) -> Vec<f64> {
        let per_class = self.class_weights(y, n_classes);
        y.iter()
            .map(|&label| per_class.get(label).copied().unwrap_or(0.0))
            .collect()
    }
}

/// Numerically stable σ(z) = 1 / (1 + e^(-z)).
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Logistic regression settings, trained by full-batch gradient descent.
///
/// Minimizes the sample-weighted mean log-loss plus `‖β‖² / (2·C·W)`, where
/// `W` is the total sample weight; the intercept is not penalized. Training
/// stops when every gradient component is below `tol` or after `max_iter`
/// steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    class_weight: ClassWeight,
}

impl LogisticRegression {
    /// Defaults: `C = 1.0`, learning rate 0.5, 10000 iterations, tolerance
    /// 1e-6, balanced class weights.
    #[must_use]
    pub fn new() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.5,
            max_iter: 10_000,
            tol: 1e-6,
            class_weight: ClassWeight::Balanced,
        }
    }

    /// Inverse regularization strength.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the class weighting.
    #[must_use]
    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Inverse regularization strength.
    #[must_use]
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Gradient descent step size.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Iteration cap.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Convergence tolerance on the gradient.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    /// Class weighting.
    #[must_use]
    pub fn class_weight(&self) -> ClassWeight {
        self.class_weight
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for non-positive `C`, learning rate
    /// or tolerance, or zero iterations.
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ComplaintError::invalid_hyperparameter("c", self.c, "> 0"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ComplaintError::invalid_hyperparameter(
                "learning_rate",
                self.learning_rate,
                "> 0",
            ));
        }
        if self.max_iter == 0 {
            return Err(ComplaintError::invalid_hyperparameter("max_iter", 0, ">= 1"));
        }
        if !(self.tol > 0.0) {
            return Err(ComplaintError::invalid_hyperparameter("tol", self.tol, "> 0"));
        }
        Ok(())
    }

    fn check_inputs(x: &[FeatureVector], y_len: usize) -> Result<usize> {
        if x.is_empty() {
            return Err(ComplaintError::empty_input("cannot fit with zero samples"));
        }
        if x.len() != y_len {
            return Err(ComplaintError::dimension_mismatch("labels", x.len(), y_len));
        }
        let dim = x[0].dim();
        if let Some(bad) = x.iter().find(|row| row.dim() != dim) {
            return Err(ComplaintError::dimension_mismatch("features", dim, bad.dim()));
        }
        Ok(dim)
    }

    /// Fit a binary model on labels in {0, 1}.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings, empty or mismatched inputs,
    /// labels outside {0, 1}, or a single-class training set.
    pub fn fit(&self, x: &[FeatureVector], y: &[usize]) -> Result<BinaryLinearModel> {
        self.validate()?;
        let dim = Self::check_inputs(x, y.len())?;
        if let Some(&bad) = y.iter().find(|&&label| label > 1) {
            return Err(ComplaintError::invalid_hyperparameter("label", bad, "0 or 1"));
        }
        if !(y.contains(&0) && y.contains(&1)) {
            return Err(ComplaintError::empty_input(
                "binary training needs samples of both classes",
            ));
        }

        let weights = self.class_weight.sample_weights(y, 2);
        let targets: Vec<f64> = y.iter().map(|&label| if label == 1 { 1.0 } else { 0.0 }).collect();
        let model = self.descend(x, &targets, &weights, dim);
        tracing::info!(
            samples = x.len(),
            features = dim,
            iterations = model.iterations,
            converged = model.converged,
            "fitted binary classifier"
        );
        Ok(model)
    }

    /// Fit one binary model per class present in `y` (one-vs-rest).
    ///
    /// Sample weights are computed once from the multiclass labels.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings, empty or mismatched inputs,
    /// labels `>= n_classes`, or fewer than two classes present.
    pub fn fit_one_vs_rest(
        &self,
        x: &[FeatureVector],
        y: &[usize],
        n_classes: usize,
    ) -> Result<SeverityModel> {
        self.validate()?;
        let dim = Self::check_inputs(x, y.len())?;
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ComplaintError::invalid_hyperparameter(
                "label",
                bad,
                &format!("< {n_classes}"),
            ));
        }

        let classes: Vec<usize> = (0..n_classes).filter(|c| y.contains(c)).collect();
        if classes.len() < 2 {
            return Err(ComplaintError::empty_input(
                "one-vs-rest training needs at least two classes",
            ));
        }

        let weights = self.class_weight.sample_weights(y, n_classes);
        let models = classes
            .iter()
            .map(|&class| {
                let targets: Vec<f64> = y
                    .iter()
                    .map(|&label| if label == class { 1.0 } else { 0.0 })
                    .collect();
                self.descend(x, &targets, &weights, dim)
            })
            .collect();

        tracing::info!(samples = x.len(), classes = classes.len(), "fitted severity head");
        Ok(SeverityModel { classes, models })
    }

    /// Full-batch gradient descent on the weighted, penalized log-loss.
    fn descend(
        &self,
        x: &[FeatureVector],
        targets: &[f64],
        weights: &[f64],
        dim: usize,
    ) -> BinaryLinearModel {
        let total_weight: f64 = weights.iter().sum::<f64>().max(f64::MIN_POSITIVE);
        let penalty = 1.0 / (self.c * total_weight);

        let mut coefficients = vec![0.0; dim];
        let mut intercept = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        let mut coef_grad = vec![0.0; dim];
        while iterations < self.max_iter {
            iterations += 1;

            for (g, &beta) in coef_grad.iter_mut().zip(&coefficients) {
                *g = penalty * beta;
            }
            let mut intercept_grad = 0.0;

            for ((row, &target), &weight) in x.iter().zip(targets).zip(weights) {
                if weight == 0.0 {
                    continue;
                }
                let p = sigmoid(intercept + row.dot(&coefficients));
                let error = weight * (p - target) / total_weight;
                intercept_grad += error;
                for (col, value) in row.iter() {
                    coef_grad[col] += error * value;
                }
            }

            intercept -= self.learning_rate * intercept_grad;
            for (beta, g) in coefficients.iter_mut().zip(&coef_grad) {
                *beta -= self.learning_rate * g;
            }

            if intercept_grad.abs() < self.tol && coef_grad.iter().all(|g| g.abs() < self.tol) {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(iterations, "gradient descent stopped before converging");
        }

        BinaryLinearModel {
            coefficients,
            intercept,
            iterations,
            converged,
        }
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Fitted binary logistic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryLinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
    iterations: usize,
    converged: bool,
}

impl BinaryLinearModel {
    /// Model coefficients (weights), one per feature column.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Intercept (bias) term.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of features the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Gradient steps taken during fitting.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether fitting reached the tolerance.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Linear score `b + x·β`.
    #[must_use]
    pub fn decision_function(&self, x: &FeatureVector) -> f64 {
        self.intercept + x.dot(&self.coefficients)
    }

    /// Probability of class 1.
    #[must_use]
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    /// Class 1 when the probability exceeds 0.5.
    #[must_use]
    pub fn predict(&self, x: &FeatureVector) -> usize {
        usize::from(self.decision_function(x) > 0.0)
    }

    /// Label and probability together.
    #[must_use]
    pub fn predict_labeled(&self, x: &FeatureVector) -> Prediction {
        Prediction::from_probability(self.predict_proba(x))
    }

    /// Fraction of samples classified correctly.
    #[must_use]
    pub fn score(&self, x: &[FeatureVector], y: &[usize]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(row, label)| self.predict(row) == **label)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let accuracy = correct as f64 / x.len() as f64;
        accuracy
    }
}

/// One-vs-rest multiclass model over severity classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityModel {
    classes: Vec<usize>,
    models: Vec<BinaryLinearModel>,
}

impl SeverityModel {
    /// Classes seen during fitting, ascending.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Number of features the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.models.first().map_or(0, BinaryLinearModel::n_features)
    }

    /// Per-class probabilities, normalized to sum to 1.
    #[must_use]
    pub fn predict_proba(&self, x: &FeatureVector) -> Vec<(usize, f64)> {
        let raw: Vec<f64> = self.models.iter().map(|m| m.predict_proba(x)).collect();
        let total: f64 = raw.iter().sum();
        self.classes
            .iter()
            .copied()
            .zip(raw)
            .map(|(class, p)| (class, if total > 0.0 { p / total } else { p }))
            .collect()
    }

    /// Class with the highest probability; ties go to the lower class.
    #[must_use]
    pub fn predict(&self, x: &FeatureVector) -> usize {
        let mut best = (self.classes.first().copied().unwrap_or(0), f64::NEG_INFINITY);
        for (class, p) in self.predict_proba(x) {
            if p > best.1 {
                best = (class, p);
            }
        }
        best.0
    }
}

#[cfg(test)]
mod tests;
