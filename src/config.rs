//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! [vectorizer]
//! min_df = 10
//! max_df = 0.3
//! ngram_min = 1
//! ngram_max = 3
//!
//! [classifier]
//! c = 1.0
//! learning_rate = 0.5
//! max_iter = 10000
//! tolerance = 1e-6
//! class_weight = "balanced"
//! severity = false
//!
//! [parallelism]
//! workers = 8
//! ```

use crate::classification::{ClassWeight, LogisticRegression};
use crate::error::{ComplaintError, Result};
use crate::text::vectorize::TfidfVectorizer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a full fit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// TF-IDF feature extraction
    pub vectorizer: VectorizerConfig,
    /// Logistic regression training
    pub classifier: ClassifierConfig,
    /// Normalizer worker pool
    pub parallelism: ParallelismConfig,
}

/// N-gram TF-IDF settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    /// Shortest n-gram
    pub ngram_min: usize,
    /// Longest n-gram
    pub ngram_max: usize,
}

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inverse L2 regularization strength
    pub c: f64,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Iteration cap
    pub max_iter: usize,
    /// Stop once the largest gradient component falls below this
    pub tolerance: f64,
    /// Imbalance compensation
    pub class_weight: ClassWeight,
    /// Also fit the three-way severity head
    pub severity: bool,
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelismConfig {
    /// Worker threads; one per CPU when absent
    pub workers: Option<usize>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        let defaults = TfidfVectorizer::new();
        let (ngram_min, ngram_max) = defaults.ngram_range();
        Self {
            min_df: defaults.min_df(),
            max_df: defaults.max_df(),
            ngram_min,
            ngram_max,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let defaults = LogisticRegression::new();
        Self {
            c: defaults.c(),
            learning_rate: defaults.learning_rate(),
            max_iter: defaults.max_iter(),
            tolerance: defaults.tolerance(),
            class_weight: defaults.class_weight(),
            severity: false,
        }
    }
}

impl PipelineConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::Config`] when the document does not parse.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ComplaintError::Config {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::Config`] naming `path` when the file cannot
    /// be read or parsed.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ComplaintError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&source).map_err(|e| ComplaintError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Fails only if a value has no TOML representation.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ComplaintError::Serialization(e.to_string()))
    }

    /// Set the document-frequency bounds.
    #[must_use]
    pub fn with_df_bounds(mut self, min_df: usize, max_df: f64) -> Self {
        self.vectorizer.min_df = min_df;
        self.vectorizer.max_df = max_df;
        self
    }

    /// Set the n-gram range.
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.vectorizer.ngram_min = min_n;
        self.vectorizer.ngram_max = max_n;
        self
    }

    /// Set the inverse regularization strength.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.classifier.c = c;
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.classifier.max_iter = max_iter;
        self
    }

    /// Set the class weighting.
    #[must_use]
    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.classifier.class_weight = class_weight;
        self
    }

    /// Enable or disable the severity head.
    #[must_use]
    pub fn with_severity(mut self, severity: bool) -> Self {
        self.classifier.severity = severity;
        self
    }

    /// Set the worker count (`None` for one per CPU).
    #[must_use]
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.parallelism.workers = workers;
        self
    }

    /// The configured vectorizer.
    #[must_use]
    pub fn vectorizer(&self) -> TfidfVectorizer {
        TfidfVectorizer::new()
            .with_ngram_range(self.vectorizer.ngram_min, self.vectorizer.ngram_max)
            .with_min_df(self.vectorizer.min_df)
            .with_max_df(self.vectorizer.max_df)
    }

    /// The configured classifier.
    #[must_use]
    pub fn classifier(&self) -> LogisticRegression {
        LogisticRegression::new()
            .with_c(self.classifier.c)
            .with_learning_rate(self.classifier.learning_rate)
            .with_max_iter(self.classifier.max_iter)
            .with_tolerance(self.classifier.tolerance)
            .with_class_weight(self.classifier.class_weight)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::InvalidHyperparameter`] for the first bad value.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer().validate()?;
        self.classifier().validate()?;
        if self.parallelism.workers == Some(0) {
            return Err(ComplaintError::invalid_hyperparameter(
                "workers",
                0,
                "at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_components() {
        let config = PipelineConfig::default();
        assert_eq!(config.vectorizer(), TfidfVectorizer::new());
        assert_eq!(config.classifier(), LogisticRegression::new());
        assert!(!config.classifier.severity);
        assert_eq!(config.parallelism.workers, None);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = PipelineConfig::from_toml_str("").expect("parse");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [vectorizer]
            min_df = 2

            [classifier]
            class_weight = "none"
            severity = true

            [parallelism]
            workers = 2
            "#,
        )
        .expect("parse");

        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.vectorizer.max_df, 0.3);
        assert_eq!(config.vectorizer.ngram_max, 3);
        assert_eq!(config.classifier.class_weight, ClassWeight::None);
        assert!(config.classifier.severity);
        assert_eq!(config.classifier.max_iter, 10_000);
        assert_eq!(config.parallelism.workers, Some(2));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = PipelineConfig::from_toml_str("[classifier]\nc = \"high\"").expect_err("type error");
        assert!(matches!(err, ComplaintError::Config { .. }));
    }

    #[test]
    fn test_from_toml_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pipeline.toml");
        let config = PipelineConfig::new().with_df_bounds(3, 0.5).with_severity(true);
        std::fs::write(&path, config.to_toml_string().expect("render")).expect("write");

        let back = PipelineConfig::from_toml_path(&path).expect("load");
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");
        match PipelineConfig::from_toml_path(&path) {
            Err(ComplaintError::Config { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::new().with_c(-1.0).validate().is_err());
        assert!(PipelineConfig::new().with_ngram_range(3, 1).validate().is_err());
        assert!(PipelineConfig::new().with_df_bounds(1, 1.5).validate().is_err());
        assert!(PipelineConfig::new().with_workers(Some(0)).validate().is_err());
        assert!(PipelineConfig::new().with_max_iter(0).validate().is_err());
    }

    #[test]
    fn test_builders_flow_into_components() {
        let config = PipelineConfig::new()
            .with_ngram_range(1, 2)
            .with_df_bounds(2, 0.9)
            .with_c(0.25)
            .with_class_weight(ClassWeight::None);
        let vectorizer = config.vectorizer();
        assert_eq!(vectorizer.ngram_range(), (1, 2));
        assert_eq!(vectorizer.min_df(), 2);
        assert_eq!(vectorizer.max_df(), 0.9);
        let classifier = config.classifier();
        assert_eq!(classifier.c(), 0.25);
        assert_eq!(classifier.class_weight(), ClassWeight::None);
    }
}
