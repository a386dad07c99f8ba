//! Fit/predict orchestration: normalizer, TF-IDF features and classifier as
//! one unit.
//!
//! Training produces a [`FittedPipeline`] whose fitted state lives in one
//! [`PipelineArtifact`]. The serving path loads that artifact and only runs
//! clean -> transform -> predict; it never refits.
//!
//! # Examples
//!
//! ```no_run
//! use complaint_loss::pipeline::{ComplaintPipeline, FittedPipeline};
//! use complaint_loss::config::PipelineConfig;
//!
//! let records = complaint_loss::data::read_records_path("complaints.csv")?;
//! let (fitted, report) = ComplaintPipeline::new(PipelineConfig::default())?.fit_records(&records)?;
//! println!("trained on {} of {} records", report.labeled, report.total());
//! fitted.save("model.clpa")?;
//!
//! let serving = FittedPipeline::load("model.clpa")?;
//! let prediction = serving.predict_one("I was charged twice and never refunded.");
//! println!("{} ({})", prediction.label, prediction.label.description());
//! # Ok::<(), complaint_loss::error::ComplaintError>(())
//! ```

use crate::classification::{BinaryLinearModel, Prediction, SeverityModel};
use crate::config::PipelineConfig;
use crate::data::{ComplaintRecord, ScoredRow, ScoringRow};
use crate::error::{ComplaintError, Result};
use crate::labels::{derive_records, DerivationReport, LossLabel, LossLabels, N_SEVERITY_CLASSES};
use crate::serialization;
use crate::text::normalize::TextNormalizer;
use crate::text::vectorize::{FeatureVector, TfidfModel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a fit produces, persisted as a single artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    /// Fingerprint of the normalizer the model was fitted with
    pub fingerprint: u32,
    /// Configuration used for the fit
    pub config: PipelineConfig,
    /// Frozen vocabulary and IDF weights
    pub features: TfidfModel,
    /// Binary loss classifier
    pub classifier: BinaryLinearModel,
    /// Optional three-way severity head
    pub severity: Option<SeverityHead>,
    /// Fraction of training documents labeled as a loss
    pub positive_rate: f64,
    /// Number of training documents
    pub n_train: usize,
}

/// Severity classifier plus the fallback used for featureless documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityHead {
    /// One-vs-rest model over severities 0..=2
    pub model: SeverityModel,
    /// Most frequent training severity
    pub default_severity: u8,
}

impl PipelineArtifact {
    /// Label given to documents with no known features: the training
    /// majority class, ties going to [`LossLabel::Low`].
    #[must_use]
    pub fn default_label(&self) -> LossLabel {
        self.default_prediction().label
    }

    fn default_prediction(&self) -> Prediction {
        Prediction::from_probability(self.positive_rate)
    }

    /// Check internal consistency of a decoded artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::FormatError`] when the parts disagree.
    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        let width = self.features.vocabulary_size();
        if self.classifier.n_features() != width {
            return Err(ComplaintError::FormatError {
                message: format!(
                    "classifier expects {} features, vocabulary has {width}",
                    self.classifier.n_features()
                ),
            });
        }
        if let Some(head) = &self.severity {
            if head.model.n_features() != width {
                return Err(ComplaintError::FormatError {
                    message: format!(
                        "severity head expects {} features, vocabulary has {width}",
                        head.model.n_features()
                    ),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.positive_rate) {
            return Err(ComplaintError::FormatError {
                message: format!("positive rate {} outside [0, 1]", self.positive_rate),
            });
        }
        Ok(())
    }
}

/// Unfitted pipeline: a configuration and the normalizer it trains with.
#[derive(Debug, Clone)]
pub struct ComplaintPipeline {
    config: PipelineConfig,
    normalizer: TextNormalizer,
}

impl ComplaintPipeline {
    /// Build from a configuration, starting the normalizer's worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or if the pool cannot start.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = TextNormalizer::with_workers(config.parallelism.workers)?;
        Ok(Self { config, normalizer })
    }

    /// Train with a custom normalizer (recognizer or lemmatizer swapped).
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fit on narratives and binary labels (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns an error for mismatched lengths, an empty corpus, labels
    /// outside {0, 1}, a single-class training set, or a vocabulary that
    /// comes out empty under the configured thresholds.
    pub fn fit<S: AsRef<str> + Sync>(&self, texts: &[S], labels: &[usize]) -> Result<FittedPipeline> {
        self.fit_inner(texts, labels, None)
    }

    /// Fit on narratives and derived labels, training the severity head too
    /// when the configuration asks for it.
    ///
    /// # Errors
    ///
    /// See [`ComplaintPipeline::fit`].
    pub fn fit_labeled<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        labels: &[LossLabels],
    ) -> Result<FittedPipeline> {
        let binary: Vec<usize> = labels.iter().map(|l| usize::from(l.binary)).collect();
        let severity: Vec<usize> = labels.iter().map(|l| usize::from(l.severity)).collect();
        self.fit_inner(texts, &binary, Some(&severity))
    }

    /// Derive labels from response codes and fit on the labeled subset.
    ///
    /// # Errors
    ///
    /// Fails when no record survives label derivation, or as
    /// [`ComplaintPipeline::fit`].
    pub fn fit_records(
        &self,
        records: &[ComplaintRecord],
    ) -> Result<(FittedPipeline, DerivationReport)> {
        let (labeled, report) = derive_records(records);
        if labeled.is_empty() {
            return Err(ComplaintError::empty_input(
                "no record has a terminal response code",
            ));
        }

        let texts: Vec<&str> = labeled.iter().map(|(r, _)| r.narrative.as_str()).collect();
        let labels: Vec<LossLabels> = labeled.iter().map(|(_, l)| *l).collect();
        let fitted = self.fit_labeled(&texts, &labels)?;
        Ok((fitted, report))
    }

    fn fit_inner<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
        labels: &[usize],
        severity: Option<&[usize]>,
    ) -> Result<FittedPipeline> {
        if texts.len() != labels.len() {
            return Err(ComplaintError::dimension_mismatch(
                "labels",
                texts.len(),
                labels.len(),
            ));
        }
        if texts.is_empty() {
            return Err(ComplaintError::empty_input("cannot fit on zero documents"));
        }

        let cleaned = self.normalizer.normalize_many(texts);
        tracing::info!(documents = cleaned.len(), "normalized training narratives");

        let (features, matrix) = self.config.vectorizer().fit_transform(&cleaned)?;

        let classifier = self.config.classifier().fit(&matrix, labels)?;
        tracing::info!(
            iterations = classifier.iterations(),
            converged = classifier.converged(),
            "trained loss classifier"
        );

        let severity = match severity {
            Some(levels) if self.config.classifier.severity => {
                Some(self.fit_severity(&matrix, levels)?)
            }
            _ => None,
        };

        let positives = labels.iter().filter(|&&l| l == 1).count();
        #[allow(clippy::cast_precision_loss)]
        let positive_rate = positives as f64 / labels.len() as f64;
        let artifact = PipelineArtifact {
            fingerprint: self.normalizer.fingerprint(),
            config: self.config.clone(),
            features,
            classifier,
            severity,
            positive_rate,
            n_train: labels.len(),
        };

        Ok(FittedPipeline {
            normalizer: self.normalizer.clone(),
            artifact,
        })
    }

    fn fit_severity(&self, matrix: &[FeatureVector], levels: &[usize]) -> Result<SeverityHead> {
        let model = self
            .config
            .classifier()
            .fit_one_vs_rest(matrix, levels, N_SEVERITY_CLASSES)?;

        let mut counts = [0usize; N_SEVERITY_CLASSES];
        for &level in levels {
            if let Some(count) = counts.get_mut(level) {
                *count += 1;
            }
        }
        // First maximum wins, so ties go to the milder severity.
        let mut default_severity = 0;
        for (level, &count) in counts.iter().enumerate() {
            if count > counts[default_severity] {
                default_severity = level;
            }
        }

        tracing::info!(classes = ?model.classes(), "trained severity head");
        Ok(SeverityHead {
            model,
            default_severity: u8::try_from(default_severity).unwrap_or(0),
        })
    }
}

/// A fitted pipeline ready to serve predictions.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    normalizer: TextNormalizer,
    artifact: PipelineArtifact,
}

impl FittedPipeline {
    /// Pair an artifact with the normalizer that will clean serving text.
    ///
    /// # Errors
    ///
    /// Returns [`ComplaintError::FingerprintMismatch`] when the normalizer
    /// differs from the one the artifact was fitted with, or a format error
    /// for an inconsistent artifact.
    pub fn from_artifact(artifact: PipelineArtifact, normalizer: TextNormalizer) -> Result<Self> {
        artifact.validate()?;
        let runtime = normalizer.fingerprint();
        if artifact.fingerprint != runtime {
            return Err(ComplaintError::FingerprintMismatch {
                artifact: artifact.fingerprint,
                runtime,
            });
        }
        Ok(Self {
            normalizer,
            artifact,
        })
    }

    /// Load an artifact with the bundled normalizer, one batch worker per
    /// CPU of the serving host. The worker count recorded at training time
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Any I/O, format, version, checksum or fingerprint error. All are
    /// fatal for a serving process.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_workers(path, None)
    }

    /// Load an artifact with the bundled normalizer and a fixed batch worker
    /// count (`None` = CPU count).
    ///
    /// # Errors
    ///
    /// See [`FittedPipeline::load`]; also fails for `Some(0)` workers.
    pub fn load_with_workers<P: AsRef<Path>>(path: P, workers: Option<usize>) -> Result<Self> {
        let artifact: PipelineArtifact = serialization::load(path)?;
        let normalizer = TextNormalizer::with_workers(workers)?;
        Self::from_artifact(artifact, normalizer)
    }

    /// Load an artifact to serve with a custom normalizer.
    ///
    /// # Errors
    ///
    /// See [`FittedPipeline::load`].
    pub fn load_with_normalizer<P: AsRef<Path>>(path: P, normalizer: TextNormalizer) -> Result<Self> {
        let artifact: PipelineArtifact = serialization::load(path)?;
        Self::from_artifact(artifact, normalizer)
    }

    /// Write the artifact to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save(&self.artifact, path)
    }

    /// The fitted state.
    #[must_use]
    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    /// The serving normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Label for featureless documents.
    #[must_use]
    pub fn default_label(&self) -> LossLabel {
        self.artifact.default_label()
    }

    /// Whether a severity head was fitted.
    #[must_use]
    pub fn has_severity(&self) -> bool {
        self.artifact.severity.is_some()
    }

    /// Project already-cleaned text onto the frozen vocabulary.
    #[must_use]
    pub fn features(&self, cleaned: &str) -> FeatureVector {
        self.artifact.features.transform(cleaned)
    }

    fn predict_features(&self, features: &FeatureVector) -> Prediction {
        if features.is_zero() {
            return self.artifact.default_prediction();
        }
        self.artifact.classifier.predict_labeled(features)
    }

    fn severity_features(&self, features: &FeatureVector) -> Option<u8> {
        let head = self.artifact.severity.as_ref()?;
        if features.is_zero() {
            return Some(head.default_severity);
        }
        Some(u8::try_from(head.model.predict(features)).unwrap_or(head.default_severity))
    }

    /// Classify one narrative.
    #[must_use]
    pub fn predict_one(&self, text: &str) -> Prediction {
        let cleaned = self.normalizer.normalize(text);
        self.predict_features(&self.features(&cleaned))
    }

    /// Classify many narratives; results align with the input and equal
    /// what [`FittedPipeline::predict_one`] gives for each.
    #[must_use]
    pub fn predict_many<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<Prediction> {
        self.normalizer
            .normalize_many(texts)
            .iter()
            .map(|cleaned| self.predict_features(&self.features(cleaned)))
            .collect()
    }

    /// Severity (0, 1 or 2) of one narrative, if a severity head was fitted.
    #[must_use]
    pub fn predict_severity_one(&self, text: &str) -> Option<u8> {
        self.artifact.severity.as_ref()?;
        let cleaned = self.normalizer.normalize(text);
        self.severity_features(&self.features(&cleaned))
    }

    /// Severities of many narratives, if a severity head was fitted.
    #[must_use]
    pub fn predict_severity_many<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Option<Vec<u8>> {
        self.artifact.severity.as_ref()?;
        self.normalizer
            .normalize_many(texts)
            .iter()
            .map(|cleaned| self.severity_features(&self.features(cleaned)))
            .collect()
    }

    /// Classify many narratives with both heads from one cleaning pass.
    /// The severities are `None` when no severity head was fitted.
    #[must_use]
    pub fn predict_many_with_severity<S: AsRef<str> + Sync>(
        &self,
        texts: &[S],
    ) -> (Vec<Prediction>, Option<Vec<u8>>) {
        let features: Vec<FeatureVector> = self
            .normalizer
            .normalize_many(texts)
            .iter()
            .map(|cleaned| self.features(cleaned))
            .collect();
        let predictions = features.iter().map(|f| self.predict_features(f)).collect();
        let severities = self
            .artifact
            .severity
            .as_ref()
            .and_then(|_| features.iter().map(|f| self.severity_features(f)).collect());
        (predictions, severities)
    }

    /// Score identifier/narrative rows, echoing each identifier unchanged.
    #[must_use]
    pub fn score_rows(&self, rows: &[ScoringRow]) -> Vec<ScoredRow> {
        let narratives: Vec<&str> = rows.iter().map(|r| r.narrative.as_str()).collect();
        let predictions = self.predict_many(&narratives);
        tracing::debug!(rows = rows.len(), "scored rows");
        rows.iter()
            .zip(predictions)
            .map(|(row, prediction)| ScoredRow {
                id: row.id.clone(),
                prediction,
            })
            .collect()
    }
}
