//! Error types for complaint classification.
//!
//! Cleaning, feature projection and scoring never fail; errors come from
//! reading input tables, fitting, and loading artifacts.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for complaint-loss operations.
///
/// # Examples
///
/// ```
/// use complaint_loss::error::ComplaintError;
///
/// let err = ComplaintError::MissingColumn {
///     column: "narrative".to_string(),
///     available: vec!["id".to_string()],
/// };
/// assert!(err.to_string().contains("narrative"));
/// ```
#[derive(Debug, Error)]
pub enum ComplaintError {
    /// A required column is absent from an input table.
    #[error("missing column '{column}' (available: {available:?})")]
    MissingColumn {
        /// Column that was looked up
        column: String,
        /// Header names actually present
        available: Vec<String>,
    },

    /// CSV parsing failed.
    #[error("CSV error at line {line}: {message}")]
    Csv {
        /// 1-based line number (header is line 1)
        line: u64,
        /// Parser message
        message: String,
    },

    /// A row could not be turned into a complaint record.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord {
        /// Complaint identifier (or row number when absent)
        id: String,
        /// What was wrong
        reason: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fitting was asked to run on nothing.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Lengths of paired inputs disagree.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size description
        expected: String,
        /// Actual size found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// No n-gram survived the document-frequency thresholds.
    #[error("empty vocabulary: no terms within document-frequency bounds (min_df={min_df}, max_df={max_df})")]
    EmptyVocabulary {
        /// Minimum document count
        min_df: usize,
        /// Maximum document fraction
        max_df: f64,
    },

    /// Artifact (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid or corrupt artifact.
    #[error("invalid artifact format: {message}")]
    FormatError {
        /// Error description
        message: String,
    },

    /// Artifact written by an incompatible format revision.
    #[error("unsupported artifact version: found {}.{}, max supported {}.{}", .found.0, .found.1, .supported.0, .supported.1)]
    UnsupportedVersion {
        /// Version found
        found: (u8, u8),
        /// Maximum supported version
        supported: (u8, u8),
    },

    /// Artifact checksum verification failed.
    #[error("checksum mismatch: expected 0x{expected:08X}, got 0x{actual:08X}")]
    ChecksumMismatch {
        /// Stored checksum
        expected: u32,
        /// Computed checksum
        actual: u32,
    },

    /// The artifact was fitted with different cleaning logic.
    #[error("normalizer fingerprint mismatch: artifact 0x{artifact:08X}, runtime 0x{runtime:08X}")]
    FingerprintMismatch {
        /// Fingerprint stored in the artifact
        artifact: u32,
        /// Fingerprint of the running normalizer
        runtime: u32,
    },

    /// A cleaning pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// Configuration file could not be read or parsed.
    #[error("config error in {}: {message}", .path.display())]
    Config {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

impl ComplaintError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput(context.to_string())
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// True for errors caused by the caller's input table rather than the
    /// process state.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::Csv { .. } | Self::InvalidRecord { .. } | Self::Io(_)
        )
    }
}

impl From<bincode::Error> for ComplaintError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ComplaintError>;
