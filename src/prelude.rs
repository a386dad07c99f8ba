//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use complaint_loss::prelude::*;
//! ```

pub use crate::classification::{ClassWeight, LogisticRegression, Prediction};
pub use crate::config::PipelineConfig;
pub use crate::data::{ComplaintRecord, ScoredRow, ScoringRow};
pub use crate::error::{ComplaintError, Result};
pub use crate::labels::{derive, DerivationReport, LabelOutcome, LossLabel, LossLabels};
pub use crate::pipeline::{ComplaintPipeline, FittedPipeline, PipelineArtifact};
pub use crate::text::normalize::TextNormalizer;
pub use crate::text::vectorize::{FeatureVector, TfidfModel, TfidfVectorizer};
