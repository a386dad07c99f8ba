//! Complaint-loss: monetary-loss classification for consumer financial
//! complaints.
//!
//! A complaint narrative is cleaned (entities, redaction placeholders,
//! digits, punctuation and stop words removed, verbs lemmatized), projected
//! onto a frozen n-gram TF-IDF vocabulary, and scored by a class-balanced
//! logistic regression. The fitted state travels as one versioned,
//! checksummed artifact.
//!
//! # Quick Start
//!
//! ```
//! use complaint_loss::prelude::*;
//!
//! let texts = [
//!     "overdraft fee charged twice refund denied",
//!     "refund overdraft fee charged again",
//!     "fee charged twice without refund",
//!     "letter explained account policy clearly",
//!     "account policy letter received",
//!     "received letter explaining policy",
//! ];
//! let labels = [1, 1, 1, 0, 0, 0];
//!
//! let config = PipelineConfig::new().with_df_bounds(2, 1.0).with_workers(Some(2));
//! let fitted = ComplaintPipeline::new(config)?.fit(&texts, &labels)?;
//!
//! let prediction = fitted.predict_one("They charged an overdraft fee and refused a refund.");
//! assert_eq!(prediction.label, LossLabel::Likely);
//! assert_eq!(prediction.label.description(), "Likely causing monetary loss");
//! # Ok::<(), ComplaintError>(())
//! ```
//!
//! # Modules
//!
//! - [`labels`]: Loss labels derived from company response codes
//! - [`data`]: Complaint records and CSV tables
//! - [`text`]: Narrative cleaning, entity scrubbing, lemmatization, TF-IDF
//! - [`classification`]: Balanced logistic regression and the severity head
//! - [`pipeline`]: Fit/predict orchestration over one artifact
//! - [`serialization`]: Versioned, checksummed artifact container
//! - [`parallel`]: Ordered parallel map on a fixed worker pool
//! - [`config`]: TOML pipeline configuration

pub mod classification;
pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod parallel;
pub mod pipeline;
pub mod prelude;
pub mod serialization;
pub mod text;

pub use error::{ComplaintError, Result};
pub use pipeline::{ComplaintPipeline, FittedPipeline, PipelineArtifact};
