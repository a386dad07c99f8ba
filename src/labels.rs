//! Loss labels derived from company response codes.
//!
//! The response a company gives to a complaint decides whether the consumer
//! got money back. Only "Closed with monetary relief" counts as a loss for
//! the binary task; the multiclass severity keeps the non-monetary relief
//! tier apart from plain closures.
//!
//! | response code                   | severity | binary |
//! |---------------------------------|---------:|-------:|
//! | Closed with explanation         | 0 | 0 |
//! | Closed with non-monetary relief | 0 | 0 |
//! | Closed without relief           | 0 | 0 |
//! | Closed                          | 0 | 0 |
//! | Untimely response               | 0 | 0 |
//! | Closed with relief              | 1 | 0 |
//! | Closed with monetary relief     | 2 | 1 |
//! | In progress                     | 3 | excluded |
//!
//! # Examples
//!
//! ```
//! use complaint_loss::labels::{derive, LabelOutcome, LossLabels};
//!
//! assert_eq!(
//!     derive("Closed with monetary relief"),
//!     LabelOutcome::Labeled(LossLabels { binary: 1, severity: 2 })
//! );
//! assert!(derive("In progress").is_excluded());
//! assert!(derive("unknown-code").is_excluded());
//! ```

use crate::data::ComplaintRecord;
use serde::{Deserialize, Serialize};

/// Severity code reserved for complaints still being handled.
pub const IN_PROGRESS_SEVERITY: u8 = 3;

/// Response code of an unresolved complaint.
pub const IN_PROGRESS_CODE: &str = "In progress";

/// The closed mapping from response code to severity.
const RESPONSE_SEVERITY: &[(&str, u8)] = &[
    ("Closed with explanation", 0),
    ("Closed with non-monetary relief", 0),
    ("Closed without relief", 0),
    ("Closed", 0),
    ("Untimely response", 0),
    ("Closed with relief", 1),
    ("Closed with monetary relief", 2),
    (IN_PROGRESS_CODE, IN_PROGRESS_SEVERITY),
];

/// Number of trainable severity classes (0, 1, 2).
pub const N_SEVERITY_CLASSES: usize = 3;

/// Binary and multiclass labels of one terminal complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LossLabels {
    /// 1 when the complaint closed with monetary relief
    pub binary: u8,
    /// 0 (no relief), 1 (relief), 2 (monetary relief)
    pub severity: u8,
}

/// Binary decision returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossLabel {
    /// Class 0
    Low,
    /// Class 1
    Likely,
}

impl LossLabel {
    /// Build from a 0/1 class index; anything non-zero is a loss.
    #[must_use]
    pub fn from_class(class: usize) -> Self {
        if class == 0 {
            Self::Low
        } else {
            Self::Likely
        }
    }

    /// Class index (0 or 1).
    #[must_use]
    pub fn class(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Likely => 1,
        }
    }

    /// Wire code: `"0"` or `"1"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "0",
            Self::Likely => "1",
        }
    }

    /// Human-readable meaning shown next to predictions.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Low => "Low probability of monetary loss",
            Self::Likely => "Likely causing monetary loss",
        }
    }
}

impl std::fmt::Display for LossLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Why a record was left out of a training set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The complaint has not reached a terminal state.
    InProgress,
    /// The response code is outside the known mapping.
    Unknown(String),
}

/// Result of deriving labels for one response code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// The code maps to trainable labels.
    Labeled(LossLabels),
    /// The record must not be used for training.
    Excluded(Exclusion),
}

impl LabelOutcome {
    /// True when the record is dropped from training.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded(_))
    }

    /// The labels, if any.
    #[must_use]
    pub fn labels(&self) -> Option<LossLabels> {
        match self {
            Self::Labeled(labels) => Some(*labels),
            Self::Excluded(_) => None,
        }
    }
}

/// Look up the raw severity code, including the in-progress sentinel.
#[must_use]
pub fn severity_code(response_code: &str) -> Option<u8> {
    let code = response_code.trim();
    RESPONSE_SEVERITY
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, severity)| *severity)
}

/// Derive loss labels from a response code.
///
/// Unknown codes are excluded rather than rejected: derivation narrows the
/// training set and never fails.
#[must_use]
pub fn derive(response_code: &str) -> LabelOutcome {
    match severity_code(response_code) {
        Some(IN_PROGRESS_SEVERITY) => LabelOutcome::Excluded(Exclusion::InProgress),
        Some(severity) => LabelOutcome::Labeled(LossLabels {
            binary: u8::from(severity == 2),
            severity,
        }),
        None => LabelOutcome::Excluded(Exclusion::Unknown(response_code.trim().to_string())),
    }
}

/// Counts of a batch derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivationReport {
    /// Records that received labels
    pub labeled: usize,
    /// Records dropped as in progress
    pub in_progress: usize,
    /// Records dropped for an unmapped response code
    pub unknown: usize,
    /// Labeled records with binary label 1
    pub positives: usize,
}

impl DerivationReport {
    /// Total records seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.labeled + self.in_progress + self.unknown
    }

    /// Total records dropped.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.in_progress + self.unknown
    }
}

/// Derive labels for many records, keeping the labeled ones in input order.
///
/// Exclusions are counted in the returned report and logged; they never
/// abort the batch.
pub fn derive_records(records: &[ComplaintRecord]) -> (Vec<(&ComplaintRecord, LossLabels)>, DerivationReport) {
    let mut report = DerivationReport::default();
    let mut labeled = Vec::with_capacity(records.len());

    for record in records {
        match derive(&record.response_code) {
            LabelOutcome::Labeled(labels) => {
                report.labeled += 1;
                report.positives += usize::from(labels.binary);
                labeled.push((record, labels));
            }
            LabelOutcome::Excluded(Exclusion::InProgress) => report.in_progress += 1,
            LabelOutcome::Excluded(Exclusion::Unknown(code)) => {
                tracing::debug!(complaint_id = %record.complaint_id, code = %code, "unmapped response code");
                report.unknown += 1;
            }
        }
    }

    if report.excluded() > 0 {
        tracing::warn!(
            in_progress = report.in_progress,
            unknown = report.unknown,
            "records excluded from training"
        );
    }
    tracing::info!(
        labeled = report.labeled,
        positives = report.positives,
        total = report.total(),
        "derived loss labels"
    );

    (labeled, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, code: &str) -> ComplaintRecord {
        ComplaintRecord::new(id, "narrative text", code)
    }

    #[test]
    fn test_monetary_relief_is_loss() {
        assert_eq!(
            derive("Closed with monetary relief"),
            LabelOutcome::Labeled(LossLabels {
                binary: 1,
                severity: 2
            })
        );
    }

    #[test]
    fn test_relief_is_not_binary_loss() {
        let labels = derive("Closed with relief").labels().expect("mapped code");
        assert_eq!(labels.binary, 0);
        assert_eq!(labels.severity, 1);
    }

    #[test]
    fn test_plain_closures_are_zero() {
        for code in [
            "Closed with explanation",
            "Closed with non-monetary relief",
            "Closed without relief",
            "Closed",
            "Untimely response",
        ] {
            assert_eq!(
                derive(code).labels(),
                Some(LossLabels {
                    binary: 0,
                    severity: 0
                }),
                "{code}"
            );
        }
    }

    #[test]
    fn test_in_progress_excluded() {
        assert_eq!(derive("In progress"), LabelOutcome::Excluded(Exclusion::InProgress));
        assert_eq!(severity_code("In progress"), Some(IN_PROGRESS_SEVERITY));
    }

    #[test]
    fn test_unknown_excluded_not_error() {
        assert_eq!(
            derive("unknown-code"),
            LabelOutcome::Excluded(Exclusion::Unknown("unknown-code".to_string()))
        );
        assert!(derive("").is_excluded());
    }

    #[test]
    fn test_matching_is_case_sensitive_but_trimmed() {
        assert!(!derive("  Closed  ").is_excluded());
        assert!(derive("closed").is_excluded());
    }

    #[test]
    fn test_loss_label_codes() {
        assert_eq!(LossLabel::from_class(0), LossLabel::Low);
        assert_eq!(LossLabel::from_class(1), LossLabel::Likely);
        assert_eq!(LossLabel::Likely.code(), "1");
        assert_eq!(LossLabel::Low.to_string(), "0");
        assert_eq!(LossLabel::Low.description(), "Low probability of monetary loss");
        assert_eq!(LossLabel::Likely.class(), 1);
    }

    #[test]
    fn test_derive_records_counts_and_order() {
        let records = vec![
            record("1", "Closed with monetary relief"),
            record("2", "In progress"),
            record("3", "Closed with explanation"),
            record("4", "Escalated"),
            record("5", "Closed with relief"),
        ];
        let (labeled, report) = derive_records(&records);

        let ids: Vec<&str> = labeled.iter().map(|(r, _)| r.complaint_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
        assert_eq!(
            report,
            DerivationReport {
                labeled: 3,
                in_progress: 1,
                unknown: 1,
                positives: 1
            }
        );
        assert_eq!(report.total(), 5);
        assert_eq!(report.excluded(), 2);
    }
}
