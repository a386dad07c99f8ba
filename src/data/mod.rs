//! Complaint records and the tabular input they are read from.
//!
//! A [`ComplaintRecord`] is one row of the complaint table. Records are
//! immutable once read; labels are derived from them (see [`crate::labels`])
//! rather than stored.

mod table;

pub use table::{
    read_records, read_records_path, read_scoring_rows, read_scoring_rows_path, write_scored,
    Column, ScoredRow, ScoringRow, ScoringTable,
};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date layouts accepted for `received_date`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// One consumer complaint.
///
/// # Examples
///
/// ```
/// use complaint_loss::data::{parse_date, ComplaintRecord};
///
/// let record = ComplaintRecord::new("3199379", "I was charged twice.", "Closed with monetary relief")
///     .with_received_date(parse_date("2019-03-14"))
///     .with_state("CA");
/// assert_eq!(record.year(), Some(2019));
/// assert_eq!(record.weekday(), Some(3)); // Thursday, Monday = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    /// Stable identifier, round-tripped into scored output
    pub complaint_id: String,
    /// Consumer-written narrative
    pub narrative: String,
    /// Date the complaint was received
    pub received_date: Option<NaiveDate>,
    /// Two-letter state code
    pub state: Option<String>,
    /// Company response to the consumer
    pub response_code: String,
}

impl ComplaintRecord {
    /// Create a record with the fields needed for training.
    pub fn new(
        complaint_id: impl Into<String>,
        narrative: impl Into<String>,
        response_code: impl Into<String>,
    ) -> Self {
        Self {
            complaint_id: complaint_id.into(),
            narrative: narrative.into(),
            received_date: None,
            state: None,
            response_code: response_code.into(),
        }
    }

    /// Set the received date.
    #[must_use]
    pub fn with_received_date(mut self, date: Option<NaiveDate>) -> Self {
        self.received_date = date;
        self
    }

    /// Set the state code.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Year the complaint was received.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.received_date.map(|d| d.year())
    }

    /// Month the complaint was received (1-12).
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        self.received_date.map(|d| d.month())
    }

    /// Weekday the complaint was received, Monday = 0.
    #[must_use]
    pub fn weekday(&self) -> Option<u32> {
        self.received_date
            .map(|d| d.weekday().num_days_from_monday())
    }
}

/// Parse a received date in `YYYY-MM-DD` or `MM/DD/YYYY` form.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
