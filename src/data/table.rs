//! CSV reading and writing for complaint tables.
//!
//! Column lookup accepts the short canonical names as well as the headers
//! of the public complaint dataset, compared case-insensitively.

use super::{parse_date, ComplaintRecord};
use crate::classification::Prediction;
use crate::error::{ComplaintError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// A logical column and the header names it may appear under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Free-text narrative
    Narrative,
    /// Complaint identifier
    ComplaintId,
    /// Date received
    ReceivedDate,
    /// State code
    State,
    /// Company response to consumer
    ResponseCode,
}

impl Column {
    /// Canonical header name.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::ComplaintId => "complaint_id",
            Self::ReceivedDate => "received_date",
            Self::State => "state",
            Self::ResponseCode => "response_code",
        }
    }

    /// Accepted header names, canonical first.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Narrative => &["narrative", "Consumer complaint narrative"],
            Self::ComplaintId => &["complaint_id", "Complaint ID", "id"],
            Self::ReceivedDate => &["received_date", "Date received"],
            Self::State => &["state"],
            Self::ResponseCode => &["response_code", "Company response to consumer"],
        }
    }
}

/// Position of a column in a header row, by explicit name or by alias.
fn find_column(headers: &csv::StringRecord, column: Column, explicit: Option<&str>) -> Option<usize> {
    let matches = |header: &str, name: &str| header.trim().eq_ignore_ascii_case(name);
    match explicit {
        Some(name) => headers.iter().position(|h| matches(h, name)),
        None => column
            .aliases()
            .iter()
            .find_map(|alias| headers.iter().position(|h| matches(h, alias))),
    }
}

fn require_column(headers: &csv::StringRecord, column: Column, explicit: Option<&str>) -> Result<usize> {
    find_column(headers, column, explicit).ok_or_else(|| ComplaintError::MissingColumn {
        column: explicit.unwrap_or(column.canonical()).to_string(),
        available: headers.iter().map(ToString::to_string).collect(),
    })
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<csv::StringRecord> {
    reader
        .headers()
        .map(Clone::clone)
        .map_err(|e| ComplaintError::Csv {
            line: 1,
            message: format!("failed to read headers: {e}"),
        })
}

fn csv_error(line: u64, err: &csv::Error) -> ComplaintError {
    ComplaintError::Csv {
        line: err.position().map_or(line, csv::Position::line),
        message: err.to_string(),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(ComplaintError::from)
}

/// Read complaint records for training.
///
/// Requires a narrative and a response-code column. The identifier falls
/// back to the 1-based row number when the table has no id column; date and
/// state are optional. A non-empty date that does not parse is rejected.
///
/// # Errors
///
/// Returns an input error for missing columns, malformed CSV, or
/// unparseable dates.
pub fn read_records<R: Read>(input: R) -> Result<Vec<ComplaintRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = read_headers(&mut reader)?;

    let narrative_idx = require_column(&headers, Column::Narrative, None)?;
    let response_idx = require_column(&headers, Column::ResponseCode, None)?;
    let id_idx = find_column(&headers, Column::ComplaintId, None);
    let date_idx = find_column(&headers, Column::ReceivedDate, None);
    let state_idx = find_column(&headers, Column::State, None);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row as u64 + 2;
        let row_record = result.map_err(|e| csv_error(line, &e))?;
        let field = |idx: Option<usize>| idx.and_then(|i| row_record.get(i)).unwrap_or("");

        let complaint_id = match field(id_idx).trim() {
            "" => (row + 1).to_string(),
            id => id.to_string(),
        };

        let raw_date = field(date_idx).trim();
        let received_date = if raw_date.is_empty() {
            None
        } else {
            Some(parse_date(raw_date).ok_or_else(|| ComplaintError::InvalidRecord {
                id: complaint_id.clone(),
                reason: format!("unrecognized date '{raw_date}'"),
            })?)
        };

        let mut record = ComplaintRecord::new(
            complaint_id,
            field(Some(narrative_idx)),
            field(Some(response_idx)),
        )
        .with_received_date(received_date);

        let state = field(state_idx).trim();
        if !state.is_empty() {
            record = record.with_state(state);
        }
        records.push(record);
    }

    tracing::debug!(rows = records.len(), "read complaint records");
    Ok(records)
}

/// Read complaint records from a CSV file.
///
/// # Errors
///
/// See [`read_records`]; also fails if the file cannot be opened.
pub fn read_records_path<P: AsRef<Path>>(path: P) -> Result<Vec<ComplaintRecord>> {
    read_records(open(path.as_ref())?)
}

/// One narrative to score, with the identifier to echo back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRow {
    /// Identifier exactly as it appeared in the input
    pub id: String,
    /// Narrative text
    pub narrative: String,
}

/// Rows to score plus the header name of their identifier column.
#[derive(Debug, Clone)]
pub struct ScoringTable {
    /// Identifier header, reused in the output table
    pub id_header: String,
    /// Rows in input order
    pub rows: Vec<ScoringRow>,
}

/// A scored row: the input identifier and its prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    /// Identifier copied from the input
    pub id: String,
    /// Model output
    pub prediction: Prediction,
}

/// Read a table for batch scoring.
///
/// Identifiers are kept byte-for-byte (no trimming). Empty narratives are
/// kept and score to the default label.
///
/// # Errors
///
/// Returns [`ComplaintError::MissingColumn`] when the narrative or id
/// column cannot be found, or a CSV error for malformed rows.
pub fn read_scoring_rows<R: Read>(
    input: R,
    narrative_column: Option<&str>,
    id_column: Option<&str>,
) -> Result<ScoringTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = read_headers(&mut reader)?;

    let narrative_idx = require_column(&headers, Column::Narrative, narrative_column)?;
    let id_idx = require_column(&headers, Column::ComplaintId, id_column)?;
    let id_header = headers.get(id_idx).unwrap_or(Column::ComplaintId.canonical()).to_string();

    let mut rows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(row as u64 + 2, &e))?;
        rows.push(ScoringRow {
            id: record.get(id_idx).unwrap_or("").to_string(),
            narrative: record.get(narrative_idx).unwrap_or("").to_string(),
        });
    }

    Ok(ScoringTable { id_header, rows })
}

/// Read a scoring table from a CSV file.
///
/// # Errors
///
/// See [`read_scoring_rows`]; also fails if the file cannot be opened.
pub fn read_scoring_rows_path<P: AsRef<Path>>(
    path: P,
    narrative_column: Option<&str>,
    id_column: Option<&str>,
) -> Result<ScoringTable> {
    read_scoring_rows(open(path.as_ref())?, narrative_column, id_column)
}

/// Write scored rows as CSV: `<id header>,prediction,description,probability`.
///
/// # Errors
///
/// Fails when the writer fails.
pub fn write_scored<W: Write>(output: W, id_header: &str, rows: &[ScoredRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    let to_err = |e: csv::Error| ComplaintError::Csv {
        line: 0,
        message: e.to_string(),
    };

    writer
        .write_record([id_header, "prediction", "description", "probability"])
        .map_err(to_err)?;
    for row in rows {
        let probability = format!("{:.6}", row.prediction.probability);
        writer
            .write_record([
                row.id.as_str(),
                row.prediction.label.code(),
                row.prediction.label.description(),
                probability.as_str(),
            ])
            .map_err(to_err)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LossLabel;

    const PUBLIC_HEADERS: &str = "Date received,Product,Consumer complaint narrative,Company response to consumer,State,Complaint ID\n";

    #[test]
    fn test_read_records_public_headers() {
        let csv = format!(
            "{PUBLIC_HEADERS}\
             2019-05-02,Mortgage,I was charged a fee,Closed with monetary relief,TX,101\n\
             05/03/2019,Checking,They ignored me,In progress,,102\n"
        );
        let records = read_records(csv.as_bytes()).expect("valid table");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].complaint_id, "101");
        assert_eq!(records[0].narrative, "I was charged a fee");
        assert_eq!(records[0].response_code, "Closed with monetary relief");
        assert_eq!(records[0].state.as_deref(), Some("TX"));
        assert_eq!(records[1].state, None);
        assert_eq!(records[1].month(), Some(5));
    }

    #[test]
    fn test_read_records_row_number_fallback_id() {
        let csv = "narrative,response_code\nfirst,Closed\nsecond,Closed\n";
        let records = read_records(csv.as_bytes()).expect("valid table");
        assert_eq!(records[0].complaint_id, "1");
        assert_eq!(records[1].complaint_id, "2");
    }

    #[test]
    fn test_read_records_missing_narrative_column() {
        let csv = "complaint_id,response_code\n1,Closed\n";
        let err = read_records(csv.as_bytes()).expect_err("no narrative column");
        match err {
            ComplaintError::MissingColumn { column, available } => {
                assert_eq!(column, "narrative");
                assert_eq!(available, vec!["complaint_id", "response_code"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_records_bad_date_rejected() {
        let csv = "complaint_id,narrative,response_code,received_date\n7,text,Closed,yesterday\n";
        let err = read_records(csv.as_bytes()).expect_err("bad date");
        assert!(matches!(err, ComplaintError::InvalidRecord { ref id, .. } if id == "7"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_read_scoring_rows_explicit_columns() {
        let csv = "ticket,body\n A ,first\nB,\n";
        let table = read_scoring_rows(csv.as_bytes(), Some("body"), Some("ticket")).expect("valid");
        assert_eq!(table.id_header, "ticket");
        assert_eq!(table.rows[0].id, " A ");
        assert_eq!(table.rows[1].narrative, "");
    }

    #[test]
    fn test_read_scoring_rows_requires_id() {
        let csv = "narrative\nhello\n";
        let err = read_scoring_rows(csv.as_bytes(), None, None).expect_err("no id column");
        assert!(matches!(err, ComplaintError::MissingColumn { ref column, .. } if column == "complaint_id"));
    }

    #[test]
    fn test_write_scored_round_trips_ids() {
        let rows = vec![
            ScoredRow {
                id: "A".to_string(),
                prediction: Prediction {
                    label: LossLabel::Likely,
                    probability: 0.875,
                },
            },
            ScoredRow {
                id: "B,2".to_string(),
                prediction: Prediction {
                    label: LossLabel::Low,
                    probability: 0.125,
                },
            },
        ];
        let mut out = Vec::new();
        write_scored(&mut out, "Complaint ID", &rows).expect("write");

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(headers.get(0), Some("Complaint ID"));
        let back: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
        assert_eq!(back[0].get(0), Some("A"));
        assert_eq!(back[0].get(1), Some("1"));
        assert_eq!(back[0].get(2), Some("Likely causing monetary loss"));
        assert_eq!(back[1].get(0), Some("B,2"));
        assert_eq!(back[1].get(3), Some("0.125000"));
    }
}
