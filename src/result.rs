// Result Cursor
// One concrete result type shared by every driver and the mocking layer.
// Drivers fully materialize the client's native result before constructing
// this, so no native handle outlives the execute call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error code value meaning "no error occurred".
pub const NO_ERROR: i64 = -1;

/// A single cell value in a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(String),
    Binary(Vec<u8>),
}

/// The two shapes a statement outcome can take: a tabular row set or a
/// bare acknowledgement for statements that return none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ResultData {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    },
    Ack(bool),
}

/// Uniform read interface over a statement's outcome.
///
/// Row-shaped results carry an internal 0-based cursor advanced by the
/// fetch methods; exhaustion is signaled with `None`, never an error.
/// Execution errors reported by the underlying client live in
/// `error_code`/`error_message` rather than failing `execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    data: ResultData,
    position: usize,
    affected_rows: u64,
    insert_id: u64,
    error_code: i64,
    error_message: Option<String>,
    query: Option<String>,
}

impl QueryResult {
    /// A tabular result. Every row must have one value per column.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(ResultData::Rows { columns, rows })
    }

    /// An acknowledgement result for non-SELECT statements.
    pub fn ack(success: bool) -> Self {
        Self::new(ResultData::Ack(success))
    }

    fn new(data: ResultData) -> Self {
        Self {
            data,
            position: 0,
            affected_rows: 0,
            insert_id: 0,
            error_code: NO_ERROR,
            error_message: None,
            query: None,
        }
    }

    pub fn with_affected_rows(mut self, affected_rows: u64) -> Self {
        self.affected_rows = affected_rows;
        self
    }

    pub fn with_insert_id(mut self, insert_id: u64) -> Self {
        self.insert_id = insert_id;
        self
    }

    /// Records the client-reported error. Some clients use 0 ambiguously
    /// for "no error", so 0 is normalized to the `NO_ERROR` sentinel.
    /// Empty messages are treated as absent.
    pub fn with_error(mut self, error_code: i64, error_message: Option<String>) -> Self {
        self.error_code = if error_code == 0 { NO_ERROR } else { error_code };
        self.error_message = error_message.filter(|message| !message.is_empty());
        self
    }

    /// Attaches the SQL text that produced this result.
    pub fn with_query(mut self, query: String) -> Self {
        self.query = Some(query);
        self
    }

    /// True for any row-shaped result; the acknowledged boolean otherwise.
    pub fn success(&self) -> bool {
        match &self.data {
            ResultData::Rows { .. } => true,
            ResultData::Ack(success) => *success,
        }
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn insert_id(&self) -> u64 {
        self.insert_id
    }

    /// Number of rows in the result set; 0 for acknowledgements.
    pub fn num_rows(&self) -> usize {
        match &self.data {
            ResultData::Rows { rows, .. } => rows.len(),
            ResultData::Ack(_) => 0,
        }
    }

    /// Column names of the result set, in select order.
    pub fn columns(&self) -> &[String] {
        match &self.data {
            ResultData::Rows { columns, .. } => columns,
            ResultData::Ack(_) => &[],
        }
    }

    /// Moves the cursor to `offset`. Returns false without moving the
    /// cursor when the offset is out of `[0, num_rows)` or the result is
    /// not row-shaped.
    pub fn seek(&mut self, offset: usize) -> bool {
        match &self.data {
            ResultData::Rows { rows, .. } if offset < rows.len() => {
                self.position = offset;
                true
            }
            _ => false,
        }
    }

    /// Returns the next row's values in column order and advances the
    /// cursor. `None` means the result is exhausted or not row-shaped.
    pub fn fetch_row(&mut self) -> Option<Vec<CellValue>> {
        match &self.data {
            ResultData::Rows { rows, .. } => {
                let row = rows.get(self.position)?.clone();
                self.position += 1;
                Some(row)
            }
            ResultData::Ack(_) => None,
        }
    }

    /// Returns the next row keyed by column name and advances the cursor.
    pub fn fetch_assoc(&mut self) -> Option<HashMap<String, CellValue>> {
        match &self.data {
            ResultData::Rows { columns, rows } => {
                let row = rows.get(self.position)?;
                let assoc = columns.iter().cloned().zip(row.iter().cloned()).collect();
                self.position += 1;
                Some(assoc)
            }
            ResultData::Ack(_) => None,
        }
    }

    /// The client's error code, or `NO_ERROR` when the statement succeeded.
    pub fn error_code(&self) -> i64 {
        self.error_code
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The SQL text that was executed to obtain this result, when a driver
    /// produced it. Mock results have no SQL text.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult::rows(
            vec!["user_id".to_string(), "user_name".to_string()],
            vec![
                vec![CellValue::Int(1), CellValue::String("a".to_string())],
                vec![CellValue::Int(2), CellValue::String("b".to_string())],
            ],
        )
    }

    #[test]
    fn fetch_row_advances_and_signals_eof() {
        let mut result = sample();
        assert_eq!(result.num_rows(), 2);
        assert_eq!(
            result.fetch_row(),
            Some(vec![CellValue::Int(1), CellValue::String("a".to_string())])
        );
        assert_eq!(
            result.fetch_row(),
            Some(vec![CellValue::Int(2), CellValue::String("b".to_string())])
        );
        assert_eq!(result.fetch_row(), None);
        // EOF is sticky, not an error.
        assert_eq!(result.fetch_row(), None);
    }

    #[test]
    fn fetch_assoc_keys_by_column() {
        let mut result = sample();
        let row = result.fetch_assoc().unwrap();
        assert_eq!(row.get("user_id"), Some(&CellValue::Int(1)));
        assert_eq!(row.get("user_name"), Some(&CellValue::String("a".to_string())));
    }

    #[test]
    fn seek_is_bounds_checked() {
        let mut result = sample();
        result.fetch_row();
        assert!(!result.seek(2));
        assert!(!result.seek(usize::MAX));
        // A failed seek leaves the cursor where it was.
        assert_eq!(result.fetch_row().unwrap()[0], CellValue::Int(2));

        assert!(result.seek(0));
        assert_eq!(result.fetch_row().unwrap()[0], CellValue::Int(1));
    }

    #[test]
    fn acks_expose_no_rows() {
        let mut result = QueryResult::ack(true)
            .with_affected_rows(3)
            .with_insert_id(7);
        assert!(result.success());
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.affected_rows(), 3);
        assert_eq!(result.insert_id(), 7);
        assert!(!result.seek(0));
        assert_eq!(result.fetch_row(), None);
        assert_eq!(result.fetch_assoc(), None);
    }

    #[test]
    fn failed_ack_reports_failure() {
        let result = QueryResult::ack(false)
            .with_error(1064, Some("syntax error".to_string()));
        assert!(!result.success());
        assert_eq!(result.error_code(), 1064);
        assert_eq!(result.error_message(), Some("syntax error"));
    }

    #[test]
    fn zero_error_code_normalizes_to_sentinel() {
        let result = QueryResult::ack(true).with_error(0, Some(String::new()));
        assert_eq!(result.error_code(), NO_ERROR);
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn empty_row_set_is_still_a_success() {
        let mut result = QueryResult::rows(vec!["a".to_string()], Vec::new());
        assert!(result.success());
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.fetch_row(), None);
    }
}
