//! Tabular data extracted from spreadsheet-like sources

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One data row: header text → trimmed cell text
///
/// A row may omit a header when the source row was shorter than the header
/// row, but never carries a key that is not one of its table's headers.
pub type Row = BTreeMap<String, String>;

/// Loaded tables keyed by their extraction source key (usually the sheet name)
///
/// Keys are stored as extracted; matching them against schema table names
/// is case-insensitive and happens at query or validation time.
pub type TableDataMap = BTreeMap<String, TableData>;

/// Concrete rows of one source sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    /// Source sheet name; not necessarily a schema table name
    pub name: String,
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: usize,
    /// 0-based index of the header row within the source sheet
    #[serde(default)]
    pub header_row: usize,
    /// 1-based sheet row of every entry in `rows`; may be empty for
    /// hand-built tables, in which case rows are assumed contiguous
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_numbers: Vec<usize>,
}

impl TableData {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            name: name.into(),
            headers,
            rows,
            row_count,
            header_row: 0,
            row_numbers: Vec::new(),
        }
    }

    /// Build a table from positional values, trimming every cell
    ///
    /// Values beyond the header count are dropped; short rows leave the
    /// remaining headers absent.
    pub fn from_values<H, R, V>(name: impl Into<String>, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|values| {
                headers
                    .iter()
                    .zip(values)
                    .map(|(h, v)| (h.clone(), v.as_ref().trim().to_string()))
                    .collect::<Row>()
            })
            .collect();
        Self::new(name, headers, rows)
    }

    /// 1-based position of data row `index` in the source sheet
    pub fn sheet_row(&self, index: usize) -> usize {
        self.row_numbers
            .get(index)
            .copied()
            .unwrap_or(self.header_row + index + 2)
    }
}

/// A decoded sheet: primitive cell values in source order
///
/// Produced by the external spreadsheet decoder; cells are JSON primitives
/// (string, number, boolean or null).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawSheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
