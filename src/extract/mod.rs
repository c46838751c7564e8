//! Spreadsheet-to-table extraction
//!
//! Turns decoded sheets ([`RawSheet`]) into [`TableData`]. The decoder hands
//! over rows of primitive cells; this module decides which row is the
//! header and converts every cell below it to trimmed text.
//!
//! Header detection scans the first few rows. When the schema declares a
//! table with the sheet's name, the row naming the most declared columns
//! wins; otherwise the row with the most non-numeric cells wins. Ties go to
//! the earliest row.

use crate::config::ExtractConfig;
use crate::models::{RawSheet, Row, Schema, TableData, TableDataMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Why a sheet produced no table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Definition or metadata sheet by naming convention
    DefinitionSheet,
    /// Fewer than two rows
    TooFewRows,
    /// The chosen header row has no non-empty cell
    EmptyHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::DefinitionSheet => "definition or metadata sheet",
            SkipReason::TooFewRows => "fewer than 2 rows",
            SkipReason::EmptyHeader => "header row is empty",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of extracting a whole workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractReport {
    pub tables: TableDataMap,
    pub skipped: Vec<SkippedSheet>,
}

impl ExtractReport {
    /// Aggregate count line, e.g. `3 loaded, 1 skipped`
    pub fn summary(&self) -> String {
        format!("{} loaded, {} skipped", self.tables.len(), self.skipped.len())
    }
}

/// Extracts tables from decoded sheets
#[derive(Debug, Clone, Default)]
pub struct SheetExtractor<'a> {
    config: ExtractConfig,
    schema: Option<&'a Schema>,
}

impl<'a> SheetExtractor<'a> {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            schema: None,
        }
    }

    /// Use the schema's declared columns to pick header rows
    pub fn with_schema(mut self, schema: &'a Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Extract one sheet, or `None` when it is not a usable data sheet
    pub fn extract(&self, sheet: &RawSheet) -> Option<TableData> {
        self.try_extract(sheet).ok()
    }

    /// Extract one sheet, reporting why it was skipped
    pub fn try_extract(&self, sheet: &RawSheet) -> Result<TableData, SkipReason> {
        if self.config.is_skipped_sheet(&sheet.name) {
            return Err(SkipReason::DefinitionSheet);
        }
        if sheet.rows.len() < 2 {
            return Err(SkipReason::TooFewRows);
        }

        let rows: Vec<Vec<String>> = sheet
            .rows
            .iter()
            .map(|r| r.iter().map(cell_text).collect())
            .collect();
        let known = self.known_columns(&sheet.name);
        let header_row = detect_header_row(&rows, known.as_ref(), self.config.header_scan_rows);

        let header_cells = &rows[header_row];
        if header_cells.iter().all(String::is_empty) {
            return Err(SkipReason::EmptyHeader);
        }
        let columns = header_columns(header_cells);
        let headers: Vec<String> = columns.iter().map(|(_, h)| h.clone()).collect();

        let mut data_rows = Vec::new();
        let mut row_numbers = Vec::new();
        for (offset, cells) in rows.iter().enumerate().skip(header_row + 1) {
            if cells.iter().all(String::is_empty) {
                continue;
            }
            let row: Row = columns
                .iter()
                .filter_map(|(i, h)| cells.get(*i).map(|v| (h.clone(), v.clone())))
                .collect();
            data_rows.push(row);
            row_numbers.push(offset + 1);
        }

        debug!(
            sheet = %sheet.name,
            header_row,
            columns = headers.len(),
            rows = data_rows.len(),
            "Extracted sheet"
        );
        let mut table = TableData::new(sheet.name.clone(), headers, data_rows);
        table.header_row = header_row;
        table.row_numbers = row_numbers;
        Ok(table)
    }

    /// Extract every sheet of a workbook
    pub fn extract_workbook(&self, sheets: &[RawSheet]) -> ExtractReport {
        let mut report = ExtractReport::default();
        for sheet in sheets {
            match self.try_extract(sheet) {
                Ok(table) => {
                    report.tables.insert(sheet.name.clone(), table);
                }
                Err(reason) => {
                    debug!(sheet = %sheet.name, %reason, "Skipped sheet");
                    report.skipped.push(SkippedSheet {
                        name: sheet.name.clone(),
                        reason,
                    });
                }
            }
        }
        info!(
            loaded = report.tables.len(),
            skipped = report.skipped.len(),
            "Workbook extracted"
        );
        report
    }

    fn known_columns(&self, sheet_name: &str) -> Option<HashSet<String>> {
        let table = self.schema?.find_table(sheet_name.trim())?;
        Some(table.columns.iter().map(|c| c.name.to_lowercase()).collect())
    }
}

/// Index of the header row among the first `scan_rows` rows
///
/// `rows` holds cell text. With `known` columns a row scores one point per
/// cell naming a known column; without, one point per non-empty cell that
/// is not a number. The earliest best-scoring row wins.
pub fn detect_header_row(
    rows: &[Vec<String>],
    known: Option<&HashSet<String>>,
    scan_rows: usize,
) -> usize {
    let mut best = (0, 0);
    for (i, cells) in rows.iter().take(scan_rows.max(1)).enumerate() {
        let score = cells
            .iter()
            .filter(|c| !c.is_empty())
            .filter(|c| match known {
                Some(known) => known.contains(&c.to_lowercase()),
                None => c.parse::<f64>().is_err(),
            })
            .count();
        if score > best.1 {
            best = (i, score);
        }
    }
    best.0
}

/// Non-empty header cells with their positions; repeated names get `_2`, `_3`, …
fn header_columns(cells: &[String]) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .map(|(i, c)| {
            let mut name = c.clone();
            let mut n = 2;
            while !seen.insert(name.to_lowercase()) {
                name = format!("{c}_{n}");
                n += 1;
            }
            (i, name)
        })
        .collect()
}

/// Text of a decoded cell
///
/// Nulls become empty strings, strings are trimmed and whole numbers lose
/// their fractional part (`3.0` reads as `3`).
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("  Ayla ")), "Ayla");
        assert_eq!(cell_text(&json!(3.0)), "3");
        assert_eq!(cell_text(&json!(2.5)), "2.5");
        assert_eq!(cell_text(&json!(-7)), "-7");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn test_detect_header_prefers_textual_rows() {
        let rows = texts(&[&["Character sheet", "", ""], &["id", "name", "level"], &["1", "Ayla", "3"]]);
        assert_eq!(detect_header_row(&rows, None, 5), 1);
    }

    #[test]
    fn test_detect_header_with_known_columns() {
        let rows = texts(&[&["Exported", "by", "tool"], &["ID", "Name", "x"], &["1", "Ayla", "y"]]);
        let known: HashSet<String> = ["id", "name"].into_iter().map(String::from).collect();
        assert_eq!(detect_header_row(&rows, Some(&known), 5), 1);
    }

    #[test]
    fn test_detect_header_ties_go_to_earliest() {
        let rows = texts(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(detect_header_row(&rows, None, 5), 0);
    }

    #[test]
    fn test_detect_header_respects_scan_depth() {
        let rows = texts(&[&["1"], &["2"], &["name", "note"]]);
        assert_eq!(detect_header_row(&rows, None, 2), 0);
        assert_eq!(detect_header_row(&rows, None, 3), 2);
    }

    #[test]
    fn test_header_columns_dedup_and_drop_empty() {
        let cells: Vec<String> = ["name", "", "Name", "name"].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            header_columns(&cells),
            vec![
                (0, "name".to_string()),
                (2, "Name_2".to_string()),
                (3, "name_3".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_skips_empty_rows_and_tracks_positions() {
        let sheet = RawSheet::new(
            "Character",
            vec![
                vec![json!("id"), json!("name")],
                vec![json!(1), json!(" Ayla ")],
                vec![json!(null), json!("")],
                vec![json!(2)],
            ],
        );
        let table = SheetExtractor::default().extract(&sheet).unwrap();
        assert_eq!(table.headers, vec!["id", "name"]);
        assert_eq!(table.row_count, 2);
        assert_eq!(table.rows[0]["name"], "Ayla");
        assert!(!table.rows[1].contains_key("name"));
        assert_eq!(table.row_numbers, vec![2, 4]);
        assert_eq!(table.sheet_row(1), 4);
    }

    #[test]
    fn test_unusable_sheets() {
        let extractor = SheetExtractor::default();
        let one_row = RawSheet::new("Character", vec![vec![json!("id")]]);
        assert_eq!(extractor.try_extract(&one_row), Err(SkipReason::TooFewRows));

        let blank = RawSheet::new("Character", vec![vec![json!(null)], vec![json!("")]]);
        assert_eq!(extractor.try_extract(&blank), Err(SkipReason::EmptyHeader));

        let readme = RawSheet::new("README", vec![vec![json!("a")], vec![json!("b")]]);
        assert_eq!(extractor.try_extract(&readme), Err(SkipReason::DefinitionSheet));

        let marked = RawSheet::new("#notes", vec![vec![json!("a")], vec![json!("b")]]);
        assert_eq!(extractor.try_extract(&marked), Err(SkipReason::DefinitionSheet));
    }
}
