//! Query result shapes

use crate::engine::RowSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one statement of a multi-statement query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatementResult {
    /// Statement text as executed
    pub statement: String,
    /// First table named after `FROM`, under its original name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatementResult {
    pub(crate) fn succeeded(statement: &str, table: Option<String>, rows: RowSet) -> Self {
        Self {
            statement: statement.to_string(),
            table,
            row_count: rows.rows.len(),
            columns: rows.columns,
            rows: rows.rows,
            error: None,
        }
    }

    pub(crate) fn failed(statement: &str, table: Option<String>, error: String) -> Self {
        Self {
            statement: statement.to_string(),
            table,
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Uniform result of a metadata or data query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-statement breakdown, present when the input held more than one statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_results: Option<Vec<StatementResult>>,
    pub duration_ms: f64,
}

impl QueryResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Fold per-statement outcomes into one result
    ///
    /// A single statement is returned flat. For several, columns are the
    /// union in first-seen order, rows are concatenated and the top-level
    /// error is set only when every statement failed.
    pub(crate) fn from_statements(mut statements: Vec<StatementResult>) -> Self {
        if statements.len() == 1 {
            let only = statements.remove(0);
            return Self {
                columns: only.columns,
                rows: only.rows,
                row_count: only.row_count,
                error: only.error,
                ..Default::default()
            };
        }

        let mut result = Self::default();
        for statement in &statements {
            for column in &statement.columns {
                if !result.columns.contains(column) {
                    result.columns.push(column.clone());
                }
            }
            result.rows.extend(statement.rows.iter().cloned());
            result.row_count += statement.row_count;
        }
        if !statements.is_empty() && statements.iter().all(|s| !s.is_ok()) {
            let errors: Vec<String> = statements
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.error.as_ref().map(|e| format!("Statement {}: {e}", i + 1)))
                .collect();
            result.error = Some(errors.join("\n"));
        }
        result.multi_results = Some(statements);
        result
    }
}
