//! Output formatting for CLI

use crate::cli::error::CliError;
use crate::extract::ExtractReport;
use crate::query::QueryResult;
use crate::validation::{Severity, ValidationResult};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Compact human-readable text
    Text,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::OutputError(e.to_string()))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Format a query result
pub fn format_query(result: &QueryResult, format: OutputFormat) -> Result<String, CliError> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut output = String::new();
    match &result.multi_results {
        Some(statements) => {
            for (idx, statement) in statements.iter().enumerate() {
                output.push_str(&format!("-- Statement {}: {}\n", idx + 1, statement.statement));
                match &statement.error {
                    Some(error) => output.push_str(&format!("⚠️  {}\n", error)),
                    None => output.push_str(&rows_text(&statement.columns, &statement.rows)),
                }
                output.push('\n');
            }
        }
        None => match &result.error {
            Some(error) => output.push_str(&format!("⚠️  {}\n", error)),
            None => output.push_str(&rows_text(&result.columns, &result.rows)),
        },
    }
    output.push_str(&format!(
        "({} row(s), {:.1} ms)",
        result.row_count, result.duration_ms
    ));
    Ok(output)
}

fn rows_text(columns: &[String], rows: &[serde_json::Map<String, Value>]) -> String {
    let mut output = columns.join(" | ");
    output.push('\n');
    for row in rows {
        let cells: Vec<String> = columns.iter().map(|c| cell(row.get(c))).collect();
        output.push_str(&cells.join(" | "));
        output.push('\n');
    }
    output
}

/// Format a validation result
pub fn format_validation(
    result: &ValidationResult,
    format: OutputFormat,
) -> Result<String, CliError> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut output = String::new();
    for (table, issues) in result.by_table() {
        output.push_str(&format!("\n{}:\n", table));
        for issue in issues {
            let marker = match issue.severity {
                Severity::Error => "❌",
                Severity::Warning => "⚠️ ",
                Severity::Info => "ℹ️ ",
            };
            let row = issue.row.map(|r| format!(" (row {})", r)).unwrap_or_default();
            output.push_str(&format!(
                "  {} [{}] {}{}: {}\n",
                marker, issue.category, issue.title, row, issue.description
            ));
        }
    }

    output.push_str("\nTables:\n");
    for stats in &result.tables {
        let matched = stats
            .schema_table
            .as_deref()
            .map(|s| format!(" → {}", s))
            .unwrap_or_else(|| " (not in schema)".to_string());
        output.push_str(&format!(
            "  - {}{}: {} row(s), {} check(s), {} error(s), {} warning(s)\n",
            stats.table, matched, stats.row_count, stats.checks_performed, stats.errors, stats.warnings
        ));
    }

    if result.is_clean() {
        output.push_str(&format!("\n✅ All checks passed! Score: {}\n", result.score));
    } else {
        output.push_str(&format!(
            "\nScore: {} ({} error(s), {} warning(s) in {} check(s))\n",
            result.score,
            result.error_count(),
            result.warning_count(),
            result.total_checks
        ));
    }
    Ok(output)
}

/// Format an extraction report
pub fn format_extract(report: &ExtractReport, format: OutputFormat) -> Result<String, CliError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut output = String::new();
    for (name, table) in &report.tables {
        output.push_str(&format!(
            "✅ {}: {} row(s), header at row {}\n  Columns: {}\n",
            name,
            table.row_count,
            table.header_row + 1,
            table.headers.join(", ")
        ));
    }
    for skipped in &report.skipped {
        output.push_str(&format!("⚠️  {}: skipped ({})\n", skipped.name, skipped.reason));
    }
    Ok(output)
}
