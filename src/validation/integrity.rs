//! Constraint checks of loaded data against the schema
//!
//! Key sets are computed once per run, before any foreign key is checked,
//! from every data table that maps onto a schema table. A reference whose
//! target table, key columns or data cannot be resolved is skipped.

use super::result::{IssueCategory, Severity, TableStats, ValidationIssue};
use crate::config::ValidationConfig;
use crate::models::{Column, Schema, Table, TableData, TableDataMap, same_name};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const KEY_SEPARATOR: &str = "\u{1f}";

/// Header of `data` naming `column`, ignoring case
fn header_for<'d>(data: &'d TableData, column: &str) -> Option<&'d str> {
    data.headers
        .iter()
        .find(|h| same_name(h.trim(), column))
        .map(String::as_str)
}

fn cell<'d>(data: &'d TableData, index: usize, header: &str) -> &'d str {
    data.rows[index].get(header).map(|v| v.trim()).unwrap_or("")
}

fn column_list_key(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| c.to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// Column names a reference targets; an empty list means the target's primary key
fn referenced_columns(target: &Table, declared: &[String]) -> Vec<String> {
    if declared.is_empty() {
        target
            .primary_key_columns()
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    } else {
        declared.to_vec()
    }
}

/// Resolve the schema table a data table describes
pub(crate) fn resolve_table<'s>(schema: &'s Schema, key: &str, data: &TableData) -> Option<&'s Table> {
    schema
        .find_table(key.trim())
        .or_else(|| schema.find_table(data.name.trim()))
}

/// Known key values per (table, column list)
#[derive(Debug, Default)]
pub(crate) struct KeyIndex {
    sets: HashMap<(Uuid, String), HashSet<String>>,
}

impl KeyIndex {
    pub(crate) fn build(schema: &Schema, data: &TableDataMap, config: &ValidationConfig) -> Self {
        let mut index = Self::default();
        for (key, table_data) in data {
            let Some(table) = resolve_table(schema, key, table_data) else {
                continue;
            };

            let mut lists: Vec<Vec<String>> = Vec::new();
            let pk: Vec<String> = table
                .primary_key_columns()
                .into_iter()
                .map(|c| c.name.clone())
                .collect();
            if !pk.is_empty() {
                lists.push(pk);
            }
            for rel in &schema.refs {
                let side = rel.foreign_key_side();
                if side.referenced_table == table.id {
                    let columns = referenced_columns(table, side.referenced_columns);
                    if !columns.is_empty() {
                        lists.push(columns);
                    }
                }
            }

            for columns in lists {
                index.collect(table.id, &columns, table_data, config);
            }
        }
        index
    }

    fn collect(&mut self, table: Uuid, columns: &[String], data: &TableData, config: &ValidationConfig) {
        let Some(headers) = columns
            .iter()
            .map(|c| header_for(data, c))
            .collect::<Option<Vec<_>>>()
        else {
            return;
        };
        let set = self
            .sets
            .entry((table, column_list_key(columns)))
            .or_default();
        for i in 0..data.rows.len() {
            if let Some(key) = composite_key(data, i, &headers, config) {
                set.insert(key);
            }
        }
    }

    fn get(&self, table: Uuid, columns: &[String]) -> Option<&HashSet<String>> {
        self.sets.get(&(table, column_list_key(columns)))
    }
}

/// Joined key parts of row `index`, or `None` when any part is empty or a placeholder
fn composite_key(data: &TableData, index: usize, headers: &[&str], config: &ValidationConfig) -> Option<String> {
    let mut parts = Vec::with_capacity(headers.len());
    for header in headers {
        let value = cell(data, index, header);
        if config.is_placeholder(value) {
            return None;
        }
        parts.push(value);
    }
    Some(parts.join(KEY_SEPARATOR))
}

/// Joined reference parts of row `index`, or `None` when any part is empty
fn reference_key(data: &TableData, index: usize, headers: &[&str]) -> Option<String> {
    let mut parts = Vec::with_capacity(headers.len());
    for header in headers {
        let value = cell(data, index, header);
        if value.is_empty() {
            return None;
        }
        parts.push(value);
    }
    Some(parts.join(KEY_SEPARATOR))
}

fn display_key(key: &str) -> String {
    key.replace(KEY_SEPARATOR, ", ")
}

/// Collects issues and numbers them per run
#[derive(Debug, Default)]
pub(crate) struct IssueSink {
    pub(crate) issues: Vec<ValidationIssue>,
}

pub(crate) struct Finding<'a> {
    pub severity: Severity,
    pub category: IssueCategory,
    pub column: Option<&'a str>,
    pub row: Option<usize>,
    pub value: Option<&'a str>,
    pub title: &'a str,
    pub description: String,
}

impl IssueSink {
    fn push(&mut self, stats: &mut TableStats, finding: Finding<'_>) {
        match finding.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Info => stats.infos += 1,
        }
        self.issues.push(ValidationIssue {
            id: format!("{}-{}", finding.category, self.issues.len() + 1),
            severity: finding.severity,
            category: finding.category,
            table: stats.table.clone(),
            column: finding.column.map(String::from),
            row: finding.row,
            value: finding.value.map(String::from),
            title: finding.title.to_string(),
            description: finding.description,
        });
    }
}

/// Runs every check for one data table
pub(crate) struct TableChecker<'a> {
    pub schema: &'a Schema,
    pub table: &'a Table,
    pub data: &'a TableData,
    pub keys: &'a KeyIndex,
    pub config: &'a ValidationConfig,
}

impl TableChecker<'_> {
    pub(crate) fn run(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        self.check_primary_key(stats, sink);
        self.check_unique_columns(stats, sink);
        self.check_not_null(stats, sink);
        self.check_foreign_keys(stats, sink);
        self.check_enums(stats, sink);
        self.check_numeric_types(stats, sink);
    }

    fn rows(&self) -> usize {
        self.data.rows.len()
    }

    fn applied(&self, stats: &mut TableStats, category: IssueCategory) {
        stats.checks.insert(category);
        stats.checks_performed += self.rows();
    }

    fn skipped(&self, stats: &mut TableStats, sink: &mut IssueSink, category: IssueCategory, column: Option<&str>, description: String) {
        if self.config.report_skipped_checks {
            sink.push(
                stats,
                Finding {
                    severity: Severity::Info,
                    category,
                    column,
                    row: None,
                    value: None,
                    title: "Check skipped",
                    description,
                },
            );
        }
    }

    fn check_primary_key(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        let pk = self.table.primary_key_columns();
        if pk.is_empty() {
            return;
        }
        let names: Vec<&str> = pk.iter().map(|c| c.name.as_str()).collect();
        let Some(headers) = names
            .iter()
            .map(|c| header_for(self.data, c))
            .collect::<Option<Vec<_>>>()
        else {
            self.skipped(
                stats,
                sink,
                IssueCategory::Uniqueness,
                None,
                format!("Primary key ({}) is not present in the sheet", names.join(", ")),
            );
            return;
        };
        self.applied(stats, IssueCategory::Uniqueness);
        self.check_duplicates(stats, sink, &headers, &names.join(", "), "Duplicate primary key", "primary key");
    }

    fn check_unique_columns(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        for column in self.table.columns.iter().filter(|c| c.is_unique && !c.is_pk) {
            let Some(header) = header_for(self.data, &column.name) else {
                continue;
            };
            self.applied(stats, IssueCategory::Uniqueness);
            self.check_duplicates(stats, sink, &[header], &column.name, "Duplicate unique value", "unique column");
        }
    }

    fn check_duplicates(
        &self,
        stats: &mut TableStats,
        sink: &mut IssueSink,
        headers: &[&str],
        label: &str,
        title: &str,
        what: &str,
    ) {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for i in 0..self.rows() {
            let Some(key) = composite_key(self.data, i, headers, self.config) else {
                continue;
            };
            let row = self.data.sheet_row(i);
            if let Some(first) = first_seen.get(&key) {
                let shown = display_key(&key);
                sink.push(
                    stats,
                    Finding {
                        severity: Severity::Error,
                        category: IssueCategory::Uniqueness,
                        column: Some(label),
                        row: Some(row),
                        value: Some(&shown),
                        title,
                        description: format!(
                            "Value '{shown}' of {what} ({label}) in {} already appears at row {first}",
                            self.table.name
                        ),
                    },
                );
            } else {
                first_seen.insert(key, row);
            }
        }
    }

    fn check_not_null(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        for column in self.table.columns.iter().filter(|c| c.is_not_null && !c.is_pk) {
            let Some(header) = header_for(self.data, &column.name) else {
                continue;
            };
            self.applied(stats, IssueCategory::Required);
            for i in 0..self.rows() {
                if !cell(self.data, i, header).is_empty() {
                    continue;
                }
                let row = self.data.sheet_row(i);
                sink.push(
                    stats,
                    Finding {
                        severity: Severity::Error,
                        category: IssueCategory::Required,
                        column: Some(&column.name),
                        row: Some(row),
                        value: None,
                        title: "Missing required value",
                        description: format!(
                            "{}.{} is NOT NULL but row {row} is empty",
                            self.table.name, column.name
                        ),
                    },
                );
            }
        }
    }

    fn check_foreign_keys(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        for rel in &self.schema.refs {
            let side = rel.foreign_key_side();
            if side.table != self.table.id || side.columns.is_empty() {
                continue;
            }
            let label = side.columns.join(", ");

            let Some(target) = self.schema.table_by_id(side.referenced_table) else {
                self.skipped(
                    stats,
                    sink,
                    IssueCategory::Referential,
                    Some(&label),
                    format!("Referenced table {} is not in the schema", side.referenced_table),
                );
                continue;
            };
            let target_columns = referenced_columns(target, side.referenced_columns);
            if target_columns.len() != side.columns.len() {
                self.skipped(
                    stats,
                    sink,
                    IssueCategory::Referential,
                    Some(&label),
                    format!("Reference to {} has no matching key columns", target.name),
                );
                continue;
            }
            let Some(headers) = side
                .columns
                .iter()
                .map(|c| header_for(self.data, c))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let Some(known) = self.keys.get(target.id, &target_columns) else {
                self.skipped(
                    stats,
                    sink,
                    IssueCategory::Referential,
                    Some(&label),
                    format!("No data loaded for referenced table {}", target.name),
                );
                continue;
            };

            self.applied(stats, IssueCategory::Referential);
            let target_label = format!("{}.{}", target.name, target_columns.join(", "));
            for i in 0..self.rows() {
                let Some(key) = reference_key(self.data, i, &headers) else {
                    continue;
                };
                if known.contains(&key) {
                    continue;
                }
                let row = self.data.sheet_row(i);
                let shown = display_key(&key);
                sink.push(
                    stats,
                    Finding {
                        severity: Severity::Error,
                        category: IssueCategory::Referential,
                        column: Some(&label),
                        row: Some(row),
                        value: Some(&shown),
                        title: "Broken reference",
                        description: format!(
                            "{}.{label} = '{shown}' has no match in {target_label}",
                            self.table.name
                        ),
                    },
                );
            }
        }
    }

    fn check_enums(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        for column in &self.table.columns {
            let Some(header) = header_for(self.data, &column.name) else {
                continue;
            };
            let Some(enum_type) = self.schema.find_enum(&column.data_type) else {
                continue;
            };
            self.applied(stats, IssueCategory::Enum);
            for i in 0..self.rows() {
                let value = cell(self.data, i, header);
                if value.is_empty() || enum_type.contains(value) {
                    continue;
                }
                let row = self.data.sheet_row(i);
                let allowed: Vec<&str> = enum_type.values.iter().map(|v| v.name.as_str()).collect();
                sink.push(
                    stats,
                    Finding {
                        severity: Severity::Error,
                        category: IssueCategory::Enum,
                        column: Some(&column.name),
                        row: Some(row),
                        value: Some(value),
                        title: "Invalid enum value",
                        description: format!(
                            "'{value}' is not a value of enum {} ({})",
                            enum_type.name,
                            allowed.join(", ")
                        ),
                    },
                );
            }
        }
    }

    fn check_numeric_types(&self, stats: &mut TableStats, sink: &mut IssueSink) {
        for column in self.table.columns.iter().filter(|c| self.is_numeric(c)) {
            let Some(header) = header_for(self.data, &column.name) else {
                continue;
            };
            self.applied(stats, IssueCategory::Type);
            for i in 0..self.rows() {
                let value = cell(self.data, i, header);
                if value.is_empty() || value.parse::<f64>().is_ok_and(f64::is_finite) {
                    continue;
                }
                let row = self.data.sheet_row(i);
                sink.push(
                    stats,
                    Finding {
                        severity: Severity::Warning,
                        category: IssueCategory::Type,
                        column: Some(&column.name),
                        row: Some(row),
                        value: Some(value),
                        title: "Non-numeric value",
                        description: format!(
                            "{}.{} is declared {} but row {row} holds '{value}'",
                            self.table.name, column.name, column.data_type
                        ),
                    },
                );
            }
        }
    }

    fn is_numeric(&self, column: &Column) -> bool {
        self.schema.find_enum(&column.data_type).is_none()
            && self.config.is_numeric_type(&column.base_type())
    }
}
