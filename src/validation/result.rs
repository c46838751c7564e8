//! Validation findings and the derived health score

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Kind of constraint a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    /// Foreign key values without a matching key in the referenced table
    Referential,
    /// Duplicate primary key or unique column values
    Uniqueness,
    /// Empty values in NOT NULL columns
    Required,
    /// Values outside the column's enum
    Enum,
    /// Values not matching the declared column type
    Type,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueCategory::Referential => "referential",
            IssueCategory::Uniqueness => "uniqueness",
            IssueCategory::Required => "required",
            IssueCategory::Enum => "enum",
            IssueCategory::Type => "type",
        };
        f.write_str(text)
    }
}

/// One finding of a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub id: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// 1-based row in the source sheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub title: String,
    pub description: String,
}

/// Per data table counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    /// Key of the data table
    pub table: String,
    /// Schema table it was matched to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_table: Option<String>,
    pub row_count: usize,
    pub checks_performed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Check categories that applied to this table
    pub checks: BTreeSet<IssueCategory>,
}

/// Outcome of validating all loaded data against the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
    pub tables: Vec<TableStats>,
    pub total_checks: usize,
    /// Health score from 0 to 100
    pub score: u8,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    pub(crate) fn new(issues: Vec<ValidationIssue>, tables: Vec<TableStats>) -> Self {
        let total_checks = tables.iter().map(|t| t.checks_performed).sum();
        let penalized = issues
            .iter()
            .filter(|i| i.severity != Severity::Info)
            .count();
        Self {
            score: health_score(total_checks, penalized),
            issues,
            tables,
            total_checks,
            validated_at: Utc::now(),
        }
    }

    /// Issues grouped by category, in emission order within each group
    pub fn by_category(&self) -> BTreeMap<IssueCategory, Vec<&ValidationIssue>> {
        let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for issue in &self.issues {
            groups.entry(issue.category).or_default().push(issue);
        }
        groups
    }

    /// Issues grouped by table name
    pub fn by_table(&self) -> BTreeMap<&str, Vec<&ValidationIssue>> {
        let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for issue in &self.issues {
            groups.entry(issue.table.as_str()).or_default().push(issue);
        }
        groups
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    /// No errors or warnings
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0 && self.warning_count() == 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// `round(100 × (checks − issues) / checks)` clamped to 0..=100; 100 when nothing was checked
pub fn health_score(checks: usize, issues: usize) -> u8 {
    if checks == 0 {
        return 100;
    }
    let passed = checks.saturating_sub(issues) as f64;
    (100.0 * passed / checks as f64).round().clamp(0.0, 100.0) as u8
}
