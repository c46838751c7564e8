//! Integrity validation
//!
//! Cross-checks loaded data against the constraints the schema declares:
//! - Primary key and unique column uniqueness
//! - NOT NULL columns
//! - Foreign key referential integrity
//! - Enum membership
//! - Numeric type conformance (warnings)
//!
//! Findings are collected into a [`ValidationResult`] together with per
//! table statistics and a 0-100 health score.

mod integrity;
pub mod result;

pub use result::{
    IssueCategory, Severity, TableStats, ValidationIssue, ValidationResult, health_score,
};

use crate::config::ValidationConfig;
use crate::models::{Schema, TableDataMap};
use integrity::{IssueSink, KeyIndex, TableChecker, resolve_table};
use tracing::{debug, info};

/// Validates loaded tables against a schema
#[derive(Debug, Clone, Default)]
pub struct IntegrityValidator {
    config: ValidationConfig,
}

impl IntegrityValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run every check over every loaded table
    ///
    /// Data tables without a schema counterpart are listed in the stats
    /// with zero checks.
    pub fn validate(&self, schema: &Schema, data: &TableDataMap) -> ValidationResult {
        let keys = KeyIndex::build(schema, data, &self.config);
        let mut sink = IssueSink::default();
        let mut tables = Vec::with_capacity(data.len());

        for (key, table_data) in data {
            let mut stats = TableStats {
                table: key.clone(),
                row_count: table_data.rows.len(),
                ..Default::default()
            };
            match resolve_table(schema, key, table_data) {
                Some(table) => {
                    stats.schema_table = Some(table.name.clone());
                    TableChecker {
                        schema,
                        table,
                        data: table_data,
                        keys: &keys,
                        config: &self.config,
                    }
                    .run(&mut stats, &mut sink);
                    debug!(
                        table = %key,
                        checks = stats.checks_performed,
                        errors = stats.errors,
                        warnings = stats.warnings,
                        "Validated table"
                    );
                }
                None => debug!(table = %key, "No schema table; skipping checks"),
            }
            tables.push(stats);
        }

        let result = ValidationResult::new(sink.issues, tables);
        info!(
            tables = result.tables.len(),
            checks = result.total_checks,
            errors = result.error_count(),
            warnings = result.warning_count(),
            score = result.score,
            "Validation finished"
        );
        result
    }
}

/// Validate with the default configuration
pub fn validate(schema: &Schema, data: &TableDataMap) -> ValidationResult {
    IntegrityValidator::default().validate(schema, data)
}
