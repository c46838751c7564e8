//! sheetql - Schema-aware query and integrity engine for spreadsheet-backed data models
//!
//! Provides:
//! - SQL queries over the schema itself (`tables`, `columns`, `refs`, `enums`)
//! - SQL queries over tables extracted from spreadsheets
//! - Header detection and extraction of decoded sheets
//! - Integrity validation of data against schema constraints
//!
//! ```rust,no_run
//! use sheetql::{QueryExecutor, Schema, TableDataMap};
//!
//! let schema = Schema::default();
//! let executor = QueryExecutor::duckdb();
//! let result = executor.query_metadata(&schema, "SELECT name FROM tables");
//! assert!(result.is_ok());
//! # let _ = TableDataMap::new();
//! ```

pub mod config;
pub mod engine;
pub mod extract;
pub mod models;
pub mod query;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{ConfigError, EngineConfig, ExtractConfig, ValidationConfig};
#[cfg(feature = "duckdb-backend")]
pub use engine::DuckDbEngine;
pub use engine::{EngineError, EngineSession, SqlEngine, TableCatalog};
pub use extract::{ExtractReport, SheetExtractor, SkipReason, SkippedSheet};
pub use models::{
    Column, EnumType, EnumValue, RawSheet, Relationship, RelationshipKind, Row, Schema, Table,
    TableData, TableDataMap,
};
pub use query::{QueryExecutor, QueryResult, StatementResult};
pub use validation::{
    IntegrityValidator, IssueCategory, Severity, TableStats, ValidationIssue, ValidationResult,
};
