//! Relational engine boundary
//!
//! The engine that actually executes SQL is an external collaborator. It
//! receives a [`TableCatalog`] built fresh for every execution and runs
//! statements against it through an [`EngineSession`]. Because the catalog
//! is per call, no table binding outlives the query that created it.

#[cfg(feature = "duckdb-backend")]
pub mod duckdb_backend;

#[cfg(feature = "duckdb-backend")]
pub use duckdb_backend::DuckDbEngine;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised by an engine while opening a session or running a statement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The statement could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The statement failed during planning or execution
    #[error("Execution error: {0}")]
    Execution(String),

    /// A table could not be loaded into the engine
    #[error("Failed to register table {table}: {reason}")]
    Registration { table: String, reason: String },

    /// The statement ran but did not produce a row set
    #[error("Statement did not return rows; only read queries are supported")]
    NotARowSet,

    /// The statement is not a read query
    #[error("Only read queries are supported, got {0}")]
    NotReadOnly(String),
}

/// Storage type of a catalog column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    pub kind: ColumnKind,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A table handed to the engine: typed columns and positional values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogTable {
    pub columns: Vec<CatalogColumn>,
    /// One entry per row, aligned with `columns`; `Value::Null` for absent cells
    pub rows: Vec<Vec<Value>>,
}

/// Tables reachable by name during one execution
///
/// Several names may share one table (case variants of the same sheet).
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    tables: BTreeMap<String, Rc<CatalogTable>>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `table`, replacing any previous binding of that exact name
    pub fn register(&mut self, name: impl Into<String>, table: Rc<CatalogTable>) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&CatalogTable> {
        self.tables.get(name).map(Rc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Rows produced by one statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// An external SQL engine
pub trait SqlEngine {
    /// Short engine name used in logs
    fn name(&self) -> &'static str;

    /// Open a session with every table of `catalog` bound under its name
    fn open_session(&self, catalog: &TableCatalog) -> Result<Box<dyn EngineSession>, EngineError>;
}

/// A live execution context over one catalog
pub trait EngineSession {
    /// Run one statement and return its rows
    fn query(&mut self, sql: &str) -> Result<RowSet, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shares_tables_between_names() {
        let table = Rc::new(CatalogTable {
            columns: vec![CatalogColumn::new("id", ColumnKind::Integer)],
            rows: vec![vec![Value::from(1)]],
        });
        let mut catalog = TableCatalog::new();
        catalog.register("Character", Rc::clone(&table));
        catalog.register("character", Rc::clone(&table));
        catalog.register("CHARACTER", table);

        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("character"));
        assert!(!catalog.contains("Skill"));
        assert_eq!(catalog.get("CHARACTER").map(|t| t.rows.len()), Some(1));
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["CHARACTER", "Character", "character"]
        );
    }
}
