//! Query execution over the schema or over loaded data
//!
//! Both modes share one pipeline: normalize identifiers, remap reserved
//! table names, split into statements, then run every statement in a
//! single engine session opened over a catalog built for this call only.
//! Failures never escape as `Err`; they land in [`QueryResult::error`].

use super::normalize::normalize_identifiers;
use super::registrar::{Registration, register_data, register_metadata};
use super::reserved::ReservedNameMap;
use super::result::{QueryResult, StatementResult};
use super::split::split_statements;
use crate::engine::{EngineError, EngineSession, SqlEngine};
use crate::models::{Schema, TableDataMap};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::time::Instant;
use tracing::{debug, info, warn};

static FROM_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bFROM\s+[`"\[]?([^\s,;()`"\[\]]+)"#).expect("valid FROM pattern")
});

/// Runs queries through a [`SqlEngine`]
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor<E> {
    engine: E,
}

#[cfg(feature = "duckdb-backend")]
impl QueryExecutor<crate::engine::DuckDbEngine> {
    /// Executor backed by the embedded DuckDB engine
    pub fn duckdb() -> Self {
        Self::new(crate::engine::DuckDbEngine::new())
    }
}

impl<E: SqlEngine> QueryExecutor<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Query the schema through the `tables`, `columns`, `refs` and `enums` tables
    pub fn query_metadata(&self, schema: &Schema, sql: &str) -> QueryResult {
        let start = Instant::now();
        if sql.trim().is_empty() {
            return finish(QueryResult::failed("Empty query"), start);
        }
        let registration = register_metadata(schema);
        let result = self.execute(&registration, sql);
        info!(
            mode = "metadata",
            engine = self.engine.name(),
            rows = result.row_count,
            ok = result.is_ok(),
            "Query finished"
        );
        finish(result, start)
    }

    /// Query loaded tables, resolving their names against `schema` when given
    pub fn query_data(&self, schema: Option<&Schema>, data: &TableDataMap, sql: &str) -> QueryResult {
        let start = Instant::now();
        if sql.trim().is_empty() {
            return finish(QueryResult::failed("Empty query"), start);
        }
        let registration = register_data(schema, data);
        let result = self.execute(&registration, sql);
        info!(
            mode = "data",
            engine = self.engine.name(),
            tables = registration.tables.len(),
            rows = result.row_count,
            ok = result.is_ok(),
            "Query finished"
        );
        finish(result, start)
    }

    fn execute(&self, registration: &Registration, sql: &str) -> QueryResult {
        let reserved = &registration.reserved;
        let rewritten = reserved.remap(&normalize_identifiers(sql));
        let statements = split_statements(&rewritten);
        if statements.is_empty() {
            return QueryResult::failed("Empty query");
        }
        debug!(statements = statements.len(), sql = %rewritten, "Executing query");

        let mut session = match self.engine.open_session(&registration.catalog) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "Failed to open engine session");
                return QueryResult::failed(err.to_string());
            }
        };

        let results = statements
            .iter()
            .map(|statement| run_statement(session.as_mut(), reserved, statement))
            .collect();
        QueryResult::from_statements(results)
    }
}

fn finish(mut result: QueryResult, start: Instant) -> QueryResult {
    result.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    result
}

fn run_statement(
    session: &mut dyn EngineSession,
    reserved: &ReservedNameMap,
    statement: &str,
) -> StatementResult {
    let table = table_label(statement, reserved);
    let outcome = ensure_read_only(statement).and_then(|()| session.query(statement));
    match outcome {
        Ok(rows) => {
            debug!(statement, rows = rows.rows.len(), "Statement succeeded");
            StatementResult::succeeded(statement, table, rows)
        }
        Err(err) => {
            let mut message = err.to_string();
            if let Some(hint) = reserved.hint_for(&message, statement) {
                message = format!("{message}\n{hint}");
            }
            debug!(statement, error = %message, "Statement failed");
            StatementResult::failed(statement, table, message)
        }
    }
}

/// Reject statements that parse as anything other than a query
///
/// Input the generic parser cannot read is left for the engine to judge,
/// since its dialect is wider.
pub fn ensure_read_only(statement: &str) -> Result<(), EngineError> {
    let Ok(parsed) = Parser::parse_sql(&GenericDialect {}, statement) else {
        return Ok(());
    };
    match parsed.iter().find(|s| !matches!(s, Statement::Query(_))) {
        Some(_) => Err(EngineError::NotReadOnly(statement_kind(statement))),
        None => Ok(()),
    }
}

fn statement_kind(statement: &str) -> String {
    statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// First table named after `FROM`, mapped back from its internal alias
pub fn table_label(statement: &str, reserved: &ReservedNameMap) -> Option<String> {
    let name = FROM_TABLE.captures(statement)?.get(1)?.as_str();
    Some(reserved.original_of(name).unwrap_or(name).to_string())
}
