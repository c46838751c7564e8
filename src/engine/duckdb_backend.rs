//! DuckDB engine adapter
//!
//! Every session is a fresh in-memory DuckDB database, so catalog bindings
//! are scoped to one execution and nothing leaks into the next query.

use super::{
    CatalogTable, ColumnKind, EngineError, EngineSession, RowSet, SqlEngine, TableCatalog,
};
use crate::query::scan::{SpanKind, spans};
use duckdb::types::Value as DuckValue;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Embedded DuckDB engine
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbEngine;

impl DuckDbEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SqlEngine for DuckDbEngine {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn open_session(&self, catalog: &TableCatalog) -> Result<Box<dyn EngineSession>, EngineError> {
        let conn = duckdb::Connection::open_in_memory()?;

        // DuckDB folds identifiers case-insensitively, so case variants of
        // one name resolve to the first table created under it.
        let mut created = HashSet::new();
        for (name, table) in catalog.iter() {
            if !created.insert(name.to_lowercase()) {
                continue;
            }
            if table.columns.is_empty() {
                warn!(table = name, "Skipping table without columns");
                continue;
            }
            load_table(&conn, name, table)?;
        }
        debug!(tables = created.len(), "DuckDB session ready");

        Ok(Box::new(DuckDbSession { conn }))
    }
}

struct DuckDbSession {
    conn: duckdb::Connection,
}

impl EngineSession for DuckDbSession {
    fn query(&mut self, sql: &str) -> Result<RowSet, EngineError> {
        let sql = to_duckdb_quoting(sql);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        // Get column names after query execution
        let column_count = rows.as_ref().map(|r| r.column_count()).unwrap_or(0);
        if column_count == 0 {
            return Err(EngineError::NotARowSet);
        }
        let columns = distinct_names((0..column_count).map(|i| {
            rows.as_ref()
                .and_then(|r| r.column_name(i).ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("col{}", i))
        }));

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut obj = Map::new();
            for (i, name) in columns.iter().enumerate() {
                let value: DuckValue = row.get(i)?;
                obj.insert(name.clone(), to_json(value));
            }
            out.push(obj);
        }

        Ok(RowSet { columns, rows: out })
    }
}

/// Output names with repeats suffixed `_2`, `_3`, so row keys stay distinct
fn distinct_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .map(|base| {
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            name
        })
        .collect()
}

fn load_table(
    conn: &duckdb::Connection,
    name: &str,
    table: &CatalogTable,
) -> Result<(), EngineError> {
    let registration = |reason: String| EngineError::Registration {
        table: name.to_string(),
        reason,
    };

    let columns = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.kind)))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!("CREATE TABLE {} ({columns})", quote_ident(name)))
        .map_err(|e| registration(e.to_string()))?;

    if table.rows.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; table.columns.len()].join(", ");
    let mut stmt = conn
        .prepare(&format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_ident(name)
        ))
        .map_err(|e| registration(e.to_string()))?;
    for row in &table.rows {
        let values: Vec<DuckValue> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| to_duck_value(row.get(i).unwrap_or(&Value::Null), c.kind))
            .collect();
        stmt.execute(duckdb::params_from_iter(values))
            .map_err(|e| registration(e.to_string()))?;
    }
    Ok(())
}

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "BIGINT",
        ColumnKind::Real => "DOUBLE",
        ColumnKind::Text => "VARCHAR",
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// DuckDB quotes identifiers with double quotes only
fn to_duckdb_quoting(sql: &str) -> String {
    spans(sql)
        .into_iter()
        .map(|span| match span.kind {
            SpanKind::Back if span.closed => quote_ident(&span.inner()),
            _ => span.text.to_string(),
        })
        .collect()
}

fn to_duck_value(value: &Value, kind: ColumnKind) -> DuckValue {
    match (kind, value) {
        (_, Value::Null) => DuckValue::Null,
        (ColumnKind::Integer, v) => v.as_i64().map(DuckValue::BigInt).unwrap_or(DuckValue::Null),
        (ColumnKind::Real, v) => v.as_f64().map(DuckValue::Double).unwrap_or(DuckValue::Null),
        (ColumnKind::Text, Value::String(s)) => DuckValue::Text(s.clone()),
        (ColumnKind::Text, v) => DuckValue::Text(v.to_string()),
    }
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::from(n),
        DuckValue::SmallInt(n) => Value::from(n),
        DuckValue::Int(n) => Value::from(n),
        DuckValue::BigInt(n) => Value::from(n),
        DuckValue::HugeInt(n) => i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(n.to_string())),
        DuckValue::UTinyInt(n) => Value::from(n),
        DuckValue::USmallInt(n) => Value::from(n),
        DuckValue::UInt(n) => Value::from(n),
        DuckValue::UBigInt(n) => Value::from(n),
        DuckValue::Float(f) => float(f as f64),
        DuckValue::Double(f) => float(f),
        DuckValue::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .map(float)
                .unwrap_or(Value::String(text))
        }
        DuckValue::Text(s) => Value::String(s),
        other => Value::String(format!("{:?}", other)),
    }
}

fn float(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl From<duckdb::Error> for EngineError {
    fn from(err: duckdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("Parser Error") {
            EngineError::Parse(message)
        } else {
            EngineError::Execution(message)
        }
    }
}
