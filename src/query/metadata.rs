//! Virtual metadata tables
//!
//! Exposes the schema itself to the query language through four read-only
//! tables. They are rebuilt from the schema on every metadata query.
//!
//! | table     | columns |
//! |-----------|---------|
//! | `tables`  | name, group_name, column_count, pk_count, fk_count, note, alias |
//! | `columns` | table_name, column_name, data_type, is_pk, is_fk, is_unique, is_not_null, default_value, note |
//! | `refs`    | from_table, from_columns, to_table, to_columns, relationship |
//! | `enums`   | enum_name, value, note |

use crate::engine::{CatalogColumn, CatalogTable, ColumnKind};
use crate::models::Schema;
use serde_json::Value;

pub const TABLES_TABLE: &str = "tables";
pub const COLUMNS_TABLE: &str = "columns";
pub const REFS_TABLE: &str = "refs";
pub const ENUMS_TABLE: &str = "enums";

/// The four metadata tables, keyed by their public names
pub fn metadata_tables(schema: &Schema) -> Vec<(&'static str, CatalogTable)> {
    vec![
        (TABLES_TABLE, tables_table(schema)),
        (COLUMNS_TABLE, columns_table(schema)),
        (REFS_TABLE, refs_table(schema)),
        (ENUMS_TABLE, enums_table(schema)),
    ]
}

fn text(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn flag(set: bool) -> Value {
    Value::from(i64::from(set))
}

fn columns(spec: &[(&str, ColumnKind)]) -> Vec<CatalogColumn> {
    spec.iter()
        .map(|(name, kind)| CatalogColumn::new(*name, *kind))
        .collect()
}

fn tables_table(schema: &Schema) -> CatalogTable {
    CatalogTable {
        columns: columns(&[
            ("name", ColumnKind::Text),
            ("group_name", ColumnKind::Text),
            ("column_count", ColumnKind::Integer),
            ("pk_count", ColumnKind::Integer),
            ("fk_count", ColumnKind::Integer),
            ("note", ColumnKind::Text),
            ("alias", ColumnKind::Text),
        ]),
        rows: schema
            .tables
            .iter()
            .map(|t| {
                vec![
                    Value::from(t.name.as_str()),
                    text(t.group_name.as_deref()),
                    Value::from(t.columns.len()),
                    Value::from(t.pk_count()),
                    Value::from(t.fk_count()),
                    text(t.note.as_deref()),
                    text(t.alias.as_deref()),
                ]
            })
            .collect(),
    }
}

fn columns_table(schema: &Schema) -> CatalogTable {
    CatalogTable {
        columns: columns(&[
            ("table_name", ColumnKind::Text),
            ("column_name", ColumnKind::Text),
            ("data_type", ColumnKind::Text),
            ("is_pk", ColumnKind::Integer),
            ("is_fk", ColumnKind::Integer),
            ("is_unique", ColumnKind::Integer),
            ("is_not_null", ColumnKind::Integer),
            ("default_value", ColumnKind::Text),
            ("note", ColumnKind::Text),
        ]),
        rows: schema
            .tables
            .iter()
            .flat_map(|t| {
                t.columns.iter().map(move |c| {
                    vec![
                        Value::from(t.name.as_str()),
                        Value::from(c.name.as_str()),
                        Value::from(c.data_type.as_str()),
                        flag(c.is_pk),
                        flag(c.is_fk),
                        flag(c.is_unique),
                        flag(c.is_not_null),
                        text(c.default.as_deref()),
                        text(c.note.as_deref()),
                    ]
                })
            })
            .collect(),
    }
}

fn refs_table(schema: &Schema) -> CatalogTable {
    CatalogTable {
        columns: columns(&[
            ("from_table", ColumnKind::Text),
            ("from_columns", ColumnKind::Text),
            ("to_table", ColumnKind::Text),
            ("to_columns", ColumnKind::Text),
            ("relationship", ColumnKind::Text),
        ]),
        rows: schema
            .refs
            .iter()
            .map(|r| {
                vec![
                    Value::from(schema.table_name(r.from_table)),
                    Value::from(r.from_columns.join(",")),
                    Value::from(schema.table_name(r.to_table)),
                    Value::from(r.to_columns.join(",")),
                    Value::from(r.kind.to_string()),
                ]
            })
            .collect(),
    }
}

fn enums_table(schema: &Schema) -> CatalogTable {
    CatalogTable {
        columns: columns(&[
            ("enum_name", ColumnKind::Text),
            ("value", ColumnKind::Text),
            ("note", ColumnKind::Text),
        ]),
        rows: schema
            .enums
            .iter()
            .flat_map(|e| {
                e.values.iter().map(move |v| {
                    vec![
                        Value::from(e.name.as_str()),
                        Value::from(v.name.as_str()),
                        text(v.note.as_deref()),
                    ]
                })
            })
            .collect(),
    }
}
