//! Data table registration
//!
//! Binds loaded tables into a fresh [`TableCatalog`] for one execution.
//! Every table is reachable under its display name, lower-cased and
//! upper-cased, unless the name is reserved, in which case only the
//! internal alias is bound.

use super::metadata::metadata_tables;
use super::reserved::ReservedNameMap;
use crate::engine::{CatalogColumn, CatalogTable, ColumnKind, TableCatalog};
use crate::models::{Schema, TableData, TableDataMap};
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// A table as bound for one execution
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTable {
    /// Key the data was stored under
    pub source: String,
    /// Resolved display name (schema casing when the schema knows the table)
    pub name: String,
    /// Every catalog name the table was bound under
    pub bound_as: Vec<String>,
}

/// Catalog plus the reserved-name mapping that produced it
#[derive(Debug, Default)]
pub struct Registration {
    pub catalog: TableCatalog,
    pub reserved: ReservedNameMap,
    pub tables: Vec<RegisteredTable>,
}

impl Registration {
    fn bind(&mut self, source: &str, name: &str, table: CatalogTable) {
        let table = Rc::new(table);
        let bound_as = match self.reserved.register(name) {
            Some(alias) => vec![alias],
            None => {
                let mut names = vec![name.to_string()];
                for variant in [name.to_lowercase(), name.to_uppercase()] {
                    if !names.contains(&variant) {
                        names.push(variant);
                    }
                }
                names
            }
        };
        for bound in &bound_as {
            self.catalog.register(bound.clone(), Rc::clone(&table));
        }
        debug!(source, name, bound = ?bound_as, "Registered table");
        self.tables.push(RegisteredTable {
            source: source.to_string(),
            name: name.to_string(),
            bound_as,
        });
    }
}

/// Register the four virtual metadata tables of `schema`
pub fn register_metadata(schema: &Schema) -> Registration {
    let mut registration = Registration::default();
    for (name, table) in metadata_tables(schema) {
        registration.bind(name, name, table);
    }
    registration
}

/// Register every loaded table, resolving names against `schema` when given
pub fn register_data(schema: Option<&Schema>, data: &TableDataMap) -> Registration {
    let mut registration = Registration::default();
    for (key, table) in data {
        let name = schema
            .and_then(|s| s.find_table(key).or_else(|| s.find_table(&table.name)))
            .map(|t| t.name.clone())
            .unwrap_or_else(|| key.clone());
        registration.bind(key, &name, catalog_table(table));
    }
    registration
}

/// Convert loaded rows into a typed catalog table
///
/// Column names are the lower-cased headers, de-duplicated with a numeric
/// suffix when two headers differ only in case.
pub fn catalog_table(data: &TableData) -> CatalogTable {
    let names = lowercase_headers(&data.headers);
    let kinds: Vec<ColumnKind> = data
        .headers
        .iter()
        .map(|h| infer_kind(data.rows.iter().filter_map(|r| r.get(h))))
        .collect();

    let rows = data
        .rows
        .iter()
        .map(|row| {
            data.headers
                .iter()
                .zip(&kinds)
                .map(|(header, kind)| cell_value(row.get(header).map(String::as_str), *kind))
                .collect()
        })
        .collect();

    CatalogTable {
        columns: names
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| CatalogColumn::new(name, kind))
            .collect(),
        rows,
    }
}

fn lowercase_headers(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .map(|h| {
            let base = h.trim().to_lowercase();
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

fn infer_kind<'a>(values: impl Iterator<Item = &'a String>) -> ColumnKind {
    let mut kind = None;
    for value in values.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        let this = if parse_integer(value).is_some() {
            ColumnKind::Integer
        } else if parse_real(value).is_some() {
            ColumnKind::Real
        } else {
            return ColumnKind::Text;
        };
        kind = match (kind, this) {
            (Some(ColumnKind::Real), _) | (_, ColumnKind::Real) => Some(ColumnKind::Real),
            _ => Some(ColumnKind::Integer),
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

/// Integers written without leading zeros or sign noise (`007` stays text)
fn parse_integer(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_real(value: &str) -> Option<f64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.") {
        return None;
    }
    value.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn cell_value(value: Option<&str>, kind: ColumnKind) -> Value {
    let Some(value) = value else {
        return Value::Null;
    };
    match kind {
        ColumnKind::Text => Value::from(value),
        ColumnKind::Integer => parse_integer(value.trim())
            .map(Value::from)
            .unwrap_or(Value::Null),
        ColumnKind::Real => parse_real(value.trim())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Table};

    fn data() -> TableDataMap {
        let mut data = TableDataMap::new();
        data.insert(
            "characters".to_string(),
            TableData::from_values(
                "characters",
                ["ID", "Name", "Power"],
                [vec!["1", "Ayla", "1.5"], vec!["2", "Brin", ""]],
            ),
        );
        data.insert(
            "Index".to_string(),
            TableData::from_values("Index", ["id"], [vec!["1"]]),
        );
        data
    }

    #[test]
    fn test_plain_names_bound_in_three_casings() {
        let registration = register_data(None, &data());
        let catalog = &registration.catalog;
        assert!(catalog.contains("characters"));
        assert!(catalog.contains("CHARACTERS"));
        assert!(!catalog.contains("Index"));
        assert!(catalog.contains("_tbl_index"));
        assert_eq!(registration.reserved.len(), 1);
    }

    #[test]
    fn test_schema_casing_wins() {
        let schema = Schema::new(
            vec![Table::new("Characters", vec![Column::new("id", "int")])],
            vec![],
            vec![],
        );
        let registration = register_data(Some(&schema), &data());
        assert!(registration.catalog.contains("Characters"));
        assert!(registration.catalog.contains("characters"));
        assert_eq!(registration.tables[1].name, "Characters");
        assert_eq!(registration.tables[1].source, "characters");
    }

    #[test]
    fn test_column_kinds_inferred() {
        let data = data();
        let table = catalog_table(&data["characters"]);
        let kinds: Vec<_> = table.columns.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("id", ColumnKind::Integer),
                ("name", ColumnKind::Text),
                ("power", ColumnKind::Real),
            ]
        );
        assert_eq!(table.rows[1][2], Value::Null);
        assert_eq!(table.rows[0][0], Value::from(1));
    }

    #[test]
    fn test_leading_zeros_stay_text() {
        assert_eq!(infer_kind(["007".to_string()].iter()), ColumnKind::Text);
        assert_eq!(infer_kind(["0".to_string(), "-3".to_string()].iter()), ColumnKind::Integer);
        assert_eq!(infer_kind(["0.5".to_string()].iter()), ColumnKind::Real);
        assert_eq!(infer_kind(["NaN".to_string()].iter()), ColumnKind::Text);
        assert_eq!(infer_kind(std::iter::empty()), ColumnKind::Text);
    }

    #[test]
    fn test_headers_differing_in_case_are_kept_apart() {
        assert_eq!(
            lowercase_headers(&["Name".to_string(), "name".to_string(), "NAME".to_string()]),
            vec!["name", "name_2", "name_3"]
        );
    }

    #[test]
    fn test_metadata_tables_registered() {
        let registration = register_metadata(&Schema::default());
        for name in ["tables", "columns", "refs", "enums"] {
            assert!(registration.catalog.contains(name), "{name}");
        }
        assert!(registration.reserved.is_empty());
    }
}
