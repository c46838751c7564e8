//! Column model for schema tables

use serde::{Deserialize, Serialize};

/// Column model representing a declared field of a schema table
///
/// Flags mirror the constraint markers a schema author can attach to a
/// column. The declared `data_type` is advisory: it is matched against
/// enum names and numeric type keywords during validation, never enforced
/// by the query engine.
///
/// # Example
///
/// ```rust
/// use sheetql::models::Column;
///
/// let column = Column::new("id", "int").primary_key();
/// assert!(column.is_pk);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type (e.g. "int", "varchar(255)", or the name of an enum)
    #[serde(rename = "type", default)]
    pub data_type: String,
    /// Whether this column is part of the primary key
    #[serde(rename = "isPK", default)]
    pub is_pk: bool,
    /// Whether this column participates in a foreign key
    #[serde(rename = "isFK", default)]
    pub is_fk: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_not_null: bool,
    /// Default value expression as written in the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Column {
    /// Create a new column with the given name and declared type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    /// Mark the column as (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    /// Mark the column as a foreign key column
    pub fn foreign_key(mut self) -> Self {
        self.is_fk = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Base type keyword, lower-cased, without length/precision arguments
    ///
    /// `"DECIMAL(10, 2)"` becomes `"decimal"`, `"int unsigned"` becomes `"int"`.
    pub fn base_type(&self) -> String {
        let head = self.data_type.split('(').next().unwrap_or_default();
        head.split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_strips_arguments() {
        assert_eq!(Column::new("price", "DECIMAL(10, 2)").base_type(), "decimal");
        assert_eq!(Column::new("n", "int unsigned").base_type(), "int");
        assert_eq!(Column::new("n", "").base_type(), "");
    }

    #[test]
    fn test_column_serde_uses_schema_field_names() {
        let column = Column::new("id", "int").primary_key().not_null();
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "int");
        assert_eq!(json["isPK"], true);
        assert_eq!(json["isFK"], false);
        assert_eq!(json["isNotNull"], true);
        assert!(json.get("default").is_none());

        let back: Column = serde_json::from_value(json).unwrap();
        assert_eq!(back, column);
    }
}
