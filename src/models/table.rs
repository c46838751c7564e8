//! Table model for schema tables

use super::column::Column;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(deserialize_with = "super::deserialize_table_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let name = name.into();
        let id = Self::generate_id(&name);
        Self {
            id,
            name,
            columns,
            group_name: None,
            note: None,
            alias: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_name = Some(group.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Generate a deterministic UUID v5 for a table from its name
    ///
    /// The same name always yields the same id, so references built by
    /// name before the table exists still resolve.
    pub fn generate_id(name: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("table:{name}").as_bytes())
    }

    /// Find a column by name, ignoring case
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| super::same_name(&c.name, name))
    }

    /// Columns flagged as primary key, in declaration order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_pk).collect()
    }

    pub fn pk_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_pk).count()
    }

    pub fn fk_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_fk).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_deterministic() {
        assert_eq!(Table::generate_id("Character"), Table::generate_id("Character"));
        assert_ne!(Table::generate_id("Character"), Table::generate_id("Skill"));
        assert_eq!(Table::new("Character", vec![]).id, Table::generate_id("Character"));
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let table = Table::new(
            "Character",
            vec![Column::new("Id", "int").primary_key(), Column::new("Name", "text")],
        );
        assert_eq!(table.column("id").map(|c| c.name.as_str()), Some("Id"));
        assert_eq!(table.column("NAME").map(|c| c.name.as_str()), Some("Name"));
        assert!(table.column("level").is_none());
        assert_eq!(table.pk_count(), 1);
        assert_eq!(table.fk_count(), 0);
    }
}
