//! Schema model: the declared structure queries and validation run against

use super::enumeration::EnumType;
use super::relationship::Relationship;
use super::table::Table;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declarative schema produced by the schema-text parser
///
/// Read-only to this crate. Lookups by name are case-insensitive because
/// sheet names and query text rarely match the declared casing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub refs: Vec<Relationship>,
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

impl Schema {
    pub fn new(tables: Vec<Table>, refs: Vec<Relationship>, enums: Vec<EnumType>) -> Self {
        Self {
            tables,
            refs,
            enums,
        }
    }

    pub fn table_by_id(&self, id: Uuid) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Find a table by name, ignoring case
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| super::same_name(&t.name, name))
    }

    /// Find the enum a declared column type refers to, ignoring case
    ///
    /// A schema-qualified type (`core.status`) also matches an enum named
    /// by its last segment.
    pub fn find_enum(&self, type_name: &str) -> Option<&EnumType> {
        let type_name = type_name.trim();
        if type_name.is_empty() {
            return None;
        }
        self.enums
            .iter()
            .find(|e| super::same_name(&e.name, type_name))
            .or_else(|| {
                let (_, last) = type_name.rsplit_once('.')?;
                self.enums.iter().find(|e| super::same_name(&e.name, last))
            })
    }

    /// Display name of a table id; dangling ids render as the raw id
    pub fn table_name(&self, id: Uuid) -> String {
        self.table_by_id(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
