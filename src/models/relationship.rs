//! Relationship model for schema references

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cardinality of a reference between two tables
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    #[default]
    ManyToOne,
    ManyToMany,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::OneToOne => write!(f, "one-to-one"),
            RelationshipKind::OneToMany => write!(f, "one-to-many"),
            RelationshipKind::ManyToOne => write!(f, "many-to-one"),
            RelationshipKind::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// A declared reference between columns of two schema tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(deserialize_with = "super::deserialize_table_id")]
    pub from_table: Uuid,
    #[serde(default)]
    pub from_columns: Vec<String>,
    #[serde(deserialize_with = "super::deserialize_table_id")]
    pub to_table: Uuid,
    #[serde(default)]
    pub to_columns: Vec<String>,
    #[serde(default)]
    pub kind: RelationshipKind,
}

/// The two ends of a reference, oriented from the referencing side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForeignKeySide<'a> {
    pub table: Uuid,
    pub columns: &'a [String],
    pub referenced_table: Uuid,
    pub referenced_columns: &'a [String],
}

impl Relationship {
    pub fn new(
        from_table: Uuid,
        from_columns: Vec<String>,
        to_table: Uuid,
        to_columns: Vec<String>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            from_table,
            from_columns,
            to_table,
            to_columns,
            kind,
        }
    }

    /// Single-column many-to-one reference, the common `child.fk > parent.pk` shape
    pub fn many_to_one(
        from_table: Uuid,
        from_column: impl Into<String>,
        to_table: Uuid,
        to_column: impl Into<String>,
    ) -> Self {
        Self::new(
            from_table,
            vec![from_column.into()],
            to_table,
            vec![to_column.into()],
            RelationshipKind::ManyToOne,
        )
    }

    /// Orient the reference so that `table`/`columns` hold the foreign key
    ///
    /// A one-to-many reference is written from the referenced side, so its
    /// `to` end carries the foreign key; every other kind keeps `from` as the
    /// referencing side.
    pub fn foreign_key_side(&self) -> ForeignKeySide<'_> {
        match self.kind {
            RelationshipKind::OneToMany => ForeignKeySide {
                table: self.to_table,
                columns: &self.to_columns,
                referenced_table: self.from_table,
                referenced_columns: &self.from_columns,
            },
            _ => ForeignKeySide {
                table: self.from_table,
                columns: &self.from_columns,
                referenced_table: self.to_table,
                referenced_columns: &self.to_columns,
            },
        }
    }
}
