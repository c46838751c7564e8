//! Models module
//!
//! Defines the schema model (tables, columns, references, enums) consumed
//! read-only by the engine, and the tabular data extracted from sheets.

pub mod column;
pub mod data;
pub mod enumeration;
pub mod relationship;
pub mod schema;
pub mod table;

pub use column::Column;
pub use data::{RawSheet, Row, TableData, TableDataMap};
pub use enumeration::{EnumType, EnumValue};
pub use relationship::{ForeignKeySide, Relationship, RelationshipKind};
pub use schema::Schema;
pub use table::Table;

use uuid::Uuid;

/// Case-insensitive name comparison used for every schema/data lookup
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Id a non-UUID table id string is read as
pub fn table_id_from_str(value: &str) -> Uuid {
    Uuid::parse_str(value)
        .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("id:{value}").as_bytes()))
}

/// Custom deserializer for table ids that accepts both:
/// - UUID strings, kept as-is
/// - any other id string (e.g. "t1"), mapped to a stable v5 UUID
pub(crate) fn deserialize_table_id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a table id string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if value.trim().is_empty() {
                return Err(E::custom("table id must not be empty"));
            }
            Ok(table_id_from_str(value.trim()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(table_id_from_str(&value.to_string()))
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
