//! Enumeration model for schema-declared value sets

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A named enumeration; columns whose declared type equals the enum name
/// are restricted to its value names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|v| EnumValue {
                    name: v.into(),
                    note: None,
                })
                .collect(),
        }
    }

    /// Whether `value` names one of the enum values, ignoring case
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| super::same_name(&v.name, value))
    }
}
