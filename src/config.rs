//! Configuration for extraction and validation
//!
//! Every knob has a default matching the behaviour callers rely on; a TOML
//! file only needs to name what it changes:
//!
//! ```toml
//! [extract]
//! headerScanRows = 8
//! skipSheets = ["readme", "lookup"]
//!
//! [validation]
//! reportSkippedChecks = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => format!(
                "{self}\n\nHint: Check that {} exists and is readable.",
                path.display()
            ),
            ConfigError::Parse(_) => format!(
                "{self}\n\nHint: Keys use camelCase, e.g. 'headerScanRows' under [extract]."
            ),
        }
    }
}

/// Configuration for the spreadsheet-to-table extractor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractConfig {
    /// Number of leading rows considered as header candidates
    pub header_scan_rows: usize,

    /// Sheet names (compared case-insensitively) that hold definitions or
    /// metadata rather than data
    pub skip_sheets: Vec<String>,

    /// Sheets whose name contains this character are skipped
    pub skip_marker: char,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 5,
            skip_sheets: [
                "readme",
                "schema",
                "definition",
                "definitions",
                "metadata",
                "meta",
                "enums",
                "changelog",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            skip_marker: '#',
        }
    }
}

impl ExtractConfig {
    /// Create a builder for custom configuration
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::default()
    }

    /// Whether a sheet is a definition/metadata sheet to be excluded
    pub fn is_skipped_sheet(&self, name: &str) -> bool {
        let trimmed = name.trim();
        trimmed.contains(self.skip_marker)
            || self
                .skip_sheets
                .iter()
                .any(|s| s.to_lowercase() == trimmed.to_lowercase())
    }
}

/// Builder for ExtractConfig
#[derive(Debug, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Set how many leading rows are scanned for the header (at least 1)
    pub fn header_scan_rows(mut self, rows: usize) -> Self {
        self.config.header_scan_rows = rows.max(1);
        self
    }

    /// Replace the skip list
    pub fn skip_sheets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.skip_sheets = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip_marker(mut self, marker: char) -> Self {
        self.config.skip_marker = marker;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

/// Configuration for the integrity validator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Declared base types whose values must parse as numbers
    pub numeric_types: Vec<String>,

    /// Key parts treated as "no value" when checking uniqueness
    pub placeholder_values: Vec<String>,

    /// Emit info issues for checks skipped because a referenced table,
    /// key column or loaded data set is missing
    pub report_skipped_checks: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            numeric_types: [
                "int", "integer", "bigint", "smallint", "tinyint", "mediumint", "int2", "int4",
                "int8", "serial", "bigserial", "smallserial", "float", "float4", "float8",
                "double", "real", "decimal", "numeric", "number", "money",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            placeholder_values: ["-", "null", "n/a", "none"]
                .into_iter()
                .map(String::from)
                .collect(),
            report_skipped_checks: false,
        }
    }
}

impl ValidationConfig {
    /// Create a builder for custom configuration
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    /// Whether a declared base type (already lower-cased) is numeric
    pub fn is_numeric_type(&self, base_type: &str) -> bool {
        self.numeric_types.iter().any(|t| t.eq_ignore_ascii_case(base_type))
    }

    /// Whether a key part counts as absent
    pub fn is_placeholder(&self, value: &str) -> bool {
        value.is_empty()
            || self
                .placeholder_values
                .iter()
                .any(|p| p.eq_ignore_ascii_case(value))
    }
}

/// Builder for ValidationConfig
#[derive(Debug, Default)]
pub struct ValidationConfigBuilder {
    config: ValidationConfig,
}

impl ValidationConfigBuilder {
    /// Replace the numeric type keyword list
    pub fn numeric_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.numeric_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the placeholder list
    pub fn placeholder_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.placeholder_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn report_skipped_checks(mut self, report: bool) -> Self {
        self.config.report_skipped_checks = report;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ValidationConfig {
        self.config
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub extract: ExtractConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
