//! Command implementations

pub mod extract;
pub mod query;
pub mod validate;

use crate::cli::error::CliError;
use crate::config::EngineConfig;
use crate::extract::SheetExtractor;
use crate::models::{RawSheet, Schema, TableDataMap};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where a command gets its tables from
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    /// JSON map of extracted tables
    pub data: Option<String>,
    /// JSON array of decoded sheets, extracted before use
    pub sheets: Option<String>,
}

/// Load input content from file or stdin
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

fn load_json<T: DeserializeOwned>(input: &str, what: &str) -> Result<T, CliError> {
    let content = load_input(input)?;
    serde_json::from_str(&content).map_err(|e| CliError::ParseError {
        what: what.to_string(),
        reason: e.to_string(),
    })
}

pub fn load_schema(input: &str) -> Result<Schema, CliError> {
    load_json(input, "schema")
}

pub fn load_sheets(input: &str) -> Result<Vec<RawSheet>, CliError> {
    load_json(input, "sheets")
}

/// Configuration from `path`, or defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_toml_file(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Resolve the tables a command runs over
pub fn load_tables(
    source: &DataSource,
    schema: Option<&Schema>,
    config: &EngineConfig,
) -> Result<TableDataMap, CliError> {
    if source.data.is_none() && source.sheets.is_none() {
        return Err(CliError::InvalidArgument(
            "either --data or --sheets is required".to_string(),
        ));
    }
    if [&source.data, &source.sheets]
        .iter()
        .filter(|s| s.as_deref() == Some("-"))
        .count()
        > 1
    {
        return Err(CliError::InvalidArgument(
            "only one input can be read from stdin".to_string(),
        ));
    }

    let mut tables = match &source.data {
        Some(input) => load_json(input, "data")?,
        None => TableDataMap::new(),
    };
    if let Some(input) = &source.sheets {
        let sheets = load_sheets(input)?;
        let mut extractor = SheetExtractor::new(config.extract.clone());
        if let Some(schema) = schema {
            extractor = extractor.with_schema(schema);
        }
        tables.extend(extractor.extract_workbook(&sheets).tables);
    }
    Ok(tables)
}
