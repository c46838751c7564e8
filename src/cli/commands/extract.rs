//! Extract command implementation

use super::{load_schema, load_sheets};
use crate::cli::error::CliError;
use crate::cli::output::{OutputFormat, format_extract};
use crate::config::EngineConfig;
use crate::extract::SheetExtractor;

/// Handle the extract command: decoded sheets in, tables out
pub fn handle_extract(
    sheets: &str,
    schema: Option<&str>,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<(), CliError> {
    let sheets = load_sheets(sheets)?;
    let schema = schema.map(load_schema).transpose()?;

    let mut extractor = SheetExtractor::new(config.extract.clone());
    if let Some(schema) = &schema {
        extractor = extractor.with_schema(schema);
    }
    let report = extractor.extract_workbook(&sheets);

    println!("{}", format_extract(&report, format)?);
    eprintln!("{}", report.summary());
    Ok(())
}
