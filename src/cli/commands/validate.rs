//! Validate command implementation

use super::{DataSource, load_schema, load_tables};
use crate::cli::error::CliError;
use crate::cli::output::{OutputFormat, format_validation};
use crate::config::EngineConfig;
use crate::validation::IntegrityValidator;

/// Handle the validate command
///
/// Fails when the data has errors, or warnings too with `strict`.
pub fn handle_validate(
    schema: &str,
    source: &DataSource,
    config: &EngineConfig,
    strict: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let schema = load_schema(schema)?;
    let tables = load_tables(source, Some(&schema), config)?;
    let result = IntegrityValidator::new(config.validation.clone()).validate(&schema, &tables);

    println!("{}", format_validation(&result, format)?);

    let failing = result.error_count() + if strict { result.warning_count() } else { 0 };
    if failing > 0 {
        return Err(CliError::Failed(format!(
            "Validation failed with {} issue(s), score {}",
            failing, result.score
        )));
    }
    Ok(())
}
