//! Query and meta command implementations

use super::{DataSource, load_schema, load_tables};
use crate::cli::error::CliError;
use crate::cli::output::{OutputFormat, format_query};
use crate::config::EngineConfig;
use crate::query::{QueryExecutor, QueryResult};

/// Handle the meta command: query the schema's own structure
pub fn handle_meta(schema: &str, sql: &str, format: OutputFormat) -> Result<(), CliError> {
    let schema = load_schema(schema)?;
    let result = QueryExecutor::duckdb().query_metadata(&schema, sql);
    report(&result, format)
}

/// Handle the query command: query loaded tables
pub fn handle_query(
    schema: Option<&str>,
    source: &DataSource,
    sql: &str,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<(), CliError> {
    let schema = schema.map(load_schema).transpose()?;
    let tables = load_tables(source, schema.as_ref(), config)?;
    let result = QueryExecutor::duckdb().query_data(schema.as_ref(), &tables, sql);
    report(&result, format)
}

fn report(result: &QueryResult, format: OutputFormat) -> Result<(), CliError> {
    println!("{}", format_query(result, format)?);
    match &result.error {
        Some(error) => Err(CliError::Failed(error.clone())),
        None => Ok(()),
    }
}
