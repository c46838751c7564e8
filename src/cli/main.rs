//! sheetql command line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use sheetql::cli::CliError;
use sheetql::cli::commands::{
    DataSource, extract::handle_extract, load_config, query::handle_meta, query::handle_query,
    validate::handle_validate,
};
use sheetql::cli::output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetql", author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query loaded tables
    Query {
        /// SQL text; several statements may be separated by `;`
        sql: String,
        /// Schema JSON file, used to resolve table names ("-" for stdin)
        #[arg(short, long)]
        schema: Option<String>,
        /// Extracted tables JSON file ("-" for stdin)
        #[arg(short, long)]
        data: Option<String>,
        /// Decoded sheets JSON file ("-" for stdin)
        #[arg(long)]
        sheets: Option<String>,
    },
    /// Query the schema through the tables, columns, refs and enums tables
    Meta {
        sql: String,
        /// Schema JSON file ("-" for stdin)
        #[arg(short, long)]
        schema: String,
    },
    /// Validate loaded tables against the schema
    Validate {
        /// Schema JSON file ("-" for stdin)
        #[arg(short, long)]
        schema: String,
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long)]
        sheets: Option<String>,
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
    /// Detect headers and extract tables from decoded sheets
    Extract {
        /// Decoded sheets JSON file ("-" for stdin)
        sheets: String,
        #[arg(short, long)]
        schema: Option<String>,
    },
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Query {
            sql,
            schema,
            data,
            sheets,
        } => handle_query(
            schema.as_deref(),
            &DataSource { data, sheets },
            &sql,
            &config,
            args.format,
        ),
        Command::Meta { sql, schema } => handle_meta(&schema, &sql, args.format),
        Command::Validate {
            schema,
            data,
            sheets,
            strict,
        } => handle_validate(
            &schema,
            &DataSource { data, sheets },
            &config,
            strict,
            args.format,
        ),
        Command::Extract { sheets, schema } => {
            handle_extract(&sheets, schema.as_deref(), &config, args.format)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    run(args).map_err(|err| anyhow::anyhow!(err.user_message()))
}
