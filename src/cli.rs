//! Command-line surface.
//!
//! Every option also binds a `CSV2SQL_*` environment variable, so the tool
//! can be driven entirely from the environment in scripted pipelines.
//! [`Cli::into_options`] resolves the raw arguments into a validated
//! [`ConvertOptions`], sanitizing user-supplied column names so they match
//! the sanitized headers.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::{identifier, io_utils, options::ConvertOptions};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert CSV files into MySQL CREATE TABLE and INSERT statements", long_about = None)]
pub struct Cli {
    /// Input CSV file to convert
    #[arg(short = 'i', long = "input", env = "CSV2SQL_INPUTFILE")]
    pub input: PathBuf,
    /// Table name to hold the CSV data
    #[arg(short = 't', long = "table", env = "CSV2SQL_TABLENAME")]
    pub table: String,
    /// Primary key columns of the table
    #[arg(short = 'k', long = "primary-key", env = "CSV2SQL_PRIMARYKEYS", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub primary_keys: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|'); inferred
    /// from the file extension when omitted
    #[arg(short = 'd', long, env = "CSV2SQL_DELIMITER", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Input has no header row; synthetic column_<n> names are generated
    #[arg(short = 'H', long = "no-header", env = "CSV2SQL_NOHEADER")]
    pub no_header: bool,
    /// Emit one INSERT statement per row instead of batches
    #[arg(short = 'B', long = "no-batch-insert", env = "CSV2SQL_NOBATCHINSERT")]
    pub no_batch_insert: bool,
    /// Maximum rows per batched INSERT statement
    #[arg(long = "batch-size", env = "CSV2SQL_BATCHSIZE", default_value_t = 100)]
    pub batch_size: usize,
    /// Default VARCHAR length for text columns
    #[arg(long = "varchar-length", env = "CSV2SQL_VARCHARLENGTH", default_value_t = 255)]
    pub varchar_length: usize,
    /// Text length beyond which a column is promoted to TEXT
    #[arg(long = "text-threshold", env = "CSV2SQL_TEXTTHRESHOLD", default_value_t = 500)]
    pub text_threshold: usize,
    /// Maximum rows sampled when inferring column types
    #[arg(long = "max-sample-size", env = "CSV2SQL_MAXSAMPLESIZE", default_value_t = 1000)]
    pub max_sample_size: usize,
    /// Field value treated as SQL NULL (case-insensitive)
    #[arg(long = "null-string", env = "CSV2SQL_NULLSTRING", default_value = "NULL")]
    pub null_string: String,
    /// Pin a column to a literal SQL type, e.g. `id=INT AUTO_INCREMENT`
    #[arg(long = "force-type", value_name = "COLUMN=TYPE", action = clap::ArgAction::Append)]
    pub force_types: Vec<String>,
    /// Columns to exclude from the generated DDL and DML
    #[arg(long = "skip-column", value_delimiter = ',', action = clap::ArgAction::Append)]
    pub skip_columns: Vec<String>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding", env = "CSV2SQL_INPUTENCODING")]
    pub input_encoding: Option<String>,
    /// Write the generated SQL to this file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Resolves the parsed arguments into immutable conversion options.
    pub fn into_options(self) -> Result<ConvertOptions> {
        let delimiter = io_utils::resolve_input_delimiter(&self.input, self.delimiter);
        let mut options = ConvertOptions {
            input: self.input,
            table_name: self.table,
            primary_keys: sanitize_names(&self.primary_keys),
            delimiter,
            has_header: !self.no_header,
            batch_insert: !self.no_batch_insert,
            batch_size: self.batch_size,
            varchar_length: self.varchar_length,
            text_threshold: self.text_threshold,
            max_sample_size: self.max_sample_size,
            null_string: self.null_string,
            input_encoding: self.input_encoding,
            ..ConvertOptions::default()
        };
        for spec in &self.force_types {
            let (name, sql_type) = spec
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid --force-type '{spec}': expected COLUMN=TYPE"))?;
            let sql_type = sql_type.trim();
            if sql_type.is_empty() {
                return Err(anyhow!("Invalid --force-type '{spec}': type is empty"));
            }
            options
                .force_types
                .insert(identifier::sanitize(name), sql_type.to_string());
        }
        options.skip_columns = sanitize_names(&self.skip_columns).into_iter().collect();
        Ok(options)
    }
}

fn sanitize_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| identifier::sanitize(name))
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
