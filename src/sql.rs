//! SQL text assembly: value escaping, row serialization, the CREATE TABLE
//! statement, and batched/single INSERT emission.
//!
//! All output targets the MySQL dialect: backtick-quoted identifiers,
//! `''`-escaped quotes, doubled backslashes, and a fixed
//! InnoDB/utf8mb4 table-options suffix.

use anyhow::{Result, ensure};
use itertools::Itertools;

use crate::{options::ConvertOptions, types::TypeTag};

const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// Escapes a value for inclusion in a single-quoted SQL literal.
pub fn escape_value(value: &str) -> String {
    value.replace('\'', "''").replace('\\', "\\\\")
}

/// Serializes one data row into SQL literals, one per non-skipped column.
///
/// The field count must match the column count; the serialization pass is
/// strict where sampling is lenient, since a misaligned row reaching the
/// output would silently shift values between columns.
pub fn serialize_row(
    fields: &[String],
    types: &[TypeTag],
    options: &ConvertOptions,
) -> Result<Vec<String>> {
    ensure!(
        fields.len() == types.len(),
        "Column count mismatch: expected {}, got {}",
        types.len(),
        fields.len()
    );

    let mut values = Vec::with_capacity(types.len());
    for (field, tag) in fields.iter().zip(types.iter()) {
        if tag.is_skip() {
            continue;
        }
        let trimmed = field.trim();
        if options.is_null_literal(trimmed) {
            values.push("NULL".to_string());
            continue;
        }
        let escaped = escape_value(trimmed);
        if tag.is_numeric() && trimmed.parse::<f64>().is_ok() {
            values.push(escaped);
        } else {
            values.push(format!("'{escaped}'"));
        }
    }
    Ok(values)
}

/// Assembles the CREATE TABLE statement for the non-skipped columns, with
/// an optional PRIMARY KEY clause, closed by the fixed dialect suffix.
pub fn create_table(
    table_name: &str,
    headers: &[String],
    types: &[TypeTag],
    primary_keys: &[String],
) -> String {
    let mut lines: Vec<String> = headers
        .iter()
        .zip(types.iter())
        .filter(|(_, tag)| !tag.is_skip())
        .map(|(name, tag)| format!("  `{name}` {tag}"))
        .collect();

    if !primary_keys.is_empty() {
        let pk_list = primary_keys.iter().map(|pk| format!("`{pk}`")).join(", ");
        lines.push(format!("  PRIMARY KEY ({pk_list})"));
    }

    format!(
        "CREATE TABLE `{table_name}` (\n{}\n) {TABLE_OPTIONS};",
        lines.join(",\n")
    )
}

/// The backtick-quoted column list shared by every INSERT statement.
pub fn insert_columns(headers: &[String], types: &[TypeTag]) -> String {
    headers
        .iter()
        .zip(types.iter())
        .filter(|(_, tag)| !tag.is_skip())
        .map(|(name, _)| format!("`{name}`"))
        .join(", ")
}

/// Accumulates serialized rows into INSERT statements.
///
/// In batch mode, row tuples buffer until the configured batch size and
/// flush as a single multi-row statement; the batch size is a strict upper
/// bound per statement, and any final partial batch flushes on
/// [`InsertBuilder::finish`]. In single-row mode each row emits its own
/// statement immediately.
pub struct InsertBuilder<'a> {
    options: &'a ConvertOptions,
    columns: String,
    buffer: Vec<String>,
    statements: String,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(options: &'a ConvertOptions, headers: &[String], types: &[TypeTag]) -> Self {
        Self {
            options,
            columns: insert_columns(headers, types),
            buffer: Vec::new(),
            statements: String::new(),
        }
    }

    pub fn push_row(&mut self, values: &[String]) {
        let tuple = format!("({})", values.iter().join(", "));
        if self.options.batch_insert {
            self.buffer.push(tuple);
            if self.buffer.len() >= self.options.batch_size {
                self.flush_batch();
            }
        } else {
            self.statements.push_str(&format!(
                "INSERT INTO `{}` ({}) VALUES {tuple};\n",
                self.options.table_name, self.columns
            ));
        }
    }

    fn flush_batch(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.statements.push_str(&format!(
            "INSERT INTO `{}` ({}) VALUES\n{};\n",
            self.options.table_name,
            self.columns,
            self.buffer.join(",\n")
        ));
        self.buffer.clear();
    }

    pub fn finish(mut self) -> String {
        self.flush_batch();
        self.statements
    }
}
