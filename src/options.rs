//! Conversion configuration.
//!
//! [`ConvertOptions`] is built once (from CLI flags, env bindings, or
//! directly in library callers), validated, and never mutated afterwards.
//! All knobs the engine honours live here: batching, VARCHAR sizing, the
//! TEXT promotion threshold, the sampling window, the NULL literal, forced
//! type overrides, and skipped columns.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use anyhow::{Result, ensure};

use crate::io_utils;

/// Immutable conversion settings. Defaults mirror the stock profile:
/// comma-delimited input with a header row, batched inserts of 100 rows,
/// `VARCHAR(255)` base columns promoted to `TEXT` past 500 characters, and
/// a 1000-row sampling window.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub table_name: String,
    /// Primary-key members, sanitized column names, order preserved.
    pub primary_keys: Vec<String>,
    pub delimiter: u8,
    pub has_header: bool,
    pub batch_insert: bool,
    pub batch_size: usize,
    pub varchar_length: usize,
    pub text_threshold: usize,
    pub max_sample_size: usize,
    /// Field value recognized as SQL NULL, compared case-insensitively.
    pub null_string: String,
    /// Sanitized column name -> literal SQL type, bypassing inference.
    pub force_types: BTreeMap<String, String>,
    /// Sanitized names of columns excluded from DDL and DML entirely.
    pub skip_columns: BTreeSet<String>,
    /// Input text encoding label (defaults to UTF-8 when `None`).
    pub input_encoding: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            table_name: String::new(),
            primary_keys: Vec::new(),
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            has_header: true,
            batch_insert: true,
            batch_size: 100,
            varchar_length: 255,
            text_threshold: 500,
            max_sample_size: 1000,
            null_string: "NULL".to_string(),
            force_types: BTreeMap::new(),
            skip_columns: BTreeSet::new(),
            input_encoding: None,
        }
    }
}

impl ConvertOptions {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.input.as_os_str().is_empty(),
            "An input file is required"
        );
        ensure!(
            !io_utils::is_dash(&self.input),
            "Reading from stdin is not supported: type inference rewinds the input, which requires a file path"
        );
        ensure!(
            !self.table_name.trim().is_empty(),
            "A table name is required"
        );
        ensure!(self.batch_size >= 1, "Batch size must be at least 1");
        ensure!(
            self.varchar_length >= 1,
            "Varchar length must be at least 1"
        );
        ensure!(
            self.text_threshold >= 1,
            "Text threshold must be at least 1"
        );
        ensure!(
            self.max_sample_size >= 1,
            "Max sample size must be at least 1"
        );
        Ok(())
    }

    /// True when a trimmed field should serialize as SQL NULL.
    pub fn is_null_literal(&self, trimmed: &str) -> bool {
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case(&self.null_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_options() -> ConvertOptions {
        ConvertOptions {
            input: PathBuf::from("input.csv"),
            table_name: "my_table".to_string(),
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn default_profile_matches_stock_settings() {
        let options = ConvertOptions::default();
        assert_eq!(options.delimiter, b',');
        assert!(options.has_header);
        assert!(options.batch_insert);
        assert_eq!(options.batch_size, 100);
        assert_eq!(options.varchar_length, 255);
        assert_eq!(options.text_threshold, 500);
        assert_eq!(options.max_sample_size, 1000);
        assert_eq!(options.null_string, "NULL");
    }

    #[test]
    fn validate_rejects_missing_table_name() {
        let mut options = valid_options();
        options.table_name = "  ".to_string();
        assert!(options.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut options = valid_options();
        options.batch_size = 0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn validate_rejects_stdin_input() {
        let mut options = valid_options();
        options.input = PathBuf::from("-");
        assert!(options.validate().is_err());
    }

    #[test]
    fn null_literal_matching_is_case_insensitive() {
        let options = valid_options();
        assert!(options.is_null_literal(""));
        assert!(options.is_null_literal("null"));
        assert!(options.is_null_literal("NuLl"));
        assert!(!options.is_null_literal("nil"));
    }
}
