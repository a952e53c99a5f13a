//! Column type resolution over a bounded sample of rows.
//!
//! Columns start at a forced type, `SKIP`, or the base VARCHAR, and are
//! widened through [`crate::types::refine`] as sampled values arrive. Only
//! the first `max_sample_size` well-shaped rows participate; rows beyond
//! the window are never reconsidered.

use anyhow::Result;
use log::{debug, warn};

use crate::{
    io_utils::{self, CsvSource},
    options::ConvertOptions,
    types::TypeTag,
};

/// Outcome of the sampling pass, kept for caller-side reporting.
#[derive(Debug, Clone, Default)]
pub struct SampleReport {
    pub rows_sampled: usize,
    pub rows_skipped: usize,
}

/// Initial type of every column: forced types take absolute precedence,
/// then the skip set, then the base VARCHAR.
pub fn initial_types(headers: &[String], options: &ConvertOptions) -> Vec<TypeTag> {
    headers
        .iter()
        .map(|name| {
            if let Some(forced) = options.force_types.get(name) {
                TypeTag::Forced(forced.clone())
            } else if options.skip_columns.contains(name) {
                TypeTag::Skip
            } else {
                TypeTag::Varchar(options.varchar_length)
            }
        })
        .collect()
}

/// True when sampling cannot change anything: every column is skipped or
/// pinned to a VARCHAR literal.
pub fn all_forced_varchar_or_skipped(types: &[TypeTag]) -> bool {
    types.iter().all(|tag| match tag {
        TypeTag::Skip => true,
        TypeTag::Forced(literal) => literal.trim_start().to_ascii_uppercase().starts_with("VARCHAR"),
        _ => false,
    })
}

/// Resolves one finalized type per column, in header order.
///
/// Reads up to `max_sample_size` rows from a fresh reader on `source`.
/// Rows whose field count differs from the header count are skipped with a
/// warning and do not consume the sample window; malformed CSV records are
/// likewise skipped. Fields that are empty or match the NULL literal never
/// influence classification.
pub fn resolve_column_types(
    source: &CsvSource,
    headers: &[String],
    options: &ConvertOptions,
) -> Result<(Vec<TypeTag>, SampleReport)> {
    let mut types = initial_types(headers, options);
    let mut report = SampleReport::default();

    if all_forced_varchar_or_skipped(&types) {
        debug!("All columns forced or skipped; sampling pass not required");
        return Ok((types, report));
    }

    let mut reader = source.reader()?;
    for result in reader.byte_records() {
        if report.rows_sampled >= options.max_sample_size {
            break;
        }
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping malformed record during sampling: {err}");
                report.rows_skipped += 1;
                continue;
            }
        };
        if record.len() != headers.len() {
            warn!(
                "Skipping row with {} column(s) (expected {})",
                record.len(),
                headers.len()
            );
            report.rows_skipped += 1;
            continue;
        }

        for (idx, field) in record.iter().enumerate() {
            if types[idx].is_skip() || types[idx].is_forced() {
                continue;
            }
            let value = match io_utils::decode_bytes(field, source.encoding()) {
                Ok(value) => value,
                Err(err) => {
                    warn!("Skipping undecodable field in column '{}': {err}", headers[idx]);
                    continue;
                }
            };
            let trimmed = value.trim();
            if options.is_null_literal(trimmed) {
                continue;
            }
            types[idx] = crate::types::refine(types[idx].clone(), trimmed, options);
        }
        report.rows_sampled += 1;
    }

    debug!(
        "Sampled {} row(s), skipped {} for type inference",
        report.rows_sampled, report.rows_skipped
    );
    Ok((types, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_for(contents: &str) -> (NamedTempFile, CsvSource) {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        let source = CsvSource::new(file.path(), b',', true, UTF_8);
        (file, source)
    }

    fn options() -> ConvertOptions {
        ConvertOptions::default()
    }

    #[test]
    fn resolves_the_reference_scenario() {
        let (_file, source) = source_for("id,name,price\n1,Alice,19.99\n2,Bob,\n");
        let headers = vec!["id".to_string(), "name".to_string(), "price".to_string()];
        let (types, report) =
            resolve_column_types(&source, &headers, &options()).expect("resolve");
        assert_eq!(
            types,
            vec![TypeTag::BigInt, TypeTag::Varchar(255), TypeTag::Decimal]
        );
        assert_eq!(report.rows_sampled, 2);
        assert_eq!(report.rows_skipped, 0);
    }

    #[test]
    fn date_and_datetime_widen_to_datetime() {
        let (_file, source) = source_for("when\n2024-01-05\n2024-01-06 10:00:00\n");
        let headers = vec!["when".to_string()];
        let (types, _) = resolve_column_types(&source, &headers, &options()).expect("resolve");
        assert_eq!(types, vec![TypeTag::DateTime]);
    }

    #[test]
    fn forced_types_are_never_refined() {
        let (_file, source) = source_for("id,price\n1,19.99\n");
        let headers = vec!["id".to_string(), "price".to_string()];
        let mut opts = options();
        opts.force_types
            .insert("price".to_string(), "DECIMAL(10,2)".to_string());
        let (types, _) = resolve_column_types(&source, &headers, &opts).expect("resolve");
        assert_eq!(types[0], TypeTag::BigInt);
        assert_eq!(types[1], TypeTag::Forced("DECIMAL(10,2)".to_string()));
    }

    #[test]
    fn skipped_columns_stay_skipped() {
        let (_file, source) = source_for("id,internal_code\n1,abc\n");
        let headers = vec!["id".to_string(), "internal_code".to_string()];
        let mut opts = options();
        opts.skip_columns.insert("internal_code".to_string());
        let (types, _) = resolve_column_types(&source, &headers, &opts).expect("resolve");
        assert_eq!(types[1], TypeTag::Skip);
    }

    #[test]
    fn fast_path_skips_sampling_when_everything_is_pinned() {
        // Nonexistent path: the fast path must return without I/O.
        let source = CsvSource::new(std::path::Path::new("missing.csv"), b',', true, UTF_8);
        let headers = vec!["a".to_string(), "b".to_string()];
        let mut opts = options();
        opts.force_types
            .insert("a".to_string(), "VARCHAR(64)".to_string());
        opts.skip_columns.insert("b".to_string());
        let (types, report) = resolve_column_types(&source, &headers, &opts).expect("fast path");
        assert_eq!(types[0], TypeTag::Forced("VARCHAR(64)".to_string()));
        assert_eq!(types[1], TypeTag::Skip);
        assert_eq!(report.rows_sampled, 0);
    }

    #[test]
    fn mismatched_rows_are_skipped_and_do_not_consume_the_window() {
        let (_file, source) = source_for("id,name\n1\n2,Bob\n3,Carol,extra\n");
        let headers = vec!["id".to_string(), "name".to_string()];
        let (types, report) =
            resolve_column_types(&source, &headers, &options()).expect("resolve");
        assert_eq!(types[0], TypeTag::BigInt);
        assert_eq!(report.rows_sampled, 1);
        assert_eq!(report.rows_skipped, 2);
    }

    #[test]
    fn sampling_stops_at_the_window_bound() {
        let mut contents = String::from("v\n");
        for _ in 0..5 {
            contents.push_str("1\n");
        }
        // Text beyond the window must not widen the column.
        contents.push_str("not a number\n");
        let (_file, source) = source_for(&contents);
        let headers = vec!["v".to_string()];
        let mut opts = options();
        opts.max_sample_size = 5;
        let (types, report) = resolve_column_types(&source, &headers, &opts).expect("resolve");
        assert_eq!(types, vec![TypeTag::BigInt]);
        assert_eq!(report.rows_sampled, 5);
    }

    #[test]
    fn null_literals_do_not_influence_classification() {
        let (_file, source) = source_for("v\nNULL\nnull\n\n42\n");
        let headers = vec!["v".to_string()];
        let (types, _) = resolve_column_types(&source, &headers, &options()).expect("resolve");
        assert_eq!(types, vec![TypeTag::BigInt]);
    }
}
