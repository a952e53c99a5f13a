//! Conversion orchestration: headers → types → serialized rows → SQL text.
//!
//! [`Converter`] drives the two passes over the input. The sampling pass
//! is lenient (short or long rows are warned about and skipped), the
//! serialization pass is strict (a mismatched row aborts the conversion).
//! Output is fully buffered in [`Conversion`]; a fatal error returns no
//! partial text.

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::{
    identifier, infer,
    io_utils::{self, CsvSource},
    options::ConvertOptions,
    sql::{self, InsertBuilder},
    types::TypeTag,
};

/// The fully assembled output of one conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub create_table: String,
    pub inserts: String,
    pub columns: Vec<String>,
    pub types: Vec<TypeTag>,
    pub rows_emitted: usize,
    pub rows_skipped_sampling: usize,
}

pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Runs the conversion end to end, producing the DDL and DML text.
    pub fn convert(&self) -> Result<Conversion> {
        let encoding = io_utils::resolve_encoding(self.options.input_encoding.as_deref())?;
        let source = CsvSource::new(
            &self.options.input,
            self.options.delimiter,
            self.options.has_header,
            encoding,
        );

        let headers = self.read_headers(&source)?;
        let (types, report) = infer::resolve_column_types(&source, &headers, &self.options)
            .context("Determining column types")?;
        info!(
            "Resolved {} column(s) from {} sampled row(s)",
            headers.len(),
            report.rows_sampled
        );

        let create_table = sql::create_table(
            &self.options.table_name,
            &headers,
            &types,
            &self.options.primary_keys,
        );

        // Second pass over all data rows, from the top.
        let (inserts, rows_emitted) = self
            .generate_inserts(&source, &headers, &types)
            .context("Generating insert statements")?;

        Ok(Conversion {
            create_table,
            inserts,
            columns: headers,
            types,
            rows_emitted,
            rows_skipped_sampling: report.rows_skipped,
        })
    }

    /// Sanitized column names, from the header row or synthesized
    /// `column_<n>` names when the file has none.
    fn read_headers(&self, source: &CsvSource) -> Result<Vec<String>> {
        let mut reader = source.reader()?;
        if self.options.has_header {
            let raw = reader.byte_headers().context("Reading header row")?.clone();
            if raw.len() == 0 {
                return Err(anyhow!("Input contains no header row"));
            }
            let decoded = io_utils::decode_record(&raw, source.encoding())
                .context("Decoding header row")?;
            Ok(identifier::sanitize_headers(&decoded))
        } else {
            let mut record = csv::ByteRecord::new();
            let has_row = reader
                .read_byte_record(&mut record)
                .context("Reading first row")?;
            if !has_row {
                return Err(anyhow!("Input contains no rows"));
            }
            Ok((0..record.len())
                .map(identifier::synthetic_column_name)
                .collect())
        }
    }

    fn generate_inserts(
        &self,
        source: &CsvSource,
        headers: &[String],
        types: &[TypeTag],
    ) -> Result<(String, usize)> {
        let mut reader = source.reader()?;
        let mut builder = InsertBuilder::new(&self.options, headers, types);
        let mut rows_emitted = 0usize;

        for (row_number, result) in reader.byte_records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    warn!("Skipping malformed record during serialization: {err}");
                    continue;
                }
            };
            let fields = io_utils::decode_record(&record, source.encoding())
                .with_context(|| format!("Decoding data row {}", row_number + 1))?;
            let values = sql::serialize_row(&fields, types, &self.options)
                .with_context(|| format!("Serializing data row {}", row_number + 1))?;
            builder.push_row(&values);
            rows_emitted += 1;
        }

        Ok((builder.finish(), rows_emitted))
    }
}
