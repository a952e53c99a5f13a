//! I/O utilities: CSV reader construction, delimiter and encoding
//! resolution, byte decoding, and output writing.
//!
//! The conversion makes two passes over the input (type sampling, then
//! serialization). [`CsvSource`] models the rewindable row source both
//! passes share: rewinding is an explicit re-open of the underlying file,
//! positioned past the header row when one is configured.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// A row source that can be re-read from the start of data.
///
/// Each call to [`CsvSource::reader`] re-opens the input; when
/// `has_headers` is set the returned reader positions past the header row,
/// so both conversion passes see data rows only.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
    encoding: &'static Encoding,
}

impl CsvSource {
    pub fn new(path: &Path, delimiter: u8, has_headers: bool, encoding: &'static Encoding) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter,
            has_headers,
            encoding,
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Opens a fresh reader at the start of data rows.
    pub fn reader(&self) -> Result<csv::Reader<BufReader<File>>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Opening input file {:?}", self.path))?;
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .double_quote(true)
            // Field counts are checked per pass: lenient while sampling,
            // strict while serializing.
            .flexible(true);
        Ok(builder.from_reader(BufReader::new(file)))
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Writes the rendered SQL to `path`, or stdout when omitted or `-`.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(p) if !is_dash(p) => {
            let mut writer = BufWriter::new(
                File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
            );
            writer
                .write_all(text.as_bytes())
                .with_context(|| format!("Writing output file {p:?}"))?;
            writer.flush().context("Flushing output file")
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("Writing to stdout")
        }
    }
}
