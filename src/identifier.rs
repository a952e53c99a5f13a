//! Column-name sanitization.
//!
//! Turns arbitrary header text into a safe lowercase SQL identifier:
//! non-alphanumeric runs collapse to `_`, leading digits get a `_` prefix,
//! and names that sanitize away entirely fall back to a positional
//! `column_<n>` name supplied by the caller.

use std::sync::LazyLock;

use regex::Regex;

static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("non-identifier pattern"));
static INVALID_LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^a-zA-Z_]").expect("leading-character pattern"));

/// Sanitizes a raw header cell into a lowercase SQL identifier.
///
/// Returns an empty string when nothing survives sanitization; callers
/// substitute [`synthetic_column_name`] in that case.
pub fn sanitize(raw: &str) -> String {
    let cleaned = NON_IDENTIFIER.replace_all(raw.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        return String::new();
    }
    if INVALID_LEADING.is_match(cleaned) {
        format!("_{}", cleaned.to_lowercase())
    } else {
        cleaned.to_lowercase()
    }
}

/// Positional fallback name for headerless files and headers that sanitize
/// to nothing. `index` is 0-based; the name is 1-based.
pub fn synthetic_column_name(index: usize) -> String {
    format!("column_{}", index + 1)
}

/// Sanitizes every header, substituting synthetic names for empty results.
pub fn sanitize_headers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .enumerate()
        .map(|(idx, header)| {
            let name = sanitize(header);
            if name.is_empty() {
                synthetic_column_name(idx)
            } else {
                name
            }
        })
        .collect()
}
