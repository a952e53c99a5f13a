//! SQL column types and the value classifier.
//!
//! [`TypeTag`] is the resolved type of a column. Inference starts every
//! unforced, unskipped column at `VARCHAR(<default>)` and widens it through
//! a total order as sampled values arrive:
//!
//! ```text
//! VARCHAR(n) < VARCHAR(m>n) < TEXT < BIGINT < DECIMAL(20,6) < DATE < DATETIME
//! ```
//!
//! Widening is a join on that order ([`TypeTag::widen`]), so the final type
//! depends only on the multiset of observed values, never on their order.
//! Forced and skipped columns sit outside the ladder and are never refined.

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::options::ConvertOptions;

/// MySQL's VARCHAR capacity ceiling; wider columns become TEXT.
pub const VARCHAR_MAX: usize = 65_535;
/// VARCHAR capacities grow in increments of this many characters.
const VARCHAR_STEP: usize = 50;

/// Recognized date/time shapes, anchored, checked in order:
/// `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYY-MM-DD HH:MM:SS`,
/// `MM/DD/YYYY HH:MM:SS`, and ISO 8601 with optional trailing `Z`.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{2}/\d{2}/\d{4}$",
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$",
        r"^\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}$",
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z?$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("date pattern"))
    .collect()
});

const NUMERIC_KEYWORDS: &[&str] = &[
    "TINYINT", "SMALLINT", "MEDIUMINT", "INT", "INTEGER", "BIGINT", "DECIMAL", "NUMERIC", "FLOAT",
    "DOUBLE",
];

/// The resolved SQL type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// Column is excluded from DDL and DML entirely.
    Skip,
    /// Caller-pinned literal type, emitted verbatim, never refined.
    Forced(String),
    Varchar(usize),
    Text,
    BigInt,
    /// Fractional numbers; renders as `DECIMAL(20,6)`.
    Decimal,
    Date,
    DateTime,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Skip => write!(f, "SKIP"),
            TypeTag::Forced(literal) => write!(f, "{literal}"),
            TypeTag::Varchar(len) => write!(f, "VARCHAR({len})"),
            TypeTag::Text => write!(f, "TEXT"),
            TypeTag::BigInt => write!(f, "BIGINT"),
            TypeTag::Decimal => write!(f, "DECIMAL(20,6)"),
            TypeTag::Date => write!(f, "DATE"),
            TypeTag::DateTime => write!(f, "DATETIME"),
        }
    }
}

impl TypeTag {
    pub fn is_skip(&self) -> bool {
        matches!(self, TypeTag::Skip)
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, TypeTag::Forced(_))
    }

    /// True when values of this column are emitted unquoted (provided they
    /// parse as numbers). Covers inferred numeric types and forced literals
    /// whose leading keyword is a numeric SQL type such as `INT
    /// AUTO_INCREMENT` or `DECIMAL(10,2)`.
    pub fn is_numeric(&self) -> bool {
        match self {
            TypeTag::BigInt | TypeTag::Decimal => true,
            TypeTag::Forced(literal) => {
                let keyword = literal
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .collect::<String>()
                    .to_ascii_uppercase();
                NUMERIC_KEYWORDS.contains(&keyword.as_str())
            }
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TypeTag::Skip | TypeTag::Forced(_) => 0,
            TypeTag::Varchar(_) => 1,
            TypeTag::Text => 2,
            TypeTag::BigInt => 3,
            TypeTag::Decimal => 4,
            TypeTag::Date => 5,
            TypeTag::DateTime => 6,
        }
    }

    /// Joins two tags on the widening ladder. Skipped and forced tags
    /// absorb everything; VARCHARs join by capacity; otherwise the wider
    /// rank wins.
    pub fn widen(self, other: TypeTag) -> TypeTag {
        if self.is_skip() || self.is_forced() {
            return self;
        }
        match (self, other) {
            (TypeTag::Varchar(a), TypeTag::Varchar(b)) => TypeTag::Varchar(a.max(b)),
            (a, b) => {
                if b.rank() > a.rank() {
                    b
                } else {
                    a
                }
            }
        }
    }
}

/// Classifies a single non-empty, non-NULL value. Ordered checks, first
/// match wins: integer, fractional number, date/time shape, then text
/// sized against the VARCHAR/TEXT thresholds.
pub fn classify(value: &str, options: &ConvertOptions) -> TypeTag {
    if value.parse::<i64>().is_ok() {
        return TypeTag::BigInt;
    }
    if value.parse::<f64>().is_ok() {
        return TypeTag::Decimal;
    }
    if matches_date_pattern(value) {
        if value.len() > 10 {
            return TypeTag::DateTime;
        }
        return TypeTag::Date;
    }

    let length = value.chars().count();
    if length > options.text_threshold {
        return TypeTag::Text;
    }
    if length > options.varchar_length {
        let capacity = length.div_ceil(VARCHAR_STEP) * VARCHAR_STEP;
        if capacity > VARCHAR_MAX {
            return TypeTag::Text;
        }
        return TypeTag::Varchar(capacity);
    }
    TypeTag::Varchar(options.varchar_length)
}

/// Refines a column's current type with one more sampled value.
pub fn refine(current: TypeTag, value: &str, options: &ConvertOptions) -> TypeTag {
    current.widen(classify(value, options))
}

pub fn matches_date_pattern(value: &str) -> bool {
    DATE_PATTERNS.iter().any(|pattern| pattern.is_match(value))
}
