//! Common types used throughout the pipeline
//!
//! Shared enums for source formats, column types, write modes and the
//! aggregate row type, plus the well-known column names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Reader options, keyed by option name (ordered for stable SQL output)
pub type ReadOptions = BTreeMap<String, String>;

// ============================================================================
// Column Names
// ============================================================================

/// Identifier column of the raw relation
pub const ID_COLUMN: &str = "Id";

/// Free-text name column of the raw relation
pub const NAME_COLUMN: &str = "Name";

/// Year column of both relations
pub const DEATH_YEAR_COLUMN: &str = "Death_year";

/// Count column of the result relation
pub const TOTAL_DEATHS_COLUMN: &str = "total_deaths";

/// Placeholder substituted for a missing year before the cast
pub const BLANK_SENTINEL: &str = "Blank";

// ============================================================================
// Source Format
// ============================================================================

/// Format of a source file handed to the engine's reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Delimited text with optional header
    #[default]
    Csv,
    /// Parquet file
    Parquet,
}

impl SourceFormat {
    /// Parse a format name as accepted by the reader
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Parquet => write!(f, "parquet"),
        }
    }
}

// ============================================================================
// Column Types
// ============================================================================

/// Engine column type used as a cast target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 32-bit signed integer
    Integer,
    /// 64-bit float
    Double,
    /// Text
    Varchar,
}

impl ColumnType {
    /// SQL type name
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Varchar => "VARCHAR",
        }
    }
}

/// A resolved column of a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Engine type name (e.g. `BIGINT`, `VARCHAR`)
    pub data_type: String,
    /// Whether the column may hold nulls
    pub nullable: bool,
}

// ============================================================================
// Write Mode
// ============================================================================

/// What to do when the output target already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the prior artifact entirely
    #[default]
    Overwrite,
    /// Fail if anything exists at the target
    ErrorIfExists,
    /// Leave an existing artifact alone and skip the write
    Ignore,
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

impl Compression {
    /// Codec name as understood by the engine's COPY statement
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Snappy => "SNAPPY",
            Self::Zstd => "ZSTD",
            Self::Gzip => "GZIP",
            Self::Uncompressed => "UNCOMPRESSED",
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Placement of nulls within a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrder {
    #[default]
    First,
    Last,
}

// ============================================================================
// Aggregate Row
// ============================================================================

/// One row of the result relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    /// Normalized year, `None` for the missing/unparseable group
    #[serde(rename = "Death_year")]
    pub death_year: Option<i32>,
    /// Number of records in the group
    pub total_deaths: i64,
}

impl YearCount {
    /// Create a row
    pub fn new(death_year: Option<i32>, total_deaths: i64) -> Self {
        Self {
            death_year,
            total_deaths,
        }
    }
}

impl fmt::Display for YearCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.death_year {
            Some(year) => write!(f, "{year:>6} {}", self.total_deaths),
            None => write!(f, "{:>6} {}", "null", self.total_deaths),
        }
    }
}
