//! Plan node types
//!
//! A plan is a tree of immutable nodes shared through `Arc`, so the same
//! sub-plan can feed several relations without being copied.

use crate::error::{Error, Result};
use crate::types::{ColumnType, NullOrder, ReadOptions, SourceFormat};
use std::path::PathBuf;
use std::sync::Arc;

/// One node of a computation plan
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Read a file through the engine's reader
    Scan {
        format: SourceFormat,
        path: PathBuf,
        options: ScanOptions,
    },
    /// Free-form query text
    Sql { query: String },
    /// Keep the listed columns, in order
    Project {
        input: Arc<Plan>,
        columns: Vec<String>,
    },
    /// Replace nulls in a column with a text value
    FillNull {
        input: Arc<Plan>,
        column: String,
        value: String,
    },
    /// Null-on-failure cast of one column
    Cast {
        input: Arc<Plan>,
        column: String,
        to: ColumnType,
    },
    /// Group by keys and compute aggregates
    Aggregate {
        input: Arc<Plan>,
        group_by: Vec<String>,
        aggregates: Vec<AggregateExpr>,
    },
    /// Order rows
    Sort {
        input: Arc<Plan>,
        keys: Vec<SortKey>,
    },
    /// Skip `offset` rows, then keep at most `n`
    Limit {
        input: Arc<Plan>,
        n: usize,
        offset: usize,
    },
}

impl Plan {
    /// Direct inputs of this node
    pub fn inputs(&self) -> Vec<&Arc<Plan>> {
        match self {
            Plan::Scan { .. } | Plan::Sql { .. } => vec![],
            Plan::Project { input, .. }
            | Plan::FillNull { input, .. }
            | Plan::Cast { input, .. }
            | Plan::Aggregate { input, .. }
            | Plan::Sort { input, .. }
            | Plan::Limit { input, .. } => vec![input],
        }
    }

    /// Short node label, used when logging plans
    pub fn label(&self) -> &'static str {
        match self {
            Plan::Scan { .. } => "Scan",
            Plan::Sql { .. } => "Sql",
            Plan::Project { .. } => "Project",
            Plan::FillNull { .. } => "FillNull",
            Plan::Cast { .. } => "Cast",
            Plan::Aggregate { .. } => "Aggregate",
            Plan::Sort { .. } => "Sort",
            Plan::Limit { .. } => "Limit",
        }
    }

    /// Number of nodes from this node down to its leaf
    pub fn depth(&self) -> usize {
        1 + self
            .inputs()
            .into_iter()
            .map(|p| p.depth())
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// Scan Options
// ============================================================================

/// Validated reader options for a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// First row holds column names
    pub header: bool,
    /// Infer column types; when false every column is read as text
    pub infer_schema: bool,
    /// Field delimiter
    pub delimiter: char,
    /// Text treated as null in addition to empty fields
    pub null_value: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            header: true,
            infer_schema: true,
            delimiter: ',',
            null_value: None,
        }
    }
}

impl ScanOptions {
    /// Build scan options from a reader options map
    ///
    /// Recognized keys: `header`, `inferSchema`, `delimiter` (alias `sep`),
    /// `nullValue`.
    pub fn from_map(options: &ReadOptions) -> Result<Self> {
        let mut scan = Self::default();

        for (key, value) in options {
            match key.as_str() {
                "header" => scan.header = parse_bool(key, value)?,
                "inferSchema" => scan.infer_schema = parse_bool(key, value)?,
                "delimiter" | "sep" => {
                    let mut chars = value.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => scan.delimiter = c,
                        _ => {
                            return Err(Error::config(format!(
                                "Option '{key}' must be a single character, got '{value}'"
                            )))
                        }
                    }
                }
                "nullValue" => scan.null_value = Some(value.clone()),
                _ => {
                    return Err(Error::config(format!("Unknown reader option: {key}")));
                }
            }
        }

        Ok(scan)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::config(format!(
            "Option '{key}' must be 'true' or 'false', got '{value}'"
        ))),
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Aggregate function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateFunc {
    /// Count of non-null values in a column
    Count(String),
    /// Count of rows
    CountAll,
}

/// Aggregate with its output name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateExpr {
    pub func: AggregateFunc,
    pub alias: String,
}

impl AggregateExpr {
    /// `count(column)`, aliased `count_<column>` until renamed
    pub fn count(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            alias: format!("count_{column}"),
            func: AggregateFunc::Count(column),
        }
    }

    /// `count(*)`
    pub fn count_all() -> Self {
        Self {
            func: AggregateFunc::CountAll,
            alias: "count".to_string(),
        }
    }

    /// Set the output column name
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

// ============================================================================
// Sort Keys
// ============================================================================

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
    pub nulls: NullOrder,
}

impl SortKey {
    /// Ascending, nulls first
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
            nulls: NullOrder::First,
        }
    }

    /// Descending, nulls last
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
            nulls: NullOrder::Last,
        }
    }

    /// Put nulls before all other values
    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullOrder::First;
        self
    }

    /// Put nulls after all other values
    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullOrder::Last;
        self
    }
}
