//! Error types for the deaths-per-year pipeline
//!
//! Every public API returns `Result<T, Error>` where Error is defined here.
//! The three pipeline stages each own one domain variant; the remaining
//! variants wrap the collaborators (engine, Parquet, filesystem, config).

use thiserror::Error;

/// The main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Source unavailable '{path}': {message}")]
    SourceUnavailable { path: String, message: String },

    #[error("Schema mismatch on column '{column}': {message}")]
    SchemaMismatch { column: String, message: String },

    #[error("Failed to write '{path}': {message}")]
    SinkWriteFailure { path: String, message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to serialize JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Engine / Format Errors
    // ============================================================================
    #[error("Query engine error: {0}")]
    Engine(#[from] duckdb::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a source unavailable error
    pub fn source_unavailable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a sink write failure
    pub fn sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWriteFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the pipeline's own taxonomy
    /// (as opposed to a collaborator error surfaced unchanged)
    pub fn is_pipeline_error(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. }
                | Error::SchemaMismatch { .. }
                | Error::SinkWriteFailure { .. }
        )
    }
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
