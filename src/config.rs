//! Pipeline configuration
//!
//! Every field defaults to the built-in behaviour: read
//! `data/AgeDataset-V1.csv`, write `data/output`. A YAML file may override
//! any subset of fields.

use crate::error::{Error, Result};
use crate::output::WriteOptions;
use crate::session::is_identifier;
use crate::types::{ReadOptions, SourceFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default source file
pub const DEFAULT_SOURCE_PATH: &str = "data/AgeDataset-V1.csv";

/// Default output artifact location
pub const DEFAULT_OUTPUT_PATH: &str = "data/output";

/// Default logical name of the raw table
pub const DEFAULT_VIEW_NAME: &str = "deaths";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source table
    #[serde(default)]
    pub source: SourceConfig,

    /// Output artifact
    #[serde(default)]
    pub output: OutputConfig,

    /// Engine session settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl PipelineConfig {
    /// Load a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the source path
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source.path = path.into();
        self
    }

    /// Override the output path
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.path = path.into();
        self
    }

    /// Check the configuration for values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.source.path.as_os_str().is_empty() {
            return Err(Error::config("source.path cannot be empty"));
        }

        if SourceFormat::from_name(&self.source.format).is_none() {
            return Err(Error::config(format!(
                "Unsupported source.format: {}",
                self.source.format
            )));
        }

        if !is_identifier(&self.source.view) {
            return Err(Error::config(format!(
                "source.view must be a plain identifier, got '{}'",
                self.source.view
            )));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(Error::config("output.path cannot be empty"));
        }

        self.output.write.validate()
    }
}

// ============================================================================
// Source
// ============================================================================

/// Source table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the source file
    #[serde(default = "default_source_path")]
    pub path: PathBuf,

    /// Reader format name (`csv` or `parquet`)
    #[serde(default = "default_format")]
    pub format: String,

    /// Reader options
    #[serde(default = "default_read_options")]
    pub options: ReadOptions,

    /// Logical name the raw table is registered under
    #[serde(default = "default_view")]
    pub view: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            format: default_format(),
            options: default_read_options(),
            view: default_view(),
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_PATH)
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_read_options() -> ReadOptions {
    let mut options = ReadOptions::new();
    options.insert("header".to_string(), "true".to_string());
    options.insert("inferSchema".to_string(), "true".to_string());
    options
}

fn default_view() -> String {
    DEFAULT_VIEW_NAME.to_string()
}

// ============================================================================
// Output
// ============================================================================

/// Output artifact settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Layout, mode and codec
    #[serde(flatten)]
    pub write: WriteOptions,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            write: WriteOptions::default(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

// ============================================================================
// Engine
// ============================================================================

/// Engine session settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker threads (engine default when unset)
    #[serde(default)]
    pub threads: Option<usize>,

    /// Memory limit, e.g. `2GB` (engine default when unset)
    #[serde(default)]
    pub memory_limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Compression, WriteMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_builtin_paths() {
        let config = PipelineConfig::default();
        assert_eq!(config.source.path, PathBuf::from("data/AgeDataset-V1.csv"));
        assert_eq!(config.source.format, "csv");
        assert_eq!(config.source.view, "deaths");
        assert_eq!(config.source.options.get("header").unwrap(), "true");
        assert_eq!(config.source.options.get("inferSchema").unwrap(), "true");
        assert_eq!(config.output.path, PathBuf::from("data/output"));
        assert_eq!(config.output.write.partitions, 1);
        assert_eq!(config.output.write.mode, WriteMode::Overwrite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = PipelineConfig::from_yaml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r"
source:
  path: /tmp/people.csv
output:
  path: /tmp/out
  compression: zstd
  row_group_size: 4096
engine:
  threads: 2
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.source.path, PathBuf::from("/tmp/people.csv"));
        assert_eq!(config.source.view, "deaths");
        assert_eq!(config.output.path, PathBuf::from("/tmp/out"));
        assert_eq!(config.output.write.compression, Compression::Zstd);
        assert_eq!(config.output.write.row_group_size, Some(4096));
        assert_eq!(config.output.write.mode, WriteMode::Overwrite);
        assert_eq!(config.engine.threads, Some(2));
    }

    #[test]
    fn test_rejects_zero_partitions() {
        let yaml = "output:\n  partitions: 0\n";
        let err = PipelineConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("partitions"));
    }

    #[test]
    fn test_rejects_bad_view_name() {
        let yaml = "source:\n  view: \"raw deaths\"\n";
        assert!(matches!(
            PipelineConfig::from_yaml(yaml),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let yaml = "source:\n  format: avro\n";
        assert!(PipelineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_path_overrides() {
        let config = PipelineConfig::default()
            .with_source_path("in.csv")
            .with_output_path("out");
        assert_eq!(config.source.path, PathBuf::from("in.csv"));
        assert_eq!(config.output.path, PathBuf::from("out"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PipelineConfig::from_file("/nonexistent/pipeline.yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
