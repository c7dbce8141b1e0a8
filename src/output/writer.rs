//! Artifact writer
//!
//! A relation is written into a sibling staging directory first. Only when
//! every part file is complete is the prior artifact removed and the staging
//! directory renamed into its place, so a failed write never leaves a
//! half-replaced artifact behind.

use super::reader::footer_row_count;
use crate::error::{Error, Result};
use crate::plan::Relation;
use crate::session::Session;
use crate::types::{Compression, WriteMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Empty marker file written next to complete artifacts
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Configuration for writing an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Number of part files
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// Behaviour when the target already exists
    #[serde(default)]
    pub mode: WriteMode,

    /// Parquet compression codec
    #[serde(default)]
    pub compression: Compression,

    /// Rows per row group (engine default when unset)
    #[serde(default)]
    pub row_group_size: Option<usize>,
}

fn default_partitions() -> usize {
    1
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            mode: WriteMode::default(),
            compression: Compression::default(),
            row_group_size: None,
        }
    }
}

impl WriteOptions {
    /// Create options with default settings (one partition, overwrite)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of part files
    #[must_use]
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set the write mode
    #[must_use]
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set rows per row group
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = Some(size);
        self
    }

    /// Reject settings no write can honour
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::config("output partitions must be at least 1"));
        }
        if self.row_group_size == Some(0) {
            return Err(Error::config("output row_group_size must be at least 1"));
        }
        Ok(())
    }
}

/// Result of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Artifact directory
    pub path: PathBuf,
    /// Part files, in order
    pub files: Vec<PathBuf>,
    /// Rows recorded in the part file footers
    pub rows: usize,
    /// True when an existing artifact was left in place (`ignore` mode)
    pub skipped: bool,
}

/// Write `relation` as a Parquet artifact directory at `target`
///
/// Forces evaluation of the relation's whole plan. A relation that does not
/// resolve fails with its own error before the target is touched; failures
/// while copying into the target are `SinkWriteFailure`.
pub fn write_relation(
    session: &Session,
    relation: &Relation,
    target: &Path,
    options: &WriteOptions,
) -> Result<WriteOutcome> {
    options.validate()?;
    let target_display = target.display().to_string();

    session.schema(relation)?;

    let exists = target.symlink_metadata().is_ok();
    if exists {
        match options.mode {
            WriteMode::ErrorIfExists => {
                return Err(Error::sink(&target_display, "target already exists"));
            }
            WriteMode::Ignore => {
                tracing::info!("Output {} exists, skipping write", target_display);
                return Ok(WriteOutcome {
                    path: target.to_path_buf(),
                    files: vec![],
                    rows: 0,
                    skipped: true,
                });
            }
            WriteMode::Overwrite => {}
        }
    }

    let staging = staging_dir(target);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| {
            Error::sink(&target_display, format!("Failed to clear staging directory: {e}"))
        })?;
    }
    fs::create_dir_all(&staging).map_err(|e| {
        Error::sink(&target_display, format!("Failed to create staging directory: {e}"))
    })?;

    let staged = write_parts(session, relation, &staging, options)
        .and_then(|files| finish_staging(&staging, files));

    let (file_names, rows) = match staged {
        Ok(staged) => staged,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            if e.is_pipeline_error() {
                return Err(e);
            }
            return Err(Error::sink(&target_display, e.to_string()));
        }
    };

    if exists {
        remove_existing(target)
            .map_err(|e| Error::sink(&target_display, format!("Failed to remove prior artifact: {e}")))?;
    }
    fs::rename(&staging, target).map_err(|e| {
        let _ = fs::remove_dir_all(&staging);
        Error::sink(&target_display, format!("Failed to move artifact into place: {e}"))
    })?;

    let files: Vec<PathBuf> = file_names.iter().map(|name| target.join(name)).collect();
    tracing::info!(
        "Wrote {} rows to {} ({} file(s))",
        rows,
        target_display,
        files.len()
    );

    Ok(WriteOutcome {
        path: target.to_path_buf(),
        files,
        rows,
        skipped: false,
    })
}

/// Sibling directory used while an artifact is being written
fn staging_dir(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "output".to_string(), |n| n.to_string_lossy().to_string());
    target.with_file_name(format!(".{name}.staging"))
}

/// Part file name for partition `index`
fn part_name(index: usize) -> String {
    format!("part-{index:05}.parquet")
}

/// Write one part file per partition; rows are split into contiguous,
/// order-preserving ranges
fn write_parts(
    session: &Session,
    relation: &Relation,
    dir: &Path,
    options: &WriteOptions,
) -> Result<Vec<String>> {
    if options.partitions == 1 {
        let name = part_name(0);
        session.copy_to_parquet(relation, &dir.join(&name), options)?;
        return Ok(vec![name]);
    }

    let total = session.count(relation)?;
    let chunk = total.div_ceil(options.partitions);

    let mut names = Vec::with_capacity(options.partitions);
    for index in 0..options.partitions {
        let name = part_name(index);
        let part = relation.slice(index * chunk, chunk);
        session.copy_to_parquet(&part, &dir.join(&name), options)?;
        names.push(name);
    }
    Ok(names)
}

/// Count footer rows and drop the success marker into the staging directory
fn finish_staging(staging: &Path, names: Vec<String>) -> Result<(Vec<String>, usize)> {
    let mut rows = 0usize;
    for name in &names {
        rows += footer_row_count(staging.join(name))? as usize;
    }
    fs::write(staging.join(SUCCESS_MARKER), b"")?;
    Ok((names, rows))
}

fn remove_existing(target: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    }
}
