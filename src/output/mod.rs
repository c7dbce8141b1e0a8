//! Output module
//!
//! Persists a relation as a Parquet artifact and reads artifacts back.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing a relation as a directory of `part-NNNNN.parquet` files
//! - Overwrite / error-if-exists / ignore write modes with staged swaps
//! - Reading an artifact back into typed rows and its Arrow schema

mod reader;
mod writer;

pub use reader::{artifact_schema, footer_row_count, part_files, read_artifact};
pub use writer::{write_relation, WriteOptions, WriteOutcome, SUCCESS_MARKER};

#[cfg(test)]
mod tests;
