//! CLI module
//!
//! Command-line interface for the pipeline.
//!
//! # Commands
//!
//! - `run` - Run the pipeline (default)
//! - `plan` - Print the compiled aggregate query
//! - `inspect` - Print the rows of a written artifact

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
