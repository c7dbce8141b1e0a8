//! # deaths-per-year
//!
//! Computes the number of recorded deaths per calendar year for a dataset
//! of historical persons and writes the aggregate as a single Parquet
//! artifact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deaths_per_year::{pipeline, PipelineConfig, Result};
//!
//! fn main() -> Result<()> {
//!     // data/AgeDataset-V1.csv -> data/output/part-00000.parquet
//!     let summary = pipeline::run(&PipelineConfig::default())?;
//!     println!("{} year groups written", summary.output.rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │   read() / sql() → Relation (lazy)     write() → artifact    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!   ┌──────────────┬────────────┴─────────┬──────────────────┐
//!   │   Loader     │   Aggregator          │   Writer         │
//!   ├──────────────┼──────────────────────┼──────────────────┤
//!   │ CSV → view   │ fill "Blank"          │ staged overwrite │
//!   │ Id, Name,    │ try-cast INTEGER      │ part-NNNNN       │
//!   │ Death_year   │ group, count, sort    │ _SUCCESS         │
//!   └──────────────┴──────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and column names
pub mod types;

/// Pipeline configuration
pub mod config;

/// Lazy computation plans
pub mod plan;

/// Query engine session
pub mod session;

/// Parquet artifact output
pub mod output;

/// Loader, aggregator and writer stages
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use plan::Relation;
pub use session::Session;
pub use types::YearCount;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
