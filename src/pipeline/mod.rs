//! Deaths-per-year pipeline
//!
//! Three strictly sequential stages sharing one engine session:
//!
//! ```text
//! extract (Loader) ──► transform (Aggregator) ──► load (Writer)
//!   deaths relation      (Death_year, total_deaths)   data/output/part-00000.parquet
//! ```
//!
//! `extract` and `transform` only build plans (plus schema checks); `load`
//! forces evaluation of the whole chain.

mod aggregator;
mod loader;
mod writer;

pub use aggregator::{aggregate_plan, transform, year_quality, YearQuality};
pub use loader::{deaths_query, extract, LOADED_COLUMNS};
pub use writer::load;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::WriteOutcome;
use crate::session::Session;
use loader::source_error;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// What a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time of the run in milliseconds
    pub duration_ms: u64,
    /// Source file
    pub source: PathBuf,
    /// Written artifact
    pub output: WriteOutcome,
    /// Missing/unparseable split of the raw years
    pub quality: YearQuality,
}

/// Run the pipeline with a session owned by this call
///
/// The session is closed whether or not the stages succeed.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;

    let started_at = Utc::now();
    let start = Instant::now();

    let session = Session::open(&config.engine)?;
    let result = run_with_session(&session, config);
    let closed = session.close();

    let (output, quality) = result?;
    closed?;

    let summary = RunSummary {
        started_at,
        duration_ms: start.elapsed().as_millis() as u64,
        source: config.source.path.clone(),
        output,
        quality,
    };
    tracing::info!(
        "Run finished in {}ms: {} year groups written",
        summary.duration_ms,
        summary.output.rows
    );
    Ok(summary)
}

/// Run the three stages on an existing session
pub fn run_with_session(
    session: &Session,
    config: &PipelineConfig,
) -> Result<(WriteOutcome, YearQuality)> {
    let source = config.source.path.display().to_string();
    tracing::info!("Extracting {}", source);
    let deaths = extract(session, &config.source)?;

    // First full scan of the source; read and decode failures surface here
    let quality = year_quality(session, &deaths).map_err(|e| source_error(&source, e))?;
    if quality.unparseable > 0 {
        tracing::warn!(
            "{} of {} rows have an unparseable {} and are counted in the null group",
            quality.unparseable,
            quality.rows,
            crate::types::DEATH_YEAR_COLUMN
        );
    }
    tracing::debug!(
        rows = quality.rows,
        missing = quality.missing,
        unparseable = quality.unparseable,
        "Year quality"
    );

    tracing::info!("Transforming");
    let result = transform(session, &deaths).map_err(|e| source_error(&source, e))?;

    let outcome = load(session, &result, &config.output).map_err(|e| source_error(&source, e))?;
    Ok((outcome, quality))
}

/// Compile the aggregate query for `config` without executing it
///
/// The source is still registered and its schema resolved.
pub fn explain(config: &PipelineConfig) -> Result<String> {
    config.validate()?;

    let session = Session::open(&config.engine)?;
    let sql = extract(&session, &config.source)
        .and_then(|deaths| transform(&session, &deaths))
        .map(|result| result.to_sql());
    let closed = session.close();

    let sql = sql?;
    closed?;
    Ok(sql)
}
