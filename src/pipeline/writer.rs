//! Writer stage

use crate::config::OutputConfig;
use crate::error::Result;
use crate::output::WriteOutcome;
use crate::plan::Relation;
use crate::session::Session;

/// Persist the result relation at the configured output location
///
/// This is the call that forces evaluation of the whole plan.
pub fn load(session: &Session, result: &Relation, output: &OutputConfig) -> Result<WriteOutcome> {
    tracing::info!(
        "Writing {} (mode: {:?}, partitions: {})",
        output.path.display(),
        output.write.mode,
        output.write.partitions
    );
    session.write(result, &output.path, &output.write)
}
