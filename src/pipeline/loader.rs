//! Loader stage
//!
//! Registers the raw source table under a logical name and re-projects it
//! to the three columns the aggregation needs.

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::plan::sql::quote_ident;
use crate::plan::Relation;
use crate::session::Session;
use crate::types::{ColumnInfo, DEATH_YEAR_COLUMN, ID_COLUMN, NAME_COLUMN};
use std::fs;

/// Columns the loader projects, in output order
pub const LOADED_COLUMNS: [&str; 3] = [ID_COLUMN, NAME_COLUMN, DEATH_YEAR_COLUMN];

/// Query selecting the loaded columns from the registered view
pub fn deaths_query(view: &str) -> String {
    let columns = LOADED_COLUMNS
        .iter()
        .map(|c| format!("    {}", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("SELECT\n{columns}\nFROM\n    {}", quote_ident(view))
}

/// Load the source file as the `deaths` relation
///
/// The raw table is registered under `source.view`; the returned relation
/// is the projection query over that view.
pub fn extract(session: &Session, source: &SourceConfig) -> Result<Relation> {
    let path = source.path.display().to_string();

    let metadata = fs::metadata(&source.path)
        .map_err(|e| Error::source_unavailable(&path, e.to_string()))?;
    if !metadata.is_file() {
        return Err(Error::source_unavailable(&path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(Error::source_unavailable(&path, "file is empty"));
    }

    let raw = session.read(&source.format, &source.path, &source.options)?;
    session
        .create_or_replace_view(&source.view, &raw)
        .map_err(|e| source_error(&path, e))?;

    let raw_view = session.sql(format!("SELECT * FROM {}", quote_ident(&source.view)));
    let columns = session
        .schema(&raw_view)
        .map_err(|e| source_error(&path, e))?;

    if columns.is_empty() {
        return Err(Error::source_unavailable(&path, "source has no columns"));
    }
    for required in LOADED_COLUMNS {
        require_column(&columns, required)?;
    }

    tracing::info!(
        "Loaded {} as view '{}' ({} columns)",
        path,
        source.view,
        columns.len()
    );

    Ok(session.sql(deaths_query(&source.view)))
}

/// Fail with SchemaMismatch unless `name` is among `columns`
pub(crate) fn require_column(columns: &[ColumnInfo], name: &str) -> Result<()> {
    if columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
        Ok(())
    } else {
        let found = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::schema_mismatch(
            name,
            format!("column not found (available: {found})"),
        ))
    }
}

/// Engine failures while resolving or scanning the raw table mean the source
/// could not be read; other errors pass through
pub(crate) fn source_error(path: &str, err: Error) -> Error {
    match err {
        Error::Engine(e) => Error::source_unavailable(path, e.to_string()),
        other => other,
    }
}
