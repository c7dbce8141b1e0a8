//! Aggregator stage
//!
//! Normalizes `Death_year`, groups by it and counts identifiers per group.
//! Missing years are filled with the `Blank` sentinel and then cast to
//! integer, so missing and unparseable years land in the same null group.

use super::loader::require_column;
use crate::error::Result;
use crate::plan::sql::{cast_expr, quote_ident};
use crate::plan::{AggregateExpr, Relation, SortKey};
use crate::session::Session;
use crate::types::{
    ColumnType, BLANK_SENTINEL, DEATH_YEAR_COLUMN, ID_COLUMN, TOTAL_DEATHS_COLUMN,
};
use serde::Serialize;

/// Build the sorted `(Death_year, total_deaths)` relation
///
/// Only the input schema is resolved here; rows are computed when the
/// result is forced. The null group sorts first.
pub fn transform(session: &Session, deaths: &Relation) -> Result<Relation> {
    let columns = session.schema(deaths)?;
    require_column(&columns, DEATH_YEAR_COLUMN)?;
    require_column(&columns, ID_COLUMN)?;

    let result = aggregate_plan(deaths);
    tracing::debug!("Aggregate plan:\n{}", result);
    Ok(result)
}

/// The aggregation as a plan over `deaths`, without schema checks
pub fn aggregate_plan(deaths: &Relation) -> Relation {
    deaths
        .fill_null(DEATH_YEAR_COLUMN, BLANK_SENTINEL)
        .cast(DEATH_YEAR_COLUMN, ColumnType::Integer)
        .select(&[ID_COLUMN, DEATH_YEAR_COLUMN])
        .group_by(&[DEATH_YEAR_COLUMN])
        .agg(vec![
            AggregateExpr::count(ID_COLUMN).alias(TOTAL_DEATHS_COLUMN)
        ])
        .select(&[DEATH_YEAR_COLUMN, TOTAL_DEATHS_COLUMN])
        .order_by(vec![SortKey::asc(DEATH_YEAR_COLUMN).nulls_first()])
}

/// Split of raw year values ahead of normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct YearQuality {
    /// Rows in the raw relation
    pub rows: usize,
    /// Rows with no year value
    pub missing: usize,
    /// Rows with a year value that is not an integer
    pub unparseable: usize,
}

impl YearQuality {
    /// Rows that end up in the null group
    pub fn null_group(&self) -> usize {
        self.missing + self.unparseable
    }
}

/// Count missing and unparseable years in the raw relation
///
/// Forces a scan of the source. The artifact does not distinguish the two
/// cases; this is reported alongside it.
pub fn year_quality(session: &Session, deaths: &Relation) -> Result<YearQuality> {
    let year = quote_ident(DEATH_YEAR_COLUMN);
    let normalized = cast_expr(&year, ColumnType::Integer);
    let query = format!(
        "SELECT COUNT(*), \
         COUNT(*) FILTER (WHERE {year} IS NULL), \
         COUNT(*) FILTER (WHERE {year} IS NOT NULL AND {normalized} IS NULL) \
         FROM ({}) AS _t",
        deaths.to_sql()
    );

    let counts = session.query_rows(&session.sql(query), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let (rows, missing, unparseable) = counts.first().copied().unwrap_or_default();
    Ok(YearQuality {
        rows: rows as usize,
        missing: missing as usize,
        unparseable: unparseable as usize,
    })
}
