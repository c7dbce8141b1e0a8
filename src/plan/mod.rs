//! Computation plan module
//!
//! Relations are built as a plan tree and compiled to SQL on demand.
//!
//! # Overview
//!
//! - `Relation` - immutable handle with builder methods (select, fill_null,
//!   cast, group_by/agg, order_by, limit)
//! - `Plan` - the node types behind a relation
//! - `sql` - compilation of a plan into one query

mod relation;
pub mod sql;
mod types;

pub use relation::{GroupedRelation, Relation};
pub use types::{AggregateExpr, AggregateFunc, Plan, ScanOptions, SortKey};
