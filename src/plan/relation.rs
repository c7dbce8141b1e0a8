//! Lazy relation handles
//!
//! A `Relation` only describes a computation. Nothing is read or computed
//! until a `Session` forcing call (`count`, `collect`, `write`) executes the
//! compiled plan.

use super::sql;
use super::types::{AggregateExpr, Plan, SortKey};
use crate::types::ColumnType;
use std::fmt;
use std::sync::Arc;

/// Immutable handle to a computation plan
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    plan: Arc<Plan>,
}

impl Relation {
    /// Wrap a plan node
    pub fn from_plan(plan: Plan) -> Self {
        Self {
            plan: Arc::new(plan),
        }
    }

    /// Relation backed by query text
    pub fn from_sql(query: impl Into<String>) -> Self {
        Self::from_plan(Plan::Sql {
            query: query.into(),
        })
    }

    /// The root plan node
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Compile the whole plan to one SQL query
    pub fn to_sql(&self) -> String {
        sql::compile(&self.plan)
    }

    fn derive(&self, build: impl FnOnce(Arc<Plan>) -> Plan) -> Self {
        Self::from_plan(build(Arc::clone(&self.plan)))
    }

    /// Keep only the given columns, in order
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self.derive(|input| Plan::Project { input, columns })
    }

    /// Replace nulls in `column` with `value`; the column becomes text
    #[must_use]
    pub fn fill_null(&self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let column = column.into();
        let value = value.into();
        self.derive(|input| Plan::FillNull {
            input,
            column,
            value,
        })
    }

    /// Cast `column` to `to`; values that do not convert become null
    #[must_use]
    pub fn cast(&self, column: impl Into<String>, to: ColumnType) -> Self {
        let column = column.into();
        self.derive(|input| Plan::Cast { input, column, to })
    }

    /// Start a grouped aggregation
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> GroupedRelation {
        GroupedRelation {
            input: Arc::clone(&self.plan),
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        }
    }

    /// Order rows by the given keys
    #[must_use]
    pub fn order_by(&self, keys: Vec<SortKey>) -> Self {
        self.derive(|input| Plan::Sort { input, keys })
    }

    /// Keep the first `n` rows
    #[must_use]
    pub fn limit(&self, n: usize) -> Self {
        self.slice(0, n)
    }

    /// Skip `offset` rows, then keep at most `n`
    #[must_use]
    pub fn slice(&self, offset: usize, n: usize) -> Self {
        self.derive(|input| Plan::Limit { input, n, offset })
    }
}

impl fmt::Display for Relation {
    /// Indented plan tree, root first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(plan: &Plan, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "{}{}", "  ".repeat(depth), plan.label())?;
            for input in plan.inputs() {
                walk(input, depth + 1, f)?;
            }
            Ok(())
        }
        walk(&self.plan, 0, f)
    }
}

/// A relation with pending group keys
#[derive(Debug, Clone)]
pub struct GroupedRelation {
    input: Arc<Plan>,
    keys: Vec<String>,
}

impl GroupedRelation {
    /// Group keys
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Compute aggregates per group; output columns are the keys followed
    /// by the aggregate aliases
    pub fn agg(self, aggregates: Vec<AggregateExpr>) -> Relation {
        Relation::from_plan(Plan::Aggregate {
            input: self.input,
            group_by: self.keys,
            aggregates,
        })
    }
}
