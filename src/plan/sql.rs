//! Plan to SQL compilation
//!
//! Each node becomes one `SELECT` wrapping its input as a subquery, so the
//! whole tree compiles to a single statement the engine can optimize as a
//! unit.

use super::types::{AggregateExpr, AggregateFunc, Plan, ScanOptions, SortKey};
use crate::types::{ColumnType, NullOrder, SourceFormat};
use std::path::Path;

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a filesystem path as a string literal
pub fn quote_path(path: &Path) -> String {
    quote_literal(&path.to_string_lossy())
}

/// Null-on-failure conversion of `expr` to `to`
///
/// Integer targets go through `DOUBLE` and truncate toward zero, so `1990.7`
/// becomes `1990` and text that is not a number becomes null.
pub fn cast_expr(expr: &str, to: ColumnType) -> String {
    match to {
        ColumnType::Integer => format!(
            "TRY_CAST(TRUNC(TRY_CAST({expr} AS {})) AS {})",
            ColumnType::Double.sql_name(),
            to.sql_name()
        ),
        ColumnType::Double | ColumnType::Varchar => {
            format!("TRY_CAST({expr} AS {})", to.sql_name())
        }
    }
}

/// Compile a plan to a single SQL query
pub fn compile(plan: &Plan) -> String {
    match plan {
        Plan::Scan {
            format,
            path,
            options,
        } => format!("SELECT * FROM {}", scan_function(*format, path, options)),
        Plan::Sql { query } => query.trim().trim_end_matches(';').trim_end().to_string(),
        Plan::Project { input, columns } => {
            let list = columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("SELECT {list} FROM ({}) AS _t", compile(input))
        }
        Plan::FillNull {
            input,
            column,
            value,
        } => {
            let col = quote_ident(column);
            format!(
                "SELECT * REPLACE (COALESCE(CAST({col} AS {}), {}) AS {col}) FROM ({}) AS _t",
                ColumnType::Varchar.sql_name(),
                quote_literal(value),
                compile(input)
            )
        }
        Plan::Cast { input, column, to } => {
            let col = quote_ident(column);
            format!(
                "SELECT * REPLACE ({} AS {col}) FROM ({}) AS _t",
                cast_expr(&col, *to),
                compile(input)
            )
        }
        Plan::Aggregate {
            input,
            group_by,
            aggregates,
        } => {
            let keys: Vec<String> = group_by.iter().map(|k| quote_ident(k)).collect();
            let mut select = keys.clone();
            select.extend(aggregates.iter().map(aggregate_sql));

            let mut sql = format!("SELECT {} FROM ({}) AS _t", select.join(", "), compile(input));
            if !keys.is_empty() {
                sql.push_str(" GROUP BY ");
                sql.push_str(&keys.join(", "));
            }
            sql
        }
        Plan::Sort { input, keys } => {
            let order = keys.iter().map(sort_key_sql).collect::<Vec<_>>().join(", ");
            format!("SELECT * FROM ({}) AS _t ORDER BY {order}", compile(input))
        }
        Plan::Limit { input, n, offset } => {
            let mut sql = format!("SELECT * FROM ({}) AS _t LIMIT {n}", compile(input));
            if *offset > 0 {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
            sql
        }
    }
}

fn scan_function(format: SourceFormat, path: &Path, options: &ScanOptions) -> String {
    match format {
        SourceFormat::Csv => {
            let mut args = vec![
                quote_path(path),
                format!("header = {}", options.header),
                format!("delim = {}", quote_literal(&options.delimiter.to_string())),
            ];
            // Infer types from every row, not a leading sample
            if options.infer_schema {
                args.push("sample_size = -1".to_string());
            } else {
                args.push("all_varchar = true".to_string());
            }
            if let Some(null_value) = &options.null_value {
                args.push(format!("nullstr = {}", quote_literal(null_value)));
            }
            format!("read_csv({})", args.join(", "))
        }
        SourceFormat::Parquet => format!("read_parquet({})", quote_path(path)),
    }
}

fn aggregate_sql(agg: &AggregateExpr) -> String {
    let expr = match &agg.func {
        AggregateFunc::Count(column) => format!("COUNT({})", quote_ident(column)),
        AggregateFunc::CountAll => "COUNT(*)".to_string(),
    };
    format!("{expr} AS {}", quote_ident(&agg.alias))
}

fn sort_key_sql(key: &SortKey) -> String {
    let direction = if key.descending { "DESC" } else { "ASC" };
    let nulls = match key.nulls {
        NullOrder::First => "NULLS FIRST",
        NullOrder::Last => "NULLS LAST",
    };
    format!("{} {direction} {nulls}", quote_ident(&key.column))
}
