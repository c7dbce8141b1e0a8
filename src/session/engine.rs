//! DuckDB-backed session
//!
//! Relations handed out by the session are lazy plans. Only `schema`,
//! `count`, `collect`, `query_rows` and `write` execute anything.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::output::{self, WriteOptions, WriteOutcome};
use crate::plan::sql::{quote_ident, quote_literal, quote_path};
use crate::plan::{Plan, Relation, ScanOptions};
use crate::types::{ColumnInfo, JsonObject, ReadOptions, SourceFormat};
use duckdb::Connection;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

/// Plain identifier accepted as a view name
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Check whether `name` is a plain identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Engine session
pub struct Session {
    /// DuckDB connection
    conn: Connection,
}

impl Session {
    /// Open an in-memory engine session
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;

        let session = Self { conn };
        session.apply_config(config)?;

        tracing::debug!(
            threads = ?config.threads,
            memory_limit = ?config.memory_limit,
            "Engine session opened"
        );
        Ok(session)
    }

    fn apply_config(&self, config: &EngineConfig) -> Result<()> {
        if let Some(threads) = config.threads {
            self.conn
                .execute_batch(&format!("SET threads = {threads};"))
                .map_err(|e| Error::config(format!("Failed to set threads: {e}")))?;
        }

        if let Some(limit) = &config.memory_limit {
            self.conn
                .execute_batch(&format!("SET memory_limit = {};", quote_literal(limit)))
                .map_err(|e| Error::config(format!("Failed to set memory limit: {e}")))?;
        }

        // Writers rely on the order produced by ORDER BY surviving COPY.
        // Extensions are linked in; never fetch one at runtime.
        self.conn
            .execute_batch(
                "SET preserve_insertion_order = true; \
                 SET autoinstall_known_extensions = false;",
            )
            .map_err(|e| Error::config(format!("Failed to configure session: {e}")))?;

        Ok(())
    }

    /// Close the session, releasing the engine
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Engine(e))?;
        tracing::debug!("Engine session closed");
        Ok(())
    }

    // ========================================================================
    // Relation constructors (lazy)
    // ========================================================================

    /// Describe a file to be read with the named format and reader options
    ///
    /// The file is not opened here; a missing file surfaces when the
    /// relation is first resolved.
    pub fn read(
        &self,
        format: &str,
        path: impl AsRef<Path>,
        options: &ReadOptions,
    ) -> Result<Relation> {
        let format = SourceFormat::from_name(format)
            .ok_or_else(|| Error::config(format!("Unsupported source format: {format}")))?;

        let options = match format {
            SourceFormat::Csv => ScanOptions::from_map(options)?,
            SourceFormat::Parquet => {
                if let Some(key) = options.keys().next() {
                    return Err(Error::config(format!(
                        "Reader option '{key}' is not supported for parquet"
                    )));
                }
                ScanOptions::default()
            }
        };

        Ok(Relation::from_plan(Plan::Scan {
            format,
            path: path.as_ref().to_path_buf(),
            options,
        }))
    }

    /// Relation backed by a query over registered views
    pub fn sql(&self, query: impl Into<String>) -> Relation {
        Relation::from_sql(query)
    }

    /// Register `relation` under `name`, replacing any previous view
    ///
    /// The engine binds the view immediately, which resolves the source
    /// schema without materializing rows.
    pub fn create_or_replace_view(&self, name: &str, relation: &Relation) -> Result<()> {
        if !is_identifier(name) {
            return Err(Error::config(format!("Invalid view name: '{name}'")));
        }

        let ddl = format!(
            "CREATE OR REPLACE TEMP VIEW {} AS {}",
            quote_ident(name),
            relation.to_sql()
        );
        tracing::debug!("Registering view: {}", ddl);

        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    // ========================================================================
    // Forcing calls
    // ========================================================================

    /// Resolve column names and types without reading rows
    pub fn schema(&self, relation: &Relation) -> Result<Vec<ColumnInfo>> {
        let query = format!("DESCRIBE SELECT * FROM ({}) AS _t", relation.to_sql());

        let mut stmt = self.conn.prepare(&query)?;
        let columns = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let data_type: String = row.get(1)?;
                let null: Option<String> = row.get(2)?;
                Ok(ColumnInfo {
                    name,
                    data_type,
                    nullable: null.map_or(true, |n| n.eq_ignore_ascii_case("YES")),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(columns)
    }

    /// Number of rows in the relation
    pub fn count(&self, relation: &Relation) -> Result<usize> {
        let query = format!("SELECT COUNT(*) FROM ({}) AS _t", relation.to_sql());
        let count: i64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Execute the relation and map every row with `f`
    pub fn query_rows<T, F>(&self, relation: &Relation, f: F) -> Result<Vec<T>>
    where
        F: FnMut(&duckdb::Row<'_>) -> duckdb::Result<T>,
    {
        let query = relation.to_sql();
        tracing::debug!("Executing query: {}", query);

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt
            .query_map([], f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Execute the relation and return rows as JSON objects
    pub fn collect(&self, relation: &Relation) -> Result<Vec<JsonObject>> {
        let columns = self.schema(relation)?;

        self.query_rows(relation, |row| {
            let mut obj = JsonObject::new();
            for (i, column) in columns.iter().enumerate() {
                let value: duckdb::types::Value = row.get(i)?;
                obj.insert(column.name.clone(), duckdb_value_to_json(value));
            }
            Ok(obj)
        })
    }

    /// Persist the relation at `target` (see [`output::write_relation`])
    pub fn write(
        &self,
        relation: &Relation,
        target: impl AsRef<Path>,
        options: &WriteOptions,
    ) -> Result<WriteOutcome> {
        output::write_relation(self, relation, target.as_ref(), options)
    }

    /// Copy the relation into one Parquet file
    pub(crate) fn copy_to_parquet(
        &self,
        relation: &Relation,
        file: &Path,
        options: &WriteOptions,
    ) -> Result<()> {
        let mut copy_options = vec![
            "FORMAT PARQUET".to_string(),
            format!("COMPRESSION '{}'", options.compression.sql_name()),
        ];
        if let Some(size) = options.row_group_size {
            copy_options.push(format!("ROW_GROUP_SIZE {size}"));
        }

        let copy_sql = format!(
            "COPY ({}) TO {} ({});",
            relation.to_sql(),
            quote_path(file),
            copy_options.join(", ")
        );
        tracing::debug!("Executing copy: {}", copy_sql);

        self.conn.execute_batch(&copy_sql)?;
        Ok(())
    }
}

/// Convert a DuckDB value to JSON
fn duckdb_value_to_json(value: duckdb::types::Value) -> Value {
    use duckdb::types::Value as Db;

    match value {
        Db::Null => Value::Null,
        Db::Boolean(b) => Value::Bool(b),
        Db::TinyInt(i) => Value::Number(i.into()),
        Db::SmallInt(i) => Value::Number(i.into()),
        Db::Int(i) => Value::Number(i.into()),
        Db::BigInt(i) => Value::Number(i.into()),
        Db::HugeInt(i) => Value::String(i.to_string()),
        Db::UTinyInt(i) => Value::Number(i.into()),
        Db::USmallInt(i) => Value::Number(i.into()),
        Db::UInt(i) => Value::Number(i.into()),
        Db::UBigInt(i) => Value::Number(i.into()),
        Db::Float(f) => serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number),
        Db::Double(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        Db::Text(s) => Value::String(s),
        Db::Date32(d) => {
            // Days since epoch (719163 is the number of days from 1 CE to 1970-01-01)
            chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Number(d.into()))
        }
        other => Value::String(format!("{other:?}")),
    }
}
