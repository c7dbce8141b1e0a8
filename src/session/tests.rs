//! Tests for the engine session

use super::*;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::types::ReadOptions;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn session() -> Session {
    Session::open(&EngineConfig::default()).unwrap()
}

#[test]
fn test_open_with_settings_and_close() {
    let config = EngineConfig {
        threads: Some(2),
        memory_limit: Some("512MB".to_string()),
    };
    let session = Session::open(&config).unwrap();
    assert_eq!(session.count(&session.sql("SELECT 1")).unwrap(), 1);
    session.close().unwrap();
}

#[test]
fn test_parquet_extension_is_built_in() {
    let session = session();
    let loaded = session
        .query_rows(
            &session.sql(
                "SELECT loaded FROM duckdb_extensions() WHERE extension_name = 'parquet'",
            ),
            |row| row.get::<_, bool>(0),
        )
        .unwrap();
    assert_eq!(loaded, vec![true]);
}

#[test]
fn test_read_is_lazy() {
    let dir = tempdir().unwrap();
    let session = session();

    // No file yet: building the relation must not touch the filesystem
    let relation = session
        .read("csv", dir.path().join("later.csv"), &ReadOptions::new())
        .unwrap();

    fs::write(dir.path().join("later.csv"), "a,b\n1,x\n2,y\n").unwrap();
    assert_eq!(session.count(&relation).unwrap(), 2);
}

#[test]
fn test_read_unknown_format() {
    let session = session();
    let err = session
        .read("avro", "x.avro", &ReadOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_read_parquet_rejects_csv_options() {
    let session = session();
    let mut options = ReadOptions::new();
    options.insert("header".to_string(), "true".to_string());
    assert!(session.read("parquet", "x.parquet", &options).is_err());
}

#[test]
fn test_read_without_type_inference() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.csv");
    fs::write(&path, "Id,Death_year\n1,1990\n").unwrap();

    let session = session();
    let mut options = ReadOptions::new();
    options.insert("inferSchema".to_string(), "false".to_string());
    let relation = session.read("csv", &path, &options).unwrap();

    let schema = session.schema(&relation).unwrap();
    assert!(schema.iter().all(|c| c.data_type == "VARCHAR"));
}

#[test]
fn test_read_custom_delimiter_and_null_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.csv");
    fs::write(&path, "Id;Death_year\n1;NA\n2;1990\n").unwrap();

    let session = session();
    let mut options = ReadOptions::new();
    options.insert("delimiter".to_string(), ";".to_string());
    options.insert("nullValue".to_string(), "NA".to_string());
    let relation = session.read("csv", &path, &options).unwrap();

    let rows = session.collect(&relation.order_by(vec![crate::plan::SortKey::asc("Id")])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("Death_year"), Some(&json!(null)));
    assert_eq!(rows[1].get("Death_year"), Some(&json!(1990)));
}

#[test]
fn test_view_registration_and_sql() {
    let session = session();
    let values = session.sql("SELECT * FROM (VALUES (1, 'A'), (2, 'B')) AS t(\"Id\", \"Name\")");

    session.create_or_replace_view("people", &values).unwrap();
    let relation = session.sql("SELECT \"Name\" FROM people WHERE \"Id\" = 2");

    let rows = session.collect(&relation).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Name"), Some(&json!("B")));
}

#[test]
fn test_view_replacement() {
    let session = session();
    session
        .create_or_replace_view("v", &session.sql("SELECT 1 AS x"))
        .unwrap();
    session
        .create_or_replace_view("v", &session.sql("SELECT 2 AS x UNION ALL SELECT 3"))
        .unwrap();

    assert_eq!(session.count(&session.sql("SELECT * FROM v")).unwrap(), 2);
}

#[test]
fn test_view_name_must_be_identifier() {
    let session = session();
    let err = session
        .create_or_replace_view("bad name", &session.sql("SELECT 1"))
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_view_over_missing_file_fails_on_registration() {
    let dir = tempdir().unwrap();
    let session = session();
    let relation = session
        .read("csv", dir.path().join("missing.csv"), &ReadOptions::new())
        .unwrap();

    let err = session.create_or_replace_view("raw", &relation).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
}

#[test]
fn test_schema_reports_columns_in_order() {
    let session = session();
    let relation = session.sql("SELECT 1::INTEGER AS a, 'x' AS b, 2::BIGINT AS c");

    let schema = session.schema(&relation).unwrap();
    let summary: Vec<(String, String)> = schema
        .into_iter()
        .map(|c| (c.name, c.data_type))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a".to_string(), "INTEGER".to_string()),
            ("b".to_string(), "VARCHAR".to_string()),
            ("c".to_string(), "BIGINT".to_string()),
        ]
    );
}

#[test]
fn test_collect_nulls_and_types() {
    let session = session();
    let relation = session.sql("SELECT NULL::INTEGER AS y, 3::BIGINT AS n, true AS f");

    let rows = session.collect(&relation).unwrap();
    assert_eq!(
        serde_json::Value::Object(rows[0].clone()),
        json!({"y": null, "n": 3, "f": true})
    );
}

#[test]
fn test_query_error_surfaces_as_engine_error() {
    let session = session();
    let err = session.count(&session.sql("SELECT * FROM nowhere")).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
}
