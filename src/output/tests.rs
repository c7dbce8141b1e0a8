//! Tests for output module

use super::*;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::plan::Relation;
use crate::session::Session;
use crate::types::{Compression, WriteMode, YearCount};
use arrow::datatypes::DataType;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;
use test_case::test_case;

fn session() -> Session {
    Session::open(&EngineConfig::default()).unwrap()
}

fn sample_relation(session: &Session) -> Relation {
    session.sql(
        "SELECT * FROM (VALUES (NULL::INTEGER, 2::BIGINT), (1990, 2), (2001, 1)) \
         AS t(\"Death_year\", \"total_deaths\")",
    )
}

fn expected_rows() -> Vec<YearCount> {
    vec![
        YearCount::new(None, 2),
        YearCount::new(Some(1990), 2),
        YearCount::new(Some(2001), 1),
    ]
}

// ============================================================================
// Write Tests
// ============================================================================

#[test]
fn test_write_single_partition() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    let outcome = session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    assert!(!outcome.skipped);
    assert_eq!(outcome.rows, 3);
    assert_eq!(outcome.files, vec![target.join("part-00000.parquet")]);
    assert!(target.join(SUCCESS_MARKER).exists());
    assert_eq!(read_artifact(&target).unwrap(), expected_rows());
}

#[test]
fn test_write_leaves_no_staging_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    let entries: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["output".to_string()]);
}

#[test]
fn test_write_schema() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    let schema = artifact_schema(&target).unwrap();
    let year = schema.field_with_name("Death_year").unwrap();
    let total = schema.field_with_name("total_deaths").unwrap();
    assert_eq!(year.data_type(), &DataType::Int32);
    assert!(year.is_nullable());
    assert_eq!(total.data_type(), &DataType::Int64);
}

#[test]
fn test_overwrite_replaces_prior_artifact() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stale.txt"), "old").unwrap();
    fs::write(target.join("part-00007.parquet"), "not parquet").unwrap();

    let session = session();
    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    assert!(!target.join("stale.txt").exists());
    assert!(!target.join("part-00007.parquet").exists());
    assert_eq!(read_artifact(&target).unwrap(), expected_rows());
}

#[test]
fn test_overwrite_replaces_plain_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    fs::write(&target, "a file, not a directory").unwrap();

    let session = session();
    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    assert!(target.is_dir());
    assert_eq!(read_artifact(&target).unwrap().len(), 3);
}

#[test]
fn test_error_if_exists_mode() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    fs::create_dir_all(&target).unwrap();

    let session = session();
    let options = WriteOptions::new().with_mode(WriteMode::ErrorIfExists);
    let err = session
        .write(&sample_relation(&session), &target, &options)
        .unwrap_err();

    assert!(matches!(err, Error::SinkWriteFailure { .. }));
}

#[test]
fn test_ignore_mode_keeps_existing() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("keep.txt"), "keep").unwrap();

    let session = session();
    let options = WriteOptions::new().with_mode(WriteMode::Ignore);
    let outcome = session
        .write(&sample_relation(&session), &target, &options)
        .unwrap();

    assert!(outcome.skipped);
    assert!(outcome.files.is_empty());
    assert!(target.join("keep.txt").exists());
}

#[test]
fn test_ignore_mode_writes_when_absent() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");

    let session = session();
    let options = WriteOptions::new().with_mode(WriteMode::Ignore);
    let outcome = session
        .write(&sample_relation(&session), &target, &options)
        .unwrap();

    assert!(!outcome.skipped);
    assert_eq!(outcome.rows, 3);
}

#[test]
fn test_multiple_partitions_preserve_order() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    let relation = session
        .sql("SELECT * FROM range(10) AS t(i)")
        .order_by(vec![crate::plan::SortKey::asc("i")]);
    let options = WriteOptions::new().with_partitions(3);
    let outcome = session.write(&relation, &target, &options).unwrap();

    assert_eq!(outcome.files.len(), 3);
    assert_eq!(outcome.rows, 10);
    assert_eq!(
        part_files(&target).unwrap(),
        vec![
            target.join("part-00000.parquet"),
            target.join("part-00001.parquet"),
            target.join("part-00002.parquet"),
        ]
    );

    let counts: Vec<i64> = outcome
        .files
        .iter()
        .map(|f| footer_row_count(f).unwrap())
        .collect();
    assert_eq!(counts, vec![4, 4, 2]);
}

#[test_case(Compression::Snappy ; "snappy")]
#[test_case(Compression::Zstd ; "zstd")]
#[test_case(Compression::Gzip ; "gzip")]
#[test_case(Compression::Uncompressed ; "uncompressed")]
fn test_compression_codecs(compression: Compression) {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    let options = WriteOptions::new().with_compression(compression);
    session
        .write(&sample_relation(&session), &target, &options)
        .unwrap();

    assert_eq!(read_artifact(&target).unwrap(), expected_rows());
}

#[test]
fn test_failed_write_keeps_prior_artifact() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();

    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    let broken = session.sql("SELECT * FROM no_such_table");
    let err = session
        .write(&broken, &target, &WriteOptions::default())
        .unwrap_err();

    // The relation never resolved, so the sink is not to blame
    assert!(matches!(err, Error::Engine(_)), "{err}");
    assert_eq!(read_artifact(&target).unwrap(), expected_rows());
    assert!(!dir.path().join(".output.staging").exists());
}

#[test]
fn test_unwritable_target() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file").unwrap();

    let session = session();
    let err = session
        .write(
            &sample_relation(&session),
            blocker.join("output"),
            &WriteOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::SinkWriteFailure { .. }));
}

#[test]
fn test_zero_partitions_rejected() {
    let err = WriteOptions::new().with_partitions(0).validate().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Reader Tests
// ============================================================================

#[test]
fn test_read_missing_artifact() {
    let dir = tempdir().unwrap();
    let err = read_artifact(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
}

#[test]
fn test_read_directory_without_parts() {
    let dir = tempdir().unwrap();
    let err = part_files(dir.path()).unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
}

#[test]
fn test_read_single_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();
    session
        .write(&sample_relation(&session), &target, &WriteOptions::default())
        .unwrap();

    let rows = read_artifact(target.join("part-00000.parquet")).unwrap();
    assert_eq!(rows, expected_rows());
}

#[test]
fn test_read_rejects_wrong_schema() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("output");
    let session = session();
    session
        .write(
            &session.sql("SELECT 'x' AS \"Death_year\", 1::BIGINT AS \"total_deaths\""),
            &target,
            &WriteOptions::default(),
        )
        .unwrap();

    let err = read_artifact(&target).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}
