//! Artifact reader
//!
//! Reads a written artifact back through the `parquet` crate, independent
//! of the query engine that produced it.

use crate::error::{Error, Result};
use crate::types::{YearCount, DEATH_YEAR_COLUMN, TOTAL_DEATHS_COLUMN};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Int32Type, Int64Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Part files of an artifact, in name order
///
/// `path` may be an artifact directory or a single Parquet file.
pub fn part_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Error::source_unavailable(
            path.display().to_string(),
            "artifact not found",
        ));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("part-") && n.ends_with(".parquet"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(Error::source_unavailable(
            path.display().to_string(),
            "artifact contains no part files",
        ));
    }
    Ok(files)
}

/// Row count recorded in a Parquet file footer
pub fn footer_row_count(file: impl AsRef<Path>) -> Result<i64> {
    let reader = SerializedFileReader::new(File::open(file.as_ref())?)?;
    Ok(reader.metadata().file_metadata().num_rows())
}

/// Arrow schema of an artifact (taken from its first part file)
pub fn artifact_schema(path: impl AsRef<Path>) -> Result<SchemaRef> {
    let files = part_files(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&files[0])?)?;
    Ok(builder.schema().clone())
}

/// Read every row of a `(Death_year, total_deaths)` artifact, in file order
pub fn read_artifact(path: impl AsRef<Path>) -> Result<Vec<YearCount>> {
    let mut rows = Vec::new();

    for file in part_files(path)? {
        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&file)?)?.build()?;
        for batch in reader {
            rows.extend(batch_to_year_counts(&batch?)?);
        }
    }

    Ok(rows)
}

fn batch_to_year_counts(batch: &RecordBatch) -> Result<Vec<YearCount>> {
    let years = column_as(batch, DEATH_YEAR_COLUMN, &DataType::Int32)?;
    let totals = column_as(batch, TOTAL_DEATHS_COLUMN, &DataType::Int64)?;

    let years = years.as_primitive::<Int32Type>();
    let totals = totals.as_primitive::<Int64Type>();

    let mut rows = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        if totals.is_null(i) {
            return Err(Error::schema_mismatch(
                TOTAL_DEATHS_COLUMN,
                format!("null count at row {i}"),
            ));
        }
        let year = (!years.is_null(i)).then(|| years.value(i));
        rows.push(YearCount::new(year, totals.value(i)));
    }
    Ok(rows)
}

fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<arrow::array::ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| Error::schema_mismatch(name, "column not found in artifact"))?;

    if !column.data_type().is_integer() {
        return Err(Error::schema_mismatch(
            name,
            format!("expected an integer column, found {}", column.data_type()),
        ));
    }
    Ok(cast(column, to)?)
}
