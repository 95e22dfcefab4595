//! Table file writers
//!
//! Every writer truncates its target and writes a single RecordBatch, so a
//! rerun replaces the previous table instead of appending to it.

use crate::error::{Error, Result};
use crate::types::OutputFormat;
use arrow::json::writer::LineDelimited;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rows per Parquet row group when nothing else is configured
pub const DEFAULT_ROW_GROUP_ROWS: usize = 64 * 1024;

/// Parquet encoding options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParquetOptions {
    /// Page compression codec
    pub compression: Compression,
    /// Upper bound on rows per row group
    pub row_group_rows: usize,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_rows: DEFAULT_ROW_GROUP_ROWS,
        }
    }
}

impl ParquetOptions {
    fn properties(self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_rows.max(1))
            .build()
    }
}

/// Write `batch` as a Parquet file
///
/// A batch without rows still produces a valid file carrying the schema.
pub fn write_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    options: ParquetOptions,
) -> Result<usize> {
    let path = path.as_ref();
    let file = create_file(path)?;
    let parquet_err =
        |e: parquet::errors::ParquetError| Error::output(format!("{}: {e}", path.display()));

    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(options.properties())).map_err(parquet_err)?;
    if batch.num_rows() > 0 {
        writer.write(batch).map_err(parquet_err)?;
    }
    writer.close().map_err(parquet_err)?;
    Ok(batch.num_rows())
}

/// Write `batch` as CSV with a header row
///
/// The header is written even when the batch has no rows.
pub fn write_csv(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let out = BufWriter::new(create_file(path.as_ref())?);
    let mut csv = arrow::csv::WriterBuilder::new().with_header(true).build(out);
    csv.write(batch)?;
    csv.into_inner().flush()?;
    Ok(batch.num_rows())
}

/// Write `batch` as JSON Lines, one object per row with nulls spelled out
pub fn write_jsonl(path: impl AsRef<Path>, batch: &RecordBatch) -> Result<usize> {
    let out = BufWriter::new(create_file(path.as_ref())?);
    let mut lines = arrow::json::WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, LineDelimited>(out);
    lines.write(batch)?;
    lines.finish()?;
    lines.into_inner().flush()?;
    Ok(batch.num_rows())
}

/// Write `batch` to `path` in `format`, returning the row count
pub fn write_batch(path: &Path, batch: &RecordBatch, format: OutputFormat) -> Result<usize> {
    match format {
        OutputFormat::Csv => write_csv(path, batch),
        OutputFormat::Parquet => write_parquet(path, batch, ParquetOptions::default()),
        OutputFormat::Json => write_jsonl(path, batch),
    }
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| Error::output(format!("Cannot create {}: {e}", path.display())))
}
