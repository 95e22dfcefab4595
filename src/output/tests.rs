//! Tests for output module

use super::*;
use crate::flatten::{FlatRecord, Scalar};
use crate::schema::{ad_metadata_schema, insight_schema, Column, ColumnKind, TableSchema};
use crate::types::OutputFormat;
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::{json, Number, Value};
use std::fs::File;
use tempfile::tempdir;

fn report_schema() -> TableSchema {
    TableSchema::new([
        Column::text("ad_id"),
        Column::new("impressions", ColumnKind::Integer),
        Column::new("spend", ColumnKind::Float),
    ])
}

fn row(id: &str, impressions: Option<i64>, spend: Option<f64>) -> FlatRecord {
    FlatRecord::from_iter([
        ("ad_id", Scalar::text(id)),
        (
            "impressions",
            impressions.map_or(Scalar::Null, |n| Scalar::Number(n.into())),
        ),
        (
            "spend",
            spend
                .and_then(Number::from_f64)
                .map_or(Scalar::Null, Scalar::Number),
        ),
    ])
}

fn rows() -> Vec<FlatRecord> {
    vec![row("a1", Some(100), Some(1.25)), row("a2", None, None)]
}

// ============================================================================
// Batch Conversion Tests
// ============================================================================

#[test]
fn test_arrow_schema_follows_table_schema() {
    let schema = arrow_schema(&report_schema());
    let types: Vec<(&str, &DataType)> = schema
        .fields()
        .iter()
        .map(|f| (f.name().as_str(), f.data_type()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("ad_id", &DataType::Utf8),
            ("impressions", &DataType::Int64),
            ("spend", &DataType::Float64),
        ]
    );
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_records_to_batch() {
    let batch = records_to_batch(&report_schema(), &rows()).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 3);

    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(ids.value(0), "a1");

    let impressions = batch
        .column(1)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(impressions.value(0), 100);
    assert!(impressions.is_null(1));

    let spend = batch
        .column(2)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((spend.value(0) - 1.25).abs() < f64::EPSILON);
    assert!(spend.is_null(1));
}

#[test]
fn test_records_to_batch_missing_and_extra_fields() {
    let schema = TableSchema::new([Column::text("a"), Column::text("b")]);
    let records = vec![FlatRecord::from_iter([
        ("b", Scalar::Number(7.into())),
        ("extra", Scalar::text("ignored")),
    ])];

    let batch = records_to_batch(&schema, &records).unwrap();
    assert_eq!(batch.num_columns(), 2);

    let a = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
    let b = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
    assert!(a.is_null(0));
    assert_eq!(b.value(0), "7");
}

#[test]
fn test_records_to_batch_empty_keeps_columns() {
    let batch = records_to_batch(&ad_metadata_schema(), &[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 26);
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_parquet_options_default_to_snappy() {
    let options = ParquetOptions::default();
    assert_eq!(options.compression, Compression::SNAPPY);
    assert_eq!(options.row_group_rows, DEFAULT_ROW_GROUP_ROWS);
}

#[test]
fn test_write_parquet_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.parquet");
    let batch = records_to_batch(&report_schema(), &rows()).unwrap();

    let rows = write_parquet(&path, &batch, ParquetOptions::default()).unwrap();
    assert_eq!(rows, 2);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);
    assert_eq!(batches[0].schema().field(1).data_type(), &DataType::Int64);
}

#[test]
fn test_write_parquet_small_row_groups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grouped.parquet");
    let batch = records_to_batch(&report_schema(), &rows()).unwrap();
    let options = ParquetOptions {
        compression: Compression::UNCOMPRESSED,
        row_group_rows: 1,
    };

    assert_eq!(write_parquet(&path, &batch, options).unwrap(), 2);

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap()).unwrap();
    assert_eq!(builder.metadata().num_row_groups(), 2);
}

#[test]
fn test_write_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let batch = records_to_batch(&report_schema(), &rows()).unwrap();

    assert_eq!(write_csv(&path, &batch).unwrap(), 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["ad_id,impressions,spend", "a1,100,1.25", "a2,,"]);
}

#[test]
fn test_write_csv_empty_has_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let batch = records_to_batch(&report_schema(), &[]).unwrap();

    assert_eq!(write_csv(&path, &batch).unwrap(), 0);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim_end(), "ad_id,impressions,spend");
}

#[test]
fn test_write_jsonl_explicit_nulls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.jsonl");
    let batch = records_to_batch(&report_schema(), &rows()).unwrap();

    assert_eq!(write_jsonl(&path, &batch).unwrap(), 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            json!({"ad_id": "a1", "impressions": 100, "spend": 1.25}),
            json!({"ad_id": "a2", "impressions": null, "spend": null}),
        ]
    );
}

// ============================================================================
// Sink Tests
// ============================================================================

#[tokio::test]
async fn test_file_sink_writes_each_format() {
    let dir = tempdir().unwrap();

    for format in [OutputFormat::Csv, OutputFormat::Parquet, OutputFormat::Json] {
        let sink = FileSink::new(dir.path().join("out"), format);
        let rows = sink
            .write("facebook_ads_insights", &report_schema(), &rows())
            .await
            .unwrap();
        assert_eq!(rows, 2);

        let path = sink.path_for("facebook_ads_insights");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("facebook_ads_insights.{}", format.extension())
        );
        assert!(path.exists());
    }
}

#[tokio::test]
async fn test_file_sink_zero_rows_still_writes_file() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), OutputFormat::Csv);
    let schema = insight_schema(&["ad_id".to_string(), "spend".to_string()], &[]);

    let rows = sink.write("facebook_ads_insights", &schema, &[]).await.unwrap();
    assert_eq!(rows, 0);

    let content = std::fs::read_to_string(sink.path_for("facebook_ads_insights")).unwrap();
    assert_eq!(content.trim_end(), "ad_id,spend");
}

#[tokio::test]
async fn test_file_sink_overwrites_previous_output() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), OutputFormat::Csv);

    sink.write("t", &report_schema(), &rows()).await.unwrap();
    sink.write("t", &report_schema(), &rows()[..1]).await.unwrap();

    let content = std::fs::read_to_string(sink.path_for("t")).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn test_file_sink_rejects_path_like_destination() {
    let dir = tempdir().unwrap();
    let sink = FileSink::new(dir.path(), OutputFormat::Csv);

    let err = sink
        .write("../escape", &report_schema(), &rows())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid destination"));
}

#[tokio::test]
async fn test_memory_sink() {
    let sink = MemorySink::new();
    assert!(sink.table("a").await.is_none());

    sink.write("b", &report_schema(), &rows()).await.unwrap();
    sink.write("a", &report_schema(), &[]).await.unwrap();

    assert_eq!(sink.destinations().await, vec!["a", "b"]);
    let table = sink.table("b").await.unwrap();
    assert_eq!(table.records, rows());
    assert_eq!(table.schema, report_schema());
}
