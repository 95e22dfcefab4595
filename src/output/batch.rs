//! Flat records to Arrow conversion
//!
//! The Arrow schema comes from the job's [`TableSchema`], never from the data,
//! so a zero-row job still produces a fully-typed (empty) batch.

use crate::error::{Error, Result};
use crate::flatten::{FlatRecord, Scalar};
use crate::schema::{ColumnKind, TableSchema};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Arrow data type of a column kind
pub fn arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Text => DataType::Utf8,
        ColumnKind::Integer => DataType::Int64,
        ColumnKind::Float => DataType::Float64,
    }
}

/// Arrow schema for a table; every column is nullable
pub fn arrow_schema(schema: &TableSchema) -> Schema {
    let fields: Vec<Field> = schema
        .columns()
        .iter()
        .map(|col| Field::new(&col.name, arrow_type(col.kind), true))
        .collect();
    Schema::new(fields)
}

/// Convert flat records to a RecordBatch with the table's columns
///
/// Fields a record lacks are null. Fields outside the schema are ignored.
pub fn records_to_batch(schema: &TableSchema, records: &[FlatRecord]) -> Result<RecordBatch> {
    let arrow = Arc::new(arrow_schema(schema));

    if records.is_empty() {
        return Ok(RecordBatch::new_empty(arrow));
    }

    let columns = schema
        .columns()
        .iter()
        .map(|col| {
            let values: Vec<Option<&Scalar>> =
                records.iter().map(|record| record.get(&col.name)).collect();
            build_array(&values, col.kind)
        })
        .collect::<Vec<_>>();

    RecordBatch::try_new(arrow, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

fn build_array(values: &[Option<&Scalar>], kind: ColumnKind) -> ArrayRef {
    match kind {
        ColumnKind::Integer => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Scalar::as_i64)).collect();
            Arc::new(arr)
        }

        ColumnKind::Float => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Scalar::as_f64)).collect();
            Arc::new(arr)
        }

        ColumnKind::Text => {
            let arr: StringArray = values
                .iter()
                .map(|v| match v {
                    Some(Scalar::Text(s)) => Some(s.clone()),
                    Some(Scalar::Number(n)) => Some(n.to_string()),
                    Some(Scalar::Null) | None => None,
                })
                .collect();
            Arc::new(arr)
        }
    }
}
