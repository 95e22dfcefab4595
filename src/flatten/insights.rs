//! Insight row projection
//!
//! Insight rows are already flat. They are projected onto the job's column
//! set so absent fields become nulls, and numeric metrics (sent by the API as
//! strings) are coerced to numbers.

use super::record::{FlatRecord, Scalar};
use crate::error::{Error, Result};
use crate::schema::{ColumnKind, TableSchema};
use crate::types::{json_type_name, RawRecord};
use serde_json::{Number, Value};

/// Project one insight row onto `schema`
///
/// Keys outside the schema are dropped. Values that cannot be read as the
/// column's numeric type become null.
pub fn project_insight(raw: &RawRecord, schema: &TableSchema) -> Result<FlatRecord> {
    let Value::Object(row) = raw else {
        return Err(Error::contract(format!(
            "insight row must be a JSON object, got {}",
            json_type_name(raw)
        )));
    };

    Ok(schema
        .columns()
        .iter()
        .map(|column| {
            let value = row.get(&column.name).unwrap_or(&Value::Null);
            (column.name.as_str(), coerce(value, column.kind))
        })
        .collect())
}

/// Coerce a JSON value to a column type
pub fn coerce(value: &Value, kind: ColumnKind) -> Scalar {
    match kind {
        ColumnKind::Text => Scalar::from_json(value),
        ColumnKind::Integer => to_integer(value).map_or(Scalar::Null, |n| Scalar::Number(n.into())),
        ColumnKind::Float => to_float(value)
            .and_then(Number::from_f64)
            .map_or(Scalar::Null, Scalar::Number),
    }
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
        }
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn whole_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}
