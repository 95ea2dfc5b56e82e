//! Polars DataFrame to raw row conversion
//!
//! Rows that were already parsed into a DataFrame (spreadsheet reader, CSV,
//! database) are handed over cell by cell. Column dtypes do not matter: every
//! cell becomes a `RawValue` and the normalizer decides what it means.

use super::error::{ForestError, Result};
use super::record::{RawRow, RawValue};
use polars::prelude::*;

/// Columns every input table must have
pub const REQUIRED_COLUMNS: [&str; 6] = ["subtitle", "study", "biomarker", "effect", "lower", "upper"];

/// Columns that default to absent when missing
pub const OPTIONAL_COLUMNS: [&str; 3] = ["weight", "is_subtitle", "is_summary"];

/// Convert a single cell
///
/// Categorical and enum cells resolve to their category string.
fn raw_value(value: AnyValue<'_>) -> RawValue {
    if let Some(s) = value.get_str() {
        return RawValue::Text(s.to_string());
    }
    match value {
        AnyValue::Null => RawValue::Absent,
        AnyValue::Boolean(b) => RawValue::Bool(b),
        AnyValue::Int8(v) => RawValue::Int(v as i64),
        AnyValue::Int16(v) => RawValue::Int(v as i64),
        AnyValue::Int32(v) => RawValue::Int(v as i64),
        AnyValue::Int64(v) => RawValue::Int(v),
        AnyValue::UInt8(v) => RawValue::Int(v as i64),
        AnyValue::UInt16(v) => RawValue::Int(v as i64),
        AnyValue::UInt32(v) => RawValue::Int(v as i64),
        AnyValue::UInt64(v) => i64::try_from(v)
            .map(RawValue::Int)
            .unwrap_or(RawValue::Float(v as f64)),
        AnyValue::Float32(v) => RawValue::Float(v as f64),
        AnyValue::Float64(v) => RawValue::Float(v),
        other => RawValue::Text(other.to_string()),
    }
}

/// Read one column as raw values; a missing optional column is all absent
fn column_values(df: &DataFrame, name: &str, required: bool) -> Result<Vec<RawValue>> {
    let column = match df.column(name) {
        Ok(column) => column,
        Err(_) if !required => return Ok(vec![RawValue::Absent; df.height()]),
        Err(_) => return Err(ForestError::MissingColumn(name.to_string())),
    };

    let series = column.as_materialized_series();
    (0..series.len())
        .map(|i| Ok(raw_value(series.get(i)?)))
        .collect()
}

/// Convert a DataFrame into raw rows, preserving row order
///
/// Required columns: subtitle, study, biomarker, effect, lower, upper.
/// Optional columns: weight, is_subtitle, is_summary. Others are ignored.
pub fn raw_rows_from_dataframe(df: &DataFrame) -> Result<Vec<RawRow>> {
    let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len() + OPTIONAL_COLUMNS.len());
    for name in REQUIRED_COLUMNS {
        columns.push(column_values(df, name, true)?);
    }
    for name in OPTIONAL_COLUMNS {
        columns.push(column_values(df, name, false)?);
    }

    let mut iters: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
    let mut next = |col: usize| iters[col].next().unwrap_or_default();

    let rows = (0..df.height())
        .map(|_| RawRow {
            subtitle: next(0),
            study: next(1),
            biomarker: next(2),
            effect: next(3),
            lower: next(4),
            upper: next(5),
            weight: next(6),
            is_subtitle: next(7),
            is_summary: next(8),
        })
        .collect();

    Ok(rows)
}
