//! Shared utilities for the dashboard pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{DashboardError, Result, ResultExt};
use polars::prelude::*;
use serde_json::{Number, Value};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Names of all numeric columns, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Column Extraction Utilities
// =============================================================================

/// Read a column as `f64` values.
///
/// Non-numeric columns are cast non-strictly, so values that cannot be
/// parsed become `None` rather than failing the whole column.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .map_err(|_| DashboardError::ColumnNotFound(name.to_string()))?;
    let float_series = col
        .as_materialized_series()
        .cast(&DataType::Float64)
        .context(format!("Cannot read column '{}' as numbers", name))?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read a column as string values, stringifying non-string dtypes.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(name)
        .map_err(|_| DashboardError::ColumnNotFound(name.to_string()))?;
    let str_series = col
        .as_materialized_series()
        .cast(&DataType::String)
        .context(format!("Cannot read column '{}' as text", name))?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Sum the non-null values of a column, treating NaN as missing.
pub fn column_sum(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(numeric_values(df, name)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(0.0, |acc, v| acc + v))
}

// =============================================================================
// Conversion Utilities
// =============================================================================

/// Convert a Polars `AnyValue` into a JSON value for the preview table.
///
/// NaN and infinite floats become `null`; dates and other complex types
/// are stringified.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),

        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),

        AnyValue::Float32(f) => float_to_json(f as f64),
        AnyValue::Float64(f) => float_to_json(f),

        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),

        _ => Value::String(format!("{}", value)),
    }
}

/// Convert a float into a JSON number, mapping NaN/Infinity to `null`.
pub fn float_to_json(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Truncate a string to max length with ellipsis.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_column_names_keeps_order() {
        let df = df![
            "Region" => ["East", "West"],
            "Sales" => [1.0, 2.0],
            "Quantity" => [1i64, 2],
        ]
        .unwrap();

        assert_eq!(numeric_column_names(&df), vec!["Sales", "Quantity"]);
    }

    #[test]
    fn test_numeric_values_casts_strings() {
        let df = df![
            "Sales" => ["10.5", "oops", "3"],
        ]
        .unwrap();

        let values = numeric_values(&df, "Sales").unwrap();
        assert_eq!(values, vec![Some(10.5), None, Some(3.0)]);
    }

    #[test]
    fn test_numeric_values_missing_column() {
        let df = df!["Sales" => [1.0]].unwrap();
        let err = numeric_values(&df, "Profit").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_column_sum_skips_nulls() {
        let df = df!["Sales" => [Some(1.5), None, Some(2.5)]].unwrap();
        assert_eq!(column_sum(&df, "Sales").unwrap(), 4.0);
    }

    #[test]
    fn test_column_sum_of_empty_column_is_positive_zero() {
        let df = df!["Sales" => Vec::<f64>::new()].unwrap();
        let total = column_sum(&df, "Sales").unwrap();
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
    }

    #[test]
    fn test_any_value_to_json() {
        assert_eq!(any_value_to_json(AnyValue::Null), Value::Null);
        assert_eq!(any_value_to_json(AnyValue::Int64(3)), Value::from(3));
        assert_eq!(any_value_to_json(AnyValue::Float64(f64::NAN)), Value::Null);
        assert_eq!(
            any_value_to_json(AnyValue::String("East")),
            Value::String("East".to_string())
        );
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Sales", 10), "Sales");
        assert_eq!(truncate_str("Customer_Name_Long", 10), "Custome...");
    }
}
