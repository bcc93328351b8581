//! Sanitization helpers for column labels and float values.

use crate::error::Result;
use crate::utils::{is_float_dtype, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Normalize a column label: trim surrounding whitespace, then replace
/// every remaining space with an underscore.
pub(crate) fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Replace NaN with null in every float column so that NaN counts as a
/// missing value.
pub(crate) fn nan_to_null(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let float_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| is_float_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect();

    let mut total_replacements = 0;

    for col_name in &float_columns {
        let values = numeric_values(&df, col_name)?;
        let nan_count = values.iter().flatten().filter(|v| v.is_nan()).count();
        if nan_count == 0 {
            continue;
        }

        let cleaned: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        df.replace(col_name, Series::new(col_name.as_str().into(), cleaned))?;
        total_replacements += nan_count;
    }

    if total_replacements > 0 {
        debug!("Replaced {} NaN values with null", total_replacements);
    }

    Ok(df)
}
