//! Data cleaning module for the dashboard pipeline.
//!
//! This module provides functionality for:
//! - Normalizing column labels
//! - Removing duplicate rows
//! - Removing rows with any missing value

mod sanitizers;

pub(crate) use sanitizers::normalize_column_name;

use crate::error::{DashboardError, Result};
use crate::types::CleaningSummary;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Data cleaner for the straight-line cleaning pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a raw table.
    ///
    /// This includes:
    /// 1. Normalizing column labels (trim, spaces to underscores)
    /// 2. Removing exact duplicate rows, keeping the first occurrence
    /// 3. Removing rows with a missing value (null or NaN) in any column
    ///
    /// Rows only ever shrink and no column is removed.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut df = df;
        let mut summary = CleaningSummary {
            rows_before: df.height(),
            ..CleaningSummary::default()
        };

        info!("Performing data cleaning...");

        if df.width() == 0 {
            return Ok((df, summary));
        }

        // 1. Normalize column labels
        summary.renamed_columns = Self::normalize_columns(&mut df)?;
        if !summary.renamed_columns.is_empty() {
            debug!("Normalized {} column labels", summary.renamed_columns.len());
        }

        // 2. Remove duplicate rows
        let before_duplicates = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        summary.duplicates_removed = before_duplicates - df.height();
        debug!("Removed {} duplicate rows", summary.duplicates_removed);

        // 3. Remove rows with any missing value
        df = sanitizers::nan_to_null(df)?;
        let before_missing = df.height();
        df = Self::drop_rows_with_missing(df)?;
        summary.rows_with_missing_removed = before_missing - df.height();
        debug!(
            "Removed {} rows with missing values",
            summary.rows_with_missing_removed
        );

        summary.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows",
            summary.rows_before, summary.rows_after
        );

        Ok((df, summary))
    }

    /// Rename every column to its normalized label.
    fn normalize_columns(df: &mut DataFrame) -> Result<Vec<(String, String)>> {
        let originals: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let normalized: Vec<String> = originals
            .iter()
            .map(|name| normalize_column_name(name))
            .collect();

        let mut seen = HashSet::new();
        for name in &normalized {
            if !seen.insert(name.as_str()) {
                return Err(DashboardError::DuplicateColumn(name.clone()));
            }
        }

        let renamed: Vec<(String, String)> = originals
            .iter()
            .zip(&normalized)
            .filter(|(original, new)| original != new)
            .map(|(original, new)| (original.clone(), new.clone()))
            .collect();

        if !renamed.is_empty() {
            df.set_column_names(normalized)?;
        }

        Ok(renamed)
    }

    /// Keep only rows where every column is non-null.
    fn drop_rows_with_missing(df: DataFrame) -> Result<DataFrame> {
        if df.width() == 0 || df.height() == 0 {
            return Ok(df);
        }

        let mut mask_values = vec![true; df.height()];
        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let null_mask = col.as_materialized_series().is_null();
            for (keep, is_null) in mask_values.iter_mut().zip(&null_mask) {
                if is_null.unwrap_or(false) {
                    *keep = false;
                }
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        df.filter(&mask)
            .map_err(|e| DashboardError::CleaningFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_duplicates_and_missing() {
        let df = df![
            "Sales" => [Some(10.0), Some(10.0), None, Some(30.0)],
            "Region" => [Some("East"), Some("East"), Some("West"), Some("South")],
        ]
        .unwrap();

        let (df, summary) = DataCleaner.clean(df).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(summary.rows_before, 4);
        assert_eq!(summary.rows_after, 2);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.rows_with_missing_removed, 1);
    }

    #[test]
    fn test_clean_preserves_row_order() {
        let df = df![
            "Region" => ["West", "East", "West", "South"],
        ]
        .unwrap();

        let (df, _) = DataCleaner.clean(df).unwrap();
        let regions: Vec<Option<&str>> = df.column("Region").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(regions, vec![Some("West"), Some("East"), Some("South")]);
    }

    #[test]
    fn test_clean_normalizes_column_names() {
        let df = df![
            " Order Date " => ["2020-01-01"],
            "Sales" => [1.0],
        ]
        .unwrap();

        let (df, summary) = DataCleaner.clean(df).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

        assert_eq!(names, vec!["Order_Date", "Sales"]);
        assert_eq!(
            summary.renamed_columns,
            vec![(" Order Date ".to_string(), "Order_Date".to_string())]
        );
    }

    #[test]
    fn test_clean_rejects_colliding_names() {
        let df = df![
            "Sales" => [1.0],
            "Sales " => [2.0],
        ]
        .unwrap();

        let err = DataCleaner.clean(df).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_COLUMN");
    }

    #[test]
    fn test_clean_treats_nan_as_missing() {
        let df = df![
            "Profit" => [1.0, f64::NAN, 3.0],
        ]
        .unwrap();

        let (df, summary) = DataCleaner.clean(df).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(summary.rows_with_missing_removed, 1);
    }

    #[test]
    fn test_clean_never_grows_and_leaves_no_nulls() {
        let df = df![
            "a" => [Some(1i64), None, Some(1), Some(4), None],
            "b" => [Some("x"), Some("y"), Some("x"), None, None],
        ]
        .unwrap();
        let before = df.height();

        let (df, _) = DataCleaner.clean(df).unwrap();

        assert!(df.height() <= before);
        for col in df.get_columns() {
            assert_eq!(col.null_count(), 0, "column {} has nulls", col.name());
        }
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_clean_empty_dataframe() {
        let (df, summary) = DataCleaner.clean(DataFrame::empty()).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(summary.rows_after, 0);
    }
}
