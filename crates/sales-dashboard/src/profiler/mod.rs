//! Data profiling module for the dashboard overview.
//!
//! This module provides functionality for:
//! - Detecting the sales/profit/quantity/date columns by name
//! - Building the preview table
//! - Descriptive statistics for numeric columns
//! - Missing-value counts

mod column_detection;
pub(crate) mod statistics;

pub use column_detection::{ColumnMapping, LogicalField};

use crate::error::Result;
use crate::types::{ColumnStatistics, MissingCount, PreviewTable};
use crate::utils::{any_value_to_json, numeric_column_names, numeric_values};
use polars::prelude::*;
use statistics::{mean, quantile_sorted, sample_std, sorted_finite};
use tracing::debug;

/// Data profiler for the read-only overview sections of the dashboard.
pub struct DataProfiler;

impl DataProfiler {
    /// Resolve the logical columns of a cleaned table.
    pub fn detect_columns(df: &DataFrame) -> ColumnMapping {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = ColumnMapping::resolve(&names);

        for field in mapping.missing_fields() {
            debug!("No column matches '{}'; dependent sections disabled", field);
        }

        mapping
    }

    /// The first `rows` rows of the table as JSON cells.
    pub fn preview(df: &DataFrame, rows: usize) -> Result<PreviewTable> {
        let head = df.head(Some(rows));
        let columns: Vec<String> = head
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut table_rows = Vec::with_capacity(head.height());
        for row_idx in 0..head.height() {
            let mut cells = Vec::with_capacity(head.width());
            for col in head.get_columns() {
                cells.push(any_value_to_json(col.as_materialized_series().get(row_idx)?));
            }
            table_rows.push(cells);
        }

        Ok(PreviewTable {
            columns,
            rows: table_rows,
            total_rows: df.height(),
        })
    }

    /// Count, mean, std, min, quartiles and max for every numeric column.
    pub fn summary_statistics(df: &DataFrame) -> Result<Vec<ColumnStatistics>> {
        let mut stats = Vec::new();

        for name in numeric_column_names(df) {
            let values = numeric_values(df, &name)?;
            let sorted = sorted_finite(&values);

            stats.push(ColumnStatistics {
                count: sorted.len(),
                mean: mean(&sorted),
                std: sample_std(&sorted),
                min: sorted.first().copied(),
                q25: quantile_sorted(&sorted, 0.25),
                median: quantile_sorted(&sorted, 0.5),
                q75: quantile_sorted(&sorted, 0.75),
                max: sorted.last().copied(),
                column: name,
            });
        }

        Ok(stats)
    }

    /// Number of missing values per column, in column order.
    pub fn missing_counts(df: &DataFrame) -> Vec<MissingCount> {
        df.get_columns()
            .iter()
            .map(|col| MissingCount {
                column: col.name().to_string(),
                missing: col.null_count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_detect_columns() {
        let df = df![
            "Sales" => [1.0],
            "Region" => ["East"],
        ]
        .unwrap();

        let mapping = DataProfiler::detect_columns(&df);
        assert_eq!(mapping.sales.as_deref(), Some("Sales"));
        assert_eq!(mapping.profit, None);
    }

    #[test]
    fn test_preview_limits_rows() {
        let df = df![
            "Sales" => [1.0, 2.0, 3.0],
            "Region" => ["East", "West", "South"],
        ]
        .unwrap();

        let preview = DataProfiler::preview(&df, 2).unwrap();

        assert_eq!(preview.columns, vec!["Sales", "Region"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.rows[1][1], Value::String("West".to_string()));
    }

    #[test]
    fn test_summary_statistics_numeric_only() {
        let df = df![
            "Sales" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "Region" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap();

        let stats = DataProfiler::summary_statistics(&df).unwrap();

        assert_eq!(stats.len(), 1);
        let sales = &stats[0];
        assert_eq!(sales.column, "Sales");
        assert_eq!(sales.count, 5);
        assert_eq!(sales.mean, Some(3.0));
        assert_eq!(sales.min, Some(1.0));
        assert_eq!(sales.q25, Some(2.0));
        assert_eq!(sales.median, Some(3.0));
        assert_eq!(sales.q75, Some(4.0));
        assert_eq!(sales.max, Some(5.0));
    }

    #[test]
    fn test_missing_counts() {
        let df = df![
            "Sales" => [Some(1.0), None],
            "Region" => [Some("East"), Some("West")],
        ]
        .unwrap();

        let counts = DataProfiler::missing_counts(&df);
        assert_eq!(counts[0].column, "Sales");
        assert_eq!(counts[0].missing, 1);
        assert_eq!(counts[1].missing, 0);
    }
}
