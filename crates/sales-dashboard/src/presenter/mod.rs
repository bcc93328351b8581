//! Presentation of the processed table.
//!
//! This module provides functionality for:
//! - The three headline metrics
//! - Chart aggregation (see [`charts`])
//! - Terminal rendering of a finished [`DashboardView`](crate::types::DashboardView)

pub mod charts;
mod text;

pub use charts::{ChartBuilder, ChartOutcome};
pub use text::render_text;

use crate::config::MetricsBasis;
use crate::error::Result;
use crate::profiler::ColumnMapping;
use crate::types::{Metric, MetricSet};
use crate::utils::column_sum;
use polars::prelude::*;

pub const TOTAL_SALES: &str = "Total Sales";
pub const TOTAL_PROFIT: &str = "Total Profit";
pub const TOTAL_QUANTITY: &str = "Total Quantity";

/// Read-only projections used by the dashboard.
pub struct Presenter;

impl Presenter {
    /// Sum the detected sales, profit and quantity columns.
    ///
    /// A column that was not detected yields 0 and is reported as
    /// unavailable. `basis` records which version of the table `df` is.
    pub fn metrics(df: &DataFrame, mapping: &ColumnMapping, basis: MetricsBasis) -> Result<MetricSet> {
        Ok(MetricSet {
            basis,
            total_sales: Self::metric(df, TOTAL_SALES, &mapping.sales)?,
            total_profit: Self::metric(df, TOTAL_PROFIT, &mapping.profit)?,
            total_quantity: Self::metric(df, TOTAL_QUANTITY, &mapping.quantity)?,
        })
    }

    fn metric(df: &DataFrame, label: &str, column: &Option<String>) -> Result<Metric> {
        match column {
            Some(name) => Ok(Metric::new(label, column_sum(df, name)?, Some(name.clone()))),
            None => Ok(Metric::new(label, 0.0, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_sum_detected_columns() {
        let df = df![
            "Sales" => [10.0, 20.5],
            "Quantity" => [1i64, 3],
        ]
        .unwrap();
        let mapping = ColumnMapping::resolve(&["Sales", "Quantity"]);

        let metrics = Presenter::metrics(&df, &mapping, MetricsBasis::Raw).unwrap();

        assert_eq!(metrics.total_sales.value, 30.5);
        assert_eq!(metrics.total_quantity.value, 4.0);
        assert!(metrics.total_sales.is_available());
    }

    #[test]
    fn test_metrics_missing_column_is_zero_and_unavailable() {
        let df = df![
            "Sales" => [10.0],
        ]
        .unwrap();
        let mapping = ColumnMapping::resolve(&["Sales"]);

        let metrics = Presenter::metrics(&df, &mapping, MetricsBasis::Clamped).unwrap();

        assert_eq!(metrics.total_profit.value, 0.0);
        assert!(!metrics.total_profit.is_available());
        assert_eq!(metrics.total_profit.label, TOTAL_PROFIT);
        assert_eq!(metrics.basis, MetricsBasis::Clamped);
    }
}
