//! Chart aggregation.
//!
//! Each chart is a group-by-sum (or correlation matrix) over the processed
//! table. A chart whose required column is absent is skipped with a reason
//! rather than failing the pass.

use crate::error::{DashboardError, Result};
use crate::pipeline::derivations::ORDER_MONTH;
use crate::profiler::ColumnMapping;
use crate::profiler::statistics::pearson;
use crate::types::{ChartData, ChartKind, ChartSection, DataPoint, SkippedSection};
use crate::utils::{numeric_column_names, numeric_values, string_values};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const CATEGORY_COLUMN: &str = "Category";
pub const REGION_COLUMN: &str = "Region";
pub const SUB_CATEGORY_COLUMN: &str = "Sub-Category";

/// Result of building a single chart.
#[derive(Debug, Clone)]
pub enum ChartOutcome {
    Rendered(ChartSection),
    Skipped(SkippedSection),
}

/// Builds the dashboard charts from a processed table.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Build every chart, in display order.
    ///
    /// `on_chart` is called with the chart's index before each chart is built.
    pub fn build_all<F>(
        df: &DataFrame,
        mapping: &ColumnMapping,
        mut on_chart: F,
    ) -> Result<(Vec<ChartSection>, Vec<SkippedSection>)>
    where
        F: FnMut(usize, ChartKind),
    {
        let mut charts = Vec::new();
        let mut skipped = Vec::new();

        for (idx, kind) in ChartKind::ALL.into_iter().enumerate() {
            on_chart(idx, kind);
            match Self::build(kind, df, mapping)? {
                ChartOutcome::Rendered(section) => charts.push(section),
                ChartOutcome::Skipped(section) => skipped.push(section),
            }
        }

        Ok((charts, skipped))
    }

    /// Build one chart, or explain why it cannot be built.
    pub fn build(kind: ChartKind, df: &DataFrame, mapping: &ColumnMapping) -> Result<ChartOutcome> {
        if let Some(reason) = Self::missing_requirement(kind, df, mapping) {
            debug!("Skipping {}: {}", kind.title(), reason);
            return Ok(ChartOutcome::Skipped(SkippedSection { kind, reason }));
        }

        let data = match kind {
            ChartKind::SalesByCategory => {
                let sales = required(kind, &mapping.sales)?;
                ChartData::Bar {
                    x: CATEGORY_COLUMN.to_string(),
                    y: sales.to_string(),
                    points: group_sum(df, CATEGORY_COLUMN, sales)?,
                }
            }
            ChartKind::SalesByRegion => {
                let sales = required(kind, &mapping.sales)?;
                ChartData::Pie {
                    names: REGION_COLUMN.to_string(),
                    values: sales.to_string(),
                    slices: group_sum(df, REGION_COLUMN, sales)?,
                }
            }
            ChartKind::ProfitBySubCategory => {
                let profit = required(kind, &mapping.profit)?;
                ChartData::Bar {
                    x: SUB_CATEGORY_COLUMN.to_string(),
                    y: profit.to_string(),
                    points: group_sum(df, SUB_CATEGORY_COLUMN, profit)?,
                }
            }
            ChartKind::MonthlySalesTrend => {
                let sales = required(kind, &mapping.sales)?;
                ChartData::Line {
                    x: ORDER_MONTH.to_string(),
                    y: sales.to_string(),
                    points: monthly_sum(df, ORDER_MONTH, sales)?,
                }
            }
            ChartKind::CorrelationHeatmap => {
                let columns = numeric_column_names(df);
                let matrix = correlation_matrix(df, &columns)?;
                ChartData::Heatmap { columns, matrix }
            }
        };

        Ok(ChartOutcome::Rendered(ChartSection {
            kind,
            title: kind.title().to_string(),
            data,
        }))
    }

    fn missing_requirement(
        kind: ChartKind,
        df: &DataFrame,
        mapping: &ColumnMapping,
    ) -> Option<String> {
        let has_column = |name: &str| df.column(name).is_ok();

        match kind {
            ChartKind::SalesByCategory | ChartKind::SalesByRegion => {
                let label = if kind == ChartKind::SalesByCategory {
                    CATEGORY_COLUMN
                } else {
                    REGION_COLUMN
                };
                if !has_column(label) {
                    Some(format!("column '{}' not found", label))
                } else if mapping.sales.is_none() {
                    Some("no sales column detected".to_string())
                } else {
                    None
                }
            }
            ChartKind::ProfitBySubCategory => {
                if !has_column(SUB_CATEGORY_COLUMN) {
                    Some(format!("column '{}' not found", SUB_CATEGORY_COLUMN))
                } else if mapping.profit.is_none() {
                    Some("no profit column detected".to_string())
                } else {
                    None
                }
            }
            ChartKind::MonthlySalesTrend => {
                if !has_column(ORDER_MONTH) {
                    Some("no order date column detected".to_string())
                } else if mapping.sales.is_none() {
                    Some("no sales column detected".to_string())
                } else {
                    None
                }
            }
            ChartKind::CorrelationHeatmap => {
                if numeric_column_names(df).is_empty() {
                    Some("no numeric columns".to_string())
                } else {
                    None
                }
            }
        }
    }
}

fn required(kind: ChartKind, column: &Option<String>) -> Result<&str> {
    column
        .as_deref()
        .ok_or_else(|| DashboardError::ColumnNotFound(format!("source column for {}", kind.title())))
}

/// Sum `value_col` per distinct `label_col`, in order of first appearance.
///
/// Null labels are excluded; null values contribute nothing to their group.
pub(crate) fn group_sum(df: &DataFrame, label_col: &str, value_col: &str) -> Result<Vec<DataPoint>> {
    let labels = string_values(df, label_col)?;
    let values = numeric_values(df, value_col)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut points: Vec<DataPoint> = Vec::new();

    for (label, value) in labels.into_iter().zip(values) {
        let Some(label) = label else { continue };
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            points.push(DataPoint { label, value: 0.0 });
            points.len() - 1
        });
        if let Some(v) = value.filter(|v| v.is_finite()) {
            points[slot].value += v;
        }
    }

    Ok(points)
}

/// Sum `value_col` per month label, ascending, skipping null months.
pub(crate) fn monthly_sum(
    df: &DataFrame,
    month_col: &str,
    value_col: &str,
) -> Result<Vec<DataPoint>> {
    let months = string_values(df, month_col)?;
    let values = numeric_values(df, value_col)?;

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (month, value) in months.into_iter().zip(values) {
        let Some(month) = month else { continue };
        let total = totals.entry(month).or_insert(0.0);
        if let Some(v) = value.filter(|v| v.is_finite()) {
            *total += v;
        }
    }

    Ok(totals
        .into_iter()
        .map(|(label, value)| DataPoint { label, value })
        .collect())
}

/// Pairwise-complete Pearson correlation matrix, row-major.
pub(crate) fn correlation_matrix(
    df: &DataFrame,
    columns: &[String],
) -> Result<Vec<Vec<Option<f64>>>> {
    let values: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<_>>()?;

    let n = columns.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&values[i], &values[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superstore_frame() -> DataFrame {
        df![
            "Category" => ["Furniture", "Technology", "Furniture", "Office"],
            "Region" => ["East", "West", "West", "East"],
            "Sub-Category" => ["Chairs", "Phones", "Tables", "Paper"],
            "Sales" => [100.0, 200.0, 50.0, 10.0],
            "Profit" => [10.0, 40.0, -5.0, 2.0],
            "order_month" => [Some("2017-11"), Some("2016-02"), Some("2017-11"), None],
        ]
        .unwrap()
    }

    fn mapping_for(df: &DataFrame) -> ColumnMapping {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        ColumnMapping::resolve(&names)
    }

    #[test]
    fn test_group_sum_first_appearance_order() {
        let df = superstore_frame();
        let points = group_sum(&df, "Category", "Sales").unwrap();

        assert_eq!(
            points,
            vec![
                DataPoint { label: "Furniture".into(), value: 150.0 },
                DataPoint { label: "Technology".into(), value: 200.0 },
                DataPoint { label: "Office".into(), value: 10.0 },
            ]
        );
    }

    #[test]
    fn test_monthly_sum_sorted_and_skips_null_months() {
        let df = superstore_frame();
        let points = monthly_sum(&df, "order_month", "Sales").unwrap();

        assert_eq!(
            points,
            vec![
                DataPoint { label: "2016-02".into(), value: 200.0 },
                DataPoint { label: "2017-11".into(), value: 150.0 },
            ]
        );
    }

    #[test]
    fn test_build_all_renders_every_chart() {
        let df = superstore_frame();
        let mapping = mapping_for(&df);

        let (charts, skipped) = ChartBuilder::build_all(&df, &mapping, |_, _| {}).unwrap();

        assert_eq!(charts.len(), 5);
        assert!(skipped.is_empty());
        assert_eq!(charts[0].kind, ChartKind::SalesByCategory);
        assert_eq!(charts[4].kind, ChartKind::CorrelationHeatmap);
    }

    #[test]
    fn test_build_all_notifies_each_chart_in_order() {
        let df = superstore_frame();
        let mapping = mapping_for(&df);
        let mut seen = Vec::new();

        ChartBuilder::build_all(&df, &mapping, |idx, kind| seen.push((idx, kind))).unwrap();

        let expected: Vec<(usize, ChartKind)> = ChartKind::ALL.into_iter().enumerate().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_missing_region_skips_only_region_chart() {
        let df = superstore_frame().drop("Region").unwrap();
        let mapping = mapping_for(&df);

        let (charts, skipped) = ChartBuilder::build_all(&df, &mapping, |_, _| {}).unwrap();

        assert_eq!(charts.len(), 4);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].kind, ChartKind::SalesByRegion);
        assert!(skipped[0].reason.contains("Region"));
    }

    #[test]
    fn test_missing_sales_skips_sales_charts() {
        let df = superstore_frame().drop("Sales").unwrap();
        let mapping = mapping_for(&df);

        let (_, skipped) = ChartBuilder::build_all(&df, &mapping, |_, _| {}).unwrap();
        let kinds: Vec<ChartKind> = skipped.iter().map(|s| s.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ChartKind::SalesByCategory,
                ChartKind::SalesByRegion,
                ChartKind::MonthlySalesTrend,
            ]
        );
    }

    #[test]
    fn test_heatmap_skipped_without_numeric_columns() {
        let df = df![
            "Category" => ["a", "b"],
        ]
        .unwrap();
        let mapping = mapping_for(&df);

        let outcome = ChartBuilder::build(ChartKind::CorrelationHeatmap, &df, &mapping).unwrap();
        assert!(matches!(outcome, ChartOutcome::Skipped(_)));
    }

    #[test]
    fn test_correlation_matrix_symmetric_with_undefined_entries() {
        let df = df![
            "a" => [1.0, 2.0, 3.0],
            "b" => [2.0, 4.0, 6.0],
            "c" => [5.0, 5.0, 5.0],
        ]
        .unwrap();
        let columns = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let matrix = correlation_matrix(&df, &columns).unwrap();

        assert!((matrix[0][1].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix[0][1], matrix[1][0]);
        assert!((matrix[0][0].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix[2][2], None);
        assert_eq!(matrix[0][2], None);
    }
}
