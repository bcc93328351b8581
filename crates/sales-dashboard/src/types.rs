//! Core data types produced by the dashboard pipeline.

use crate::config::MetricsBasis;
use serde::{Deserialize, Serialize};

/// Where the raw table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DataSource {
    /// A fixed filesystem path.
    Path(String),
    /// An uploaded byte stream with its original file name.
    Upload(String),
}

impl DataSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Path(name) | Self::Upload(name) => name,
        }
    }
}

/// Result of the cleaning stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    pub rows_with_missing_removed: usize,
    /// `(original, normalized)` pairs for every label that changed.
    pub renamed_columns: Vec<(String, String)>,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Number of missing values in one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// The first rows of the cleaned table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub total_rows: usize,
}

/// A single scalar metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: f64,
    /// Source column; `None` when the column was not detected and the
    /// metric falls back to zero.
    pub column: Option<String>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: f64, column: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
            column,
        }
    }

    pub fn is_available(&self) -> bool {
        self.column.is_some()
    }
}

/// The three headline metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSet {
    pub basis: MetricsBasis,
    pub total_sales: Metric,
    pub total_profit: Metric,
    pub total_quantity: Metric,
}

/// Identifies one of the five dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    SalesByCategory,
    SalesByRegion,
    ProfitBySubCategory,
    MonthlySalesTrend,
    CorrelationHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::SalesByCategory,
        ChartKind::SalesByRegion,
        ChartKind::ProfitBySubCategory,
        ChartKind::MonthlySalesTrend,
        ChartKind::CorrelationHeatmap,
    ];

    /// Section heading shown above the chart.
    pub fn title(&self) -> &'static str {
        match self {
            Self::SalesByCategory => "Sales by Category",
            Self::SalesByRegion => "Sales by Region",
            Self::ProfitBySubCategory => "Profit by Sub-Category",
            Self::MonthlySalesTrend => "Monthly Sales Trend",
            Self::CorrelationHeatmap => "Correlation Heatmap",
        }
    }
}

/// A labelled value on a bar, pie or line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

/// Chart payload, shaped by chart type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        x: String,
        y: String,
        points: Vec<DataPoint>,
    },
    Pie {
        names: String,
        values: String,
        slices: Vec<DataPoint>,
    },
    Line {
        x: String,
        y: String,
        points: Vec<DataPoint>,
    },
    Heatmap {
        columns: Vec<String>,
        /// Row-major matrix; `None` where the correlation is undefined.
        matrix: Vec<Vec<Option<f64>>>,
    },
}

/// One rendered chart section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSection {
    pub kind: ChartKind,
    pub title: String,
    pub data: ChartData,
}

/// A chart that was not rendered because a required column is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSection {
    pub kind: ChartKind,
    pub reason: String,
}

/// Everything one dashboard pass produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub source: DataSource,
    pub cleaning: CleaningSummary,
    pub columns: crate::profiler::ColumnMapping,
    pub derived_columns: Vec<String>,
    pub preview: PreviewTable,
    pub summary_statistics: Vec<ColumnStatistics>,
    pub missing_values: Vec<MissingCount>,
    pub metrics: MetricSet,
    pub charts: Vec<ChartSection>,
    pub skipped: Vec<SkippedSection>,
    pub processing_steps: Vec<String>,
    pub duration_ms: u64,
}

impl DashboardView {
    /// Look up a rendered chart by kind.
    pub fn chart(&self, kind: ChartKind) -> Option<&ChartSection> {
        self.charts.iter().find(|c| c.kind == kind)
    }

    /// Pretty-printed JSON form of the whole view.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
