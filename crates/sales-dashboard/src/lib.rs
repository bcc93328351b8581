//! Retail Sales Dashboard Library
//!
//! Loads a tabular sales dataset from CSV, cleans it, derives time and
//! ratio columns, clamps numeric outliers and projects the result into a
//! serializable dashboard view.
//!
//! # Overview
//!
//! One pass runs these stages in order:
//!
//! - **Loading**: a CSV from a fixed path or an uploaded byte stream
//! - **Cleaning**: label normalization, duplicate and incomplete row removal
//! - **Column Detection**: substring matching for sales, profit, quantity and dates
//! - **Derivation**: order month, shipping delay, profit margin, price per unit
//! - **Outlier Clamping**: Tukey-fence winsorization of numeric columns
//! - **Presentation**: preview, statistics, metrics and five charts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_dashboard::{Dashboard, DashboardConfig, Upload, render_text};
//!
//! let view = Dashboard::builder()
//!     .config(DashboardConfig::default())
//!     .build()?
//!     .render_upload(Some(Upload::new("superstore.csv", bytes)))?;
//!
//! println!("{}", render_text(&view));
//! println!("{}", serde_json::to_string_pretty(&view)?);
//! ```
//!
//! # Configuration
//!
//! Use [`DashboardConfig`] to customize the pass:
//!
//! ```rust,ignore
//! use sales_dashboard::config::*;
//!
//! let config = DashboardConfig::builder()
//!     .preview_rows(10)
//!     .iqr_multiplier(3.0)
//!     .metrics_basis(MetricsBasis::Clamped)
//!     .clamp_derived_columns(true)
//!     .build()?;
//! ```
//!
//! # Missing Uploads
//!
//! Rendering without an upload returns [`DashboardError::NoDataLoaded`]. Its
//! message is the prompt to show the user; check
//! [`DashboardError::is_prompt`] to tell it apart from real failures.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod presenter;
pub mod profiler;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{ConfigValidationError, DashboardConfig, DashboardConfigBuilder, MetricsBasis};
pub use error::{DashboardError, Result as DashboardResult, ResultExt};
pub use loader::{DataLoader, RawTable, Upload};
pub use pipeline::{
    ClosureProgressReporter, Dashboard, DashboardBuilder, DashboardStage, DerivationStage,
    OutlierHandler, ProgressReporter, ProgressUpdate,
};
pub use presenter::{ChartBuilder, Presenter, render_text};
pub use profiler::{ColumnMapping, DataProfiler, LogicalField};
pub use types::{
    ChartData, ChartKind, ChartSection, CleaningSummary, ColumnStatistics, DashboardView,
    DataPoint, DataSource, Metric, MetricSet, MissingCount, PreviewTable, SkippedSection,
};
