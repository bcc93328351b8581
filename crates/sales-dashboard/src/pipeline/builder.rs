//! Main dashboard pipeline module.
//!
//! This module provides the core `Dashboard` struct and builder for
//! orchestrating one load-clean-derive-present pass.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, DashboardConfig, MetricsBasis};
use crate::error::Result;
use crate::loader::{DataLoader, RawTable, Upload};
use crate::pipeline::derivations::DerivationStage;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, DashboardStage, ProgressReporter, ProgressUpdate,
};
use crate::presenter::{ChartBuilder, Presenter};
use crate::profiler::DataProfiler;
use crate::types::{ChartKind, DashboardView};
use crate::utils::{is_numeric_dtype, numeric_column_names};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The dashboard pipeline.
///
/// Use [`Dashboard::builder()`] to create a dashboard with custom configuration.
/// Every call to [`render`](Self::render) runs the whole pipeline from the
/// raw table; nothing is cached between calls.
///
/// # Example
///
/// ```rust,ignore
/// use sales_dashboard::{Dashboard, DashboardConfig, Upload};
///
/// let view = Dashboard::builder()
///     .config(DashboardConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .render_upload(Some(Upload::new("sales.csv", bytes)))?;
///
/// println!("{}", sales_dashboard::render_text(&view));
/// ```
pub struct Dashboard {
    config: DashboardConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    loader: DataLoader,
    cleaner: DataCleaner,
}

static_assertions::assert_impl_all!(Dashboard: Send);

impl Dashboard {
    /// Create a new dashboard builder.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    /// The configuration this dashboard was built with.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load an uploaded file and render it.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NoDataLoaded`](crate::error::DashboardError::NoDataLoaded)
    /// when nothing was uploaded. Callers should show the prompt and stop.
    pub fn render_upload(&self, upload: Option<Upload>) -> Result<DashboardView> {
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Loading,
            0.0,
            "Reading uploaded file...",
        ));
        let table = self.loader.from_upload(upload).inspect_err(|e| self.fail(e))?;
        self.render(table)
    }

    /// Load a CSV from a fixed path and render it.
    pub fn render_path(&self, path: impl AsRef<Path>) -> Result<DashboardView> {
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Loading,
            0.0,
            "Reading dataset...",
        ));
        let table = self.loader.from_path(path).inspect_err(|e| self.fail(e))?;
        self.render(table)
    }

    /// Run every stage on an already loaded table.
    pub fn render(&self, table: RawTable) -> Result<DashboardView> {
        match self.render_internal(table) {
            Ok(view) => {
                self.report_progress(ProgressUpdate::complete("Dashboard ready"));
                Ok(view)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn fail(&self, e: &crate::error::DashboardError) {
        if !e.is_prompt() {
            error!("Dashboard error: {}", e);
        }
        self.report_progress(ProgressUpdate::failed(e.to_string()));
    }

    fn render_internal(&self, table: RawTable) -> Result<DashboardView> {
        let start_time = Instant::now();
        let RawTable { source, df } = table;
        let mut processing_steps: Vec<String> = Vec::new();

        info!("Building dashboard for {}", source.name());
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Loading,
            1.0,
            format!("Loaded {} rows x {} columns", df.height(), df.width()),
        ));

        // Step 1: Clean
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        let (df, cleaning) = self.cleaner.clean(df)?;
        processing_steps.push(format!(
            "Removed {} duplicate rows and {} rows with missing values",
            cleaning.duplicates_removed, cleaning.rows_with_missing_removed
        ));
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Cleaning,
            1.0,
            format!("{} rows remain after cleaning", cleaning.rows_after),
        ));

        // Step 2: Detect columns and build the overview from the cleaned table
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Profiling,
            0.0,
            "Detecting columns...",
        ));
        let columns = DataProfiler::detect_columns(&df);
        let preview = DataProfiler::preview(&df, self.config.preview_rows)?;
        let summary_statistics = DataProfiler::summary_statistics(&df)?;
        let missing_values = DataProfiler::missing_counts(&df);
        let input_numeric = numeric_column_names(&df);
        debug!("Detected columns: {:?}", columns);

        let raw_metrics = match self.config.metrics_basis {
            MetricsBasis::Raw => Some(Presenter::metrics(&df, &columns, MetricsBasis::Raw)?),
            MetricsBasis::Clamped => None,
        };
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Profiling,
            1.0,
            "Overview ready",
        ));

        // Step 3: Derived columns
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Deriving,
            0.0,
            "Deriving columns...",
        ));
        let mut df = df;
        let derived_columns = DerivationStage::derive(&mut df, &columns, &mut processing_steps)?;
        self.report_progress(ProgressUpdate::new(
            DashboardStage::Deriving,
            1.0,
            format!("Derived {} columns", derived_columns.len()),
        ));

        // Step 4: Clamp outliers
        self.report_progress(ProgressUpdate::new(
            DashboardStage::OutlierClamping,
            0.0,
            "Clamping outliers...",
        ));
        let mut clamp_targets = input_numeric;
        if self.config.clamp_derived_columns {
            for name in &derived_columns {
                if is_numeric_dtype(df.column(name)?.dtype()) {
                    clamp_targets.push(name.clone());
                }
            }
        }
        let clamped = OutlierHandler::clamp_to_fences(
            &mut df,
            &clamp_targets,
            self.config.iqr_multiplier,
            &mut processing_steps,
        )?;
        self.report_progress(ProgressUpdate::new(
            DashboardStage::OutlierClamping,
            1.0,
            format!("Clamped {} values", clamped),
        ));

        // Step 5: Metrics and charts
        let metrics = match raw_metrics {
            Some(metrics) => metrics,
            None => Presenter::metrics(&df, &columns, MetricsBasis::Clamped)?,
        };

        let (charts, skipped) = ChartBuilder::build_all(&df, &columns, |idx, kind| {
            self.report_progress(ProgressUpdate::with_sub_stage(
                DashboardStage::Presenting,
                format!("Chart: {}", kind.title()),
                idx as f32 / ChartKind::ALL.len() as f32,
                format!("Building {}", kind.title()),
            ));
        })?;
        for section in &skipped {
            processing_steps.push(format!(
                "Skipped {}: {}",
                section.kind.title(),
                section.reason
            ));
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Dashboard built in {}ms: {} charts, {} skipped",
            duration_ms,
            charts.len(),
            skipped.len()
        );

        Ok(DashboardView {
            source,
            cleaning,
            columns,
            derived_columns,
            preview,
            summary_statistics,
            missing_values,
            metrics,
            charts,
            skipped,
            processing_steps,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Dashboard`] instance.
///
/// Use [`Dashboard::builder()`] to get started.
#[derive(Default)]
pub struct DashboardBuilder {
    config: Option<DashboardConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(DashboardBuilder: Send);

impl DashboardBuilder {
    /// Set the dashboard configuration.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during rendering.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the dashboard.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Dashboard, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Dashboard {
            loader: DataLoader::new(config.infer_schema_length),
            config,
            progress_reporter: self.progress_reporter,
            cleaner: DataCleaner,
        })
    }
}
