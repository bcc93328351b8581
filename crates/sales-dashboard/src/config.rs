//! Configuration types for the dashboard pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Which version of the numeric columns the scalar metrics are summed over.
///
/// The outlier clamp rewrites numeric columns in place, so "Total Sales"
/// differs depending on whether it is computed before or after clamping.
/// The basis used is always reported alongside the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricsBasis {
    /// Sum the cleaned values before outlier clamping.
    #[default]
    Raw,
    /// Sum the values after outlier clamping.
    Clamped,
}

/// Configuration for the dashboard pipeline.
///
/// Use [`DashboardConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_dashboard::config::{DashboardConfig, MetricsBasis};
///
/// let config = DashboardConfig::builder()
///     .preview_rows(10)
///     .metrics_basis(MetricsBasis::Clamped)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of rows shown in the dataset preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Multiplier applied to the IQR when building the Tukey fence.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Whether metrics are summed before or after outlier clamping.
    /// Default: Raw
    pub metrics_basis: MetricsBasis,

    /// Whether derived numeric columns (profit margin, price per unit,
    /// shipping delay) are clamped along with the input columns.
    /// Default: false
    pub clamp_derived_columns: bool,

    /// Number of rows used by the CSV reader to infer column types.
    /// Default: 100
    pub infer_schema_length: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            iqr_multiplier: 1.5,
            metrics_basis: MetricsBasis::default(),
            clamp_derived_columns: false,
            infer_schema_length: 100,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidSchemaLength(
                self.infer_schema_length,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Invalid IQR multiplier: {0} (must be a finite value >= 0.0)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid schema inference length: {0} (must be at least 1)")]
    InvalidSchemaLength(usize),
}

impl From<ConfigValidationError> for crate::error::DashboardError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::DashboardError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    base: Option<DashboardConfig>,
    preview_rows: Option<usize>,
    iqr_multiplier: Option<f64>,
    metrics_basis: Option<MetricsBasis>,
    clamp_derived_columns: Option<bool>,
    infer_schema_length: Option<usize>,
}

impl DashboardConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON).
    ///
    /// Values set explicitly on the builder still take precedence.
    pub fn base(mut self, config: DashboardConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the IQR multiplier used for the outlier fence.
    ///
    /// # Arguments
    /// * `multiplier` - Non-negative value (1.5 is the classic Tukey fence)
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set whether metrics are computed on raw or clamped values.
    pub fn metrics_basis(mut self, basis: MetricsBasis) -> Self {
        self.metrics_basis = Some(basis);
        self
    }

    /// Enable or disable clamping of derived numeric columns.
    pub fn clamp_derived_columns(mut self, clamp: bool) -> Self {
        self.clamp_derived_columns = Some(clamp);
        self
    }

    /// Set the number of rows used for CSV schema inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = DashboardConfig {
            preview_rows: self.preview_rows.unwrap_or(base.preview_rows),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(base.iqr_multiplier),
            metrics_basis: self.metrics_basis.unwrap_or(base.metrics_basis),
            clamp_derived_columns: self
                .clamp_derived_columns
                .unwrap_or(base.clamp_derived_columns),
            infer_schema_length: self.infer_schema_length.unwrap_or(base.infer_schema_length),
        };

        config.validate()?;
        Ok(config)
    }
}
