//! Outlier handling module.
//!
//! Clamps numeric columns to their Tukey fences. Rows are never removed.

use crate::profiler::statistics::tukey_fence;
use crate::error::{DashboardError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::{debug, warn};

/// Handles outlier treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Clamp every listed column to `[Q1 - k*IQR, Q3 + k*IQR]`.
    ///
    /// Quartiles are computed per column over its non-null values, before
    /// any clamping of that column. Clamped columns are written back as
    /// Float64; nulls stay null. Columns that are missing from the table
    /// or hold no values are skipped.
    pub fn clamp_to_fences(
        df: &mut DataFrame,
        columns: &[String],
        multiplier: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<usize> {
        let mut total_clamped = 0;

        for name in columns {
            if df.column(name).is_err() {
                warn!("Skipping outlier clamp for missing column {}", name);
                continue;
            }

            let values = numeric_values(df, name)?;
            let Some((lower, upper)) = tukey_fence(&values, multiplier) else {
                debug!("Column {} has no values to clamp", name);
                continue;
            };

            let mut clamped_count = 0;
            let clamped: Vec<Option<f64>> = values
                .iter()
                .map(|v| {
                    v.map(|val| {
                        let bounded = val.clamp(lower, upper);
                        if bounded != val {
                            clamped_count += 1;
                        }
                        bounded
                    })
                })
                .collect();

            df.replace(name, Series::new(name.as_str().into(), clamped))
                .map_err(|e| DashboardError::DerivationFailed {
                    column: name.clone(),
                    reason: format!("outlier clamp failed: {}", e),
                })?;

            if clamped_count > 0 {
                processing_steps.push(format!(
                    "Clamped {} values in {} to [{:.4}, {:.4}]",
                    clamped_count, name, lower, upper
                ));
            }
            total_clamped += clamped_count;
        }

        debug!("Clamped {} values to IQR fences", total_clamped);
        Ok(total_clamped)
    }
}
