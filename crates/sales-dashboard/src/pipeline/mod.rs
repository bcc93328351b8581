//! Pipeline module.
//!
//! This module provides the dashboard pipeline and its transforming stages.

mod builder;
pub mod derivations;
pub mod outliers;
pub mod progress;

pub use builder::{Dashboard, DashboardBuilder};
pub use derivations::DerivationStage;
pub use outliers::OutlierHandler;
pub use progress::{ClosureProgressReporter, DashboardStage, ProgressReporter, ProgressUpdate};
