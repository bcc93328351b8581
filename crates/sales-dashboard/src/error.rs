//! Custom error types for the sales dashboard pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors are
//! serializable so a hosting surface can forward them to a frontend as
//! `{ code, message }` pairs.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the dashboard pipeline.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// No upload was provided (or the upload was empty).
    #[error("No data loaded: please upload a CSV file to continue")]
    NoDataLoaded,

    /// The uploaded file does not have a `.csv` extension.
    #[error("Unsupported file type '{0}': only .csv files are accepted")]
    UnsupportedFileType(String),

    /// Normalizing column labels produced the same label twice.
    #[error("Column label '{0}' appears more than once after normalization")]
    DuplicateColumn(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The CSV payload could not be parsed by any loading strategy.
    #[error("Failed to load dataset: {0}")]
    LoadFailed(String),

    /// Data cleaning failed.
    #[error("Failed to clean data: {0}")]
    CleaningFailed(String),

    /// Computing a derived column failed.
    #[error("Failed to derive column '{column}': {reason}")]
    DerivationFailed { column: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DashboardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::LoadFailed(_) => "LOAD_FAILED",
            Self::CleaningFailed(_) => "CLEANING_FAILED",
            Self::DerivationFailed { .. } => "DERIVATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the user should be prompted for input rather than shown a failure.
    ///
    /// A missing upload is not an error condition for the dashboard; it halts
    /// the pass and asks for a file.
    pub fn is_prompt(&self) -> bool {
        match self {
            Self::NoDataLoaded => true,
            Self::WithContext { source, .. } => source.is_prompt(),
            _ => false,
        }
    }

    /// Check if this error is recoverable by supplying different input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoDataLoaded | Self::UnsupportedFileType(_) | Self::InvalidConfig(_)
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DashboardError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(DashboardError::NoDataLoaded.error_code(), "NO_DATA_LOADED");
        assert_eq!(
            DashboardError::ColumnNotFound("Sales".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_no_data_loaded_is_prompt() {
        assert!(DashboardError::NoDataLoaded.is_prompt());
        assert!(
            DashboardError::NoDataLoaded
                .with_context("Loading upload")
                .is_prompt()
        );
        assert!(!DashboardError::LoadFailed("bad".to_string()).is_prompt());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(DashboardError::NoDataLoaded.is_recoverable());
        assert!(DashboardError::UnsupportedFileType("data.xlsx".to_string()).is_recoverable());
        assert!(!DashboardError::CleaningFailed("error".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_serialization() {
        let error = DashboardError::UnsupportedFileType("report.xlsx".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_FILE_TYPE"));
        assert!(json.contains("report.xlsx"));
    }

    #[test]
    fn test_with_context() {
        let error =
            DashboardError::DuplicateColumn("Sales".to_string()).with_context("During cleaning");
        assert!(error.to_string().contains("During cleaning"));
        assert_eq!(error.error_code(), "DUPLICATE_COLUMN");
    }
}
