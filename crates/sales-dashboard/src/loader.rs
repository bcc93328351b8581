//! Dataset loading from a fixed path or an uploaded byte stream.
//!
//! Both variants funnel into the same parser, which tries several CSV
//! strategies before giving up.

use crate::error::{DashboardError, Result, ResultExt};
use crate::types::DataSource;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// An uploaded file: its original name and raw contents.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A freshly loaded table together with where it came from.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: DataSource,
    pub df: DataFrame,
}

/// Loads raw CSV data into a `DataFrame`.
#[derive(Debug, Clone, Copy)]
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self {
            infer_schema_length: 100,
        }
    }
}

impl DataLoader {
    pub fn new(infer_schema_length: usize) -> Self {
        Self {
            infer_schema_length,
        }
    }

    /// Load a CSV from a fixed filesystem path.
    ///
    /// An unreadable path is a hard failure; there is no fallback source.
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<RawTable> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());
        let bytes = std::fs::read(path)
            .map_err(DashboardError::from)
            .context(format!("Failed to read {}", path.display()))?;
        let df = self.parse_with_fallbacks(bytes)?;
        info!("Dataset loaded successfully: {:?}", df.shape());

        Ok(RawTable {
            source: DataSource::Path(path.display().to_string()),
            df,
        })
    }

    /// Load a CSV from an uploaded byte stream.
    pub fn from_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<RawTable> {
        ensure_csv_extension(name)?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(DashboardError::NoDataLoaded);
        }

        info!("Loading uploaded dataset: {} ({} bytes)", name, bytes.len());
        let df = self.parse_with_fallbacks(bytes)?;
        info!("Dataset loaded successfully: {:?}", df.shape());

        Ok(RawTable {
            source: DataSource::Upload(name.to_string()),
            df,
        })
    }

    /// Load from an optional upload, halting with a prompt if none was given.
    pub fn from_upload(&self, upload: Option<Upload>) -> Result<RawTable> {
        match upload {
            Some(upload) => self.from_bytes(&upload.name, upload.bytes),
            None => {
                debug!("No upload provided; waiting for a CSV file");
                Err(DashboardError::NoDataLoaded)
            }
        }
    }

    /// Parse CSV bytes with multiple fallback strategies.
    fn parse_with_fallbacks(&self, bytes: Vec<u8>) -> Result<DataFrame> {
        // Strategy 1: Standard loading with quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .into_reader_with_file_handle(Cursor::new(bytes.clone()))
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Standard loading failed: {}", e);
            }
        }

        // Strategy 2: Without quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(None))
            .into_reader_with_file_handle(Cursor::new(bytes.clone()))
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Loading without quotes failed: {}", e);
            }
        }

        // Strategy 3: Pre-clean content
        debug!("Collapsing doubled quotes and blank lines; quoted field contents may change");
        let cleaned = clean_csv_content(&String::from_utf8_lossy(&bytes));
        CsvReadOptions::default()
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(cleaned))
            .finish()
            .map_err(|e| DashboardError::LoadFailed(e.to_string()))
    }
}

/// Reject anything but `.csv` uploads.
fn ensure_csv_extension(name: &str) -> Result<()> {
    let is_csv = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        Ok(())
    } else {
        Err(DashboardError::UnsupportedFileType(name.to_string()))
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Sales,Profit,Region\n10,5,East\n20,0,West\n";

    #[test]
    fn test_from_bytes_loads_csv() {
        let table = DataLoader::default()
            .from_bytes("orders.csv", SAMPLE.as_bytes().to_vec())
            .unwrap();

        assert_eq!(table.df.shape(), (2, 3));
        assert_eq!(table.source, DataSource::Upload("orders.csv".to_string()));
    }

    #[test]
    fn test_from_upload_none_prompts() {
        let err = DataLoader::default().from_upload(None).unwrap_err();
        assert!(err.is_prompt());
        assert_eq!(err.error_code(), "NO_DATA_LOADED");
    }

    #[test]
    fn test_from_upload_empty_payload_prompts() {
        let upload = Upload::new("orders.csv", Vec::new());
        let err = DataLoader::default().from_upload(Some(upload)).unwrap_err();
        assert!(err.is_prompt());
    }

    #[test]
    fn test_rejects_non_csv_upload() {
        let upload = Upload::new("orders.xlsx", SAMPLE.as_bytes().to_vec());
        let err = DataLoader::default().from_upload(Some(upload)).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FILE_TYPE");
    }

    #[test]
    fn test_accepts_uppercase_extension() {
        assert!(ensure_csv_extension("ORDERS.CSV").is_ok());
        assert!(ensure_csv_extension("orders").is_err());
    }

    #[test]
    fn test_from_path_missing_file_fails_hard() {
        let err = DataLoader::default()
            .from_path("/definitely/not/here/sales.csv")
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_clean_csv_content() {
        let raw = "a,b\n\n\"\"x\"\",1\n   \n";
        assert_eq!(clean_csv_content(raw), "a,b\n\"x\",1");
    }

    #[test]
    fn test_clean_csv_content_rewrites_escaped_quotes() {
        // Last-resort cleanup changes quoted field contents
        assert_eq!(clean_csv_content("a\n\"say \"\"hi\"\"\"\n"), "a\n\"say \"hi\"");
    }
}
