//! Export configuration.

use crate::error::ExportError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File written when no output path is given.
pub const DEFAULT_OUTPUT: &str = "ElementProperties.xlsx";

/// Elements processed between two progress reports.
pub const PROGRESS_INTERVAL: usize = 100;

/// Default timeout for the upload request.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    /// Picks the format from the output file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnsupportedOutput { extension }),
        }
    }
}

/// Where and how an export is written.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub progress_interval: usize,
    pub upload: Option<UploadConfig>,
}

impl ExportConfig {
    pub fn new(output: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let output = output.into();
        let format = OutputFormat::from_path(&output)?;
        Ok(Self {
            output,
            format,
            progress_interval: PROGRESS_INTERVAL,
            upload: None,
        })
    }

    #[must_use]
    pub fn with_upload(mut self, upload: Option<UploadConfig>) -> Self {
        self.upload = upload;
        self
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::Xlsx,
            progress_interval: PROGRESS_INTERVAL,
            upload: None,
        }
    }
}

/// Webhook receiving the exported file.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub url: String,
    /// Sent as the `date` form field in `YYYY-MM-DD` form.
    pub date: Option<NaiveDate>,
    pub timeout: Duration,
}

impl UploadConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            date: None,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/Report.XLSX")).unwrap(),
            OutputFormat::Xlsx
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("report.csv")).unwrap(),
            OutputFormat::Csv
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("report.txt")),
            Err(ExportError::UnsupportedOutput { .. })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.format, OutputFormat::Xlsx);
        assert_eq!(config.progress_interval, 100);
        assert!(config.upload.is_none());
    }
}
