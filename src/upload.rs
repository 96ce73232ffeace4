//! One-shot upload of a written export to a webhook.

use crate::config::UploadConfig;
use crate::error::UploadError;
use reqwest::blocking::{multipart::Form, Client};
use std::path::Path;

/// Acknowledgement returned by a webhook that accepted the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// POSTs `path` to the configured URL as multipart form data.
pub fn upload_export(path: &Path, config: &UploadConfig) -> Result<UploadReceipt, UploadError> {
    let client = Client::builder().timeout(config.timeout).build()?;
    upload_with_client(&client, path, config)
}

/// Same as [`upload_export`] with a caller-supplied client.
pub fn upload_with_client(
    client: &Client,
    path: &Path,
    config: &UploadConfig,
) -> Result<UploadReceipt, UploadError> {
    let mut form = Form::new()
        .file("file", path)
        .map_err(|source| UploadError::Attach {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some(date) = config.date {
        form = form.text("date", date.format("%Y-%m-%d").to_string());
    }

    tracing::info!(url = %config.url, file = %path.display(), "uploading export");
    let response = client.post(&config.url).multipart(form).send()?;

    let status = response.status();
    let body = response.text().unwrap_or_default();
    if !status.is_success() {
        return Err(UploadError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    tracing::info!(status = status.as_u16(), "upload accepted");
    Ok(UploadReceipt {
        status: status.as_u16(),
        body,
    })
}
