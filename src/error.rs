//! Error types for BIM Tabulator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading a model file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the model file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },

    /// The JSON model document could not be decoded.
    #[error("invalid JSON model: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },

    /// The file extension does not name a known model format.
    #[error("unsupported model format '{extension}' (expected .ifc or .json)")]
    UnsupportedFormat { extension: String },
}

/// A failing accessor on an element.
///
/// Raised by [`crate::model::ElementSource`] implementations when the
/// underlying data for one node cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The node's child list could not be produced.
    #[error("children unavailable: {0}")]
    Children(String),

    /// The node's property categories could not be produced.
    #[error("properties unavailable: {0}")]
    Properties(String),

    /// A single property value could not be read.
    #[error("property value unreadable: {0}")]
    Value(String),

    /// The bounding volume could not be computed.
    #[error("bounding box unavailable: {0}")]
    Geometry(String),
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The model has no elements to export.
    #[error("the model contains no elements")]
    EmptyModel,

    /// The selection resolved to no root elements.
    #[error("no elements selected for export")]
    EmptySelection,

    /// A selection pattern matched nothing in the model.
    #[error("no element matches selection '{pattern}'")]
    UnmatchedSelection { pattern: String },

    /// The output file extension does not name a known format.
    #[error("unsupported output format '{extension}' (expected .xlsx, .csv or .json)")]
    UnsupportedOutput { extension: String },

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove the output of a previous export.
    #[error("failed to remove previous export '{path}': {source}")]
    FileRemove {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },

    /// Failed to build the spreadsheet.
    #[error("spreadsheet write failed: {source}")]
    XlsxWrite {
        #[from]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Errors that can occur when uploading an exported file.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The exported file could not be attached to the form.
    #[error("failed to attach '{path}': {source}")]
    Attach {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The request could not be sent.
    #[error("upload request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
