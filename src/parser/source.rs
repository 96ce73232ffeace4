use crate::error::ParseError;
use crate::model::Model;
use std::path::{Path, PathBuf};

/// Where a model comes from, decided once from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// STEP physical file (`.ifc`).
    Ifc(PathBuf),
    /// Serialized [`Model`] (`.json`).
    Json(PathBuf),
}

impl ModelSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "ifc" => Ok(Self::Ifc(path.to_path_buf())),
            "json" => Ok(Self::Json(path.to_path_buf())),
            _ => Err(ParseError::UnsupportedFormat { extension }),
        }
    }

    pub fn load(&self) -> Result<Model, ParseError> {
        match self {
            Self::Ifc(path) => super::load_ifc_model(path),
            Self::Json(path) => super::load_json_model(path),
        }
    }
}

/// Loads a model, picking the loader from the file extension.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model, ParseError> {
    ModelSource::from_path(path)?.load()
}
