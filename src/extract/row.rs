use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const ELEMENT_NAME: &str = "Element Name";
pub const CATEGORY_CLASS: &str = "Category/Class";
pub const GUID: &str = "GUID";
pub const X_COORDINATE: &str = "X Coordinate";
pub const Y_COORDINATE: &str = "Y Coordinate";
pub const Z_COORDINATE: &str = "Z Coordinate";

/// Leading columns present on every row, in output order.
pub const FIXED_COLUMNS: [&str; 6] = [
    ELEMENT_NAME,
    CATEGORY_CLASS,
    GUID,
    X_COORDINATE,
    Y_COORDINATE,
    Z_COORDINATE,
];

/// Column holding the message of an element whose extraction failed.
pub const ERROR_COLUMN: &str = "Error";

pub const UNKNOWN: &str = "Unknown";
pub const NO_GUID: &str = "No GUID Available";
pub const GUID_ERROR: &str = "Error Reading GUID";

/// One output cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Explicitly empty. Serialized as `null`.
    Blank,
}

impl CellValue {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Blank => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Column name to value mapping built for one element.
pub type ExtractedRow = HashMap<String, CellValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_blank_is_empty() {
        assert_eq!(CellValue::Blank.to_string(), "");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::from("Wall").to_string(), "Wall");
    }
}
