use crate::error::AccessError;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding volume in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Degenerate box around a single point.
    #[must_use]
    pub fn from_point(point: [f64; 3]) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn expand(&mut self, point: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    #[must_use]
    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }
}

/// Value carried by a property, normalized by the model loaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    /// The loader found the property but could not read its value.
    Unreadable(String),
}

impl PropertyValue {
    /// Display form of the value. `Ok(None)` when there is nothing to show.
    pub fn display(&self) -> Result<Option<String>, AccessError> {
        let text = match self {
            Self::Empty => return Ok(None),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(f) => f.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Boolean(b) => if *b { "Yes" } else { "No" }.to_string(),
            Self::Unreadable(message) => return Err(AccessError::Value(message.clone())),
        };
        Ok(Some(text).filter(|t| !t.is_empty()))
    }
}

/// A named property, possibly carrying nested child properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub value: PropertyValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Property>,
}

impl Property {
    #[must_use]
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            value,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Property>) -> Self {
        self.children = children;
        self
    }

    /// Name used in column keys: the display name when set, else the internal name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

/// A named group of properties (an IFC property set, a quantity set, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyCategory {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl PropertyCategory {
    #[must_use]
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

/// A node of the model tree.
///
/// The `*_fault` fields record accessor failures detected by the loader so
/// they surface through [`super::ElementSource`] the same way a failing host
/// accessor would.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub stable_id: Option<String>,
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub categories: Vec<PropertyCategory>,
    #[serde(default)]
    pub children: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_fault: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_fault: Option<String>,
}

impl Element {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
