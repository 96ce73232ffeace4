use super::{BoundingBox, Element, PropertyCategory};
use crate::error::AccessError;

/// Read-only view of one node of a model tree.
///
/// This is the only capability the flattener and the extractor need from a
/// model. Accessors that can fail in a host application return `Result`, and
/// every caller degrades gracefully instead of aborting the export.
pub trait ElementSource {
    /// Display name of the node, if it has one.
    fn display_name(&self) -> Option<&str>;

    /// Class or category display name (for IFC, the entity class).
    fn class_name(&self) -> Option<&str>;

    /// Intrinsic stable identifier. Hosts frequently report the all-zero GUID.
    fn stable_id(&self) -> Option<&str>;

    /// Axis-aligned bounding volume in model coordinates.
    fn bounding_box(&self) -> Result<BoundingBox, AccessError>;

    /// Ordered children.
    fn children(&self) -> Result<&[Self], AccessError>
    where
        Self: Sized;

    /// Property categories in host order.
    fn categories(&self) -> Result<&[PropertyCategory], AccessError>;
}

impl ElementSource for Element {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn stable_id(&self) -> Option<&str> {
        self.stable_id.as_deref()
    }

    fn bounding_box(&self) -> Result<BoundingBox, AccessError> {
        self.bounds
            .ok_or_else(|| AccessError::Geometry("element has no placement".to_string()))
    }

    fn children(&self) -> Result<&[Self], AccessError> {
        match &self.children_fault {
            Some(message) => Err(AccessError::Children(message.clone())),
            None => Ok(&self.children),
        }
    }

    fn categories(&self) -> Result<&[PropertyCategory], AccessError> {
        match &self.properties_fault {
            Some(message) => Err(AccessError::Properties(message.clone())),
            None => Ok(&self.categories),
        }
    }
}
