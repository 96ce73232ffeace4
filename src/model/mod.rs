pub mod element;
pub mod project;
pub mod source;

pub use element::{BoundingBox, Element, Property, PropertyCategory, PropertyValue};
pub use project::Model;
pub use source::ElementSource;
