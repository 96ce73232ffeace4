pub mod geometry;
pub mod global_id;
pub mod ifc;
pub mod json;
pub mod source;
pub mod step;

pub use crate::error::ParseError;
pub use ifc::load_ifc_model;
pub use json::load_json_model;
pub use source::{load_model, ModelSource};
pub use step::{StepEntity, StepFile, StepValue};
