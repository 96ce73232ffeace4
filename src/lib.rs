//! # BIM Tabulator
//!
//! Flattens the element tree of a BIM model into a single spreadsheet: one
//! row per element, six fixed leading columns and one column per property
//! path seen anywhere in the selection.
//!
//! ## Features
//!
//! - Load IFC (STEP) files or JSON element trees
//! - Pre-order flattening of one or more selected subtrees
//! - Property paths unified into one sorted column schema, with `" (n)"`
//!   suffixes for colliding keys
//! - XLSX, CSV and JSON output
//! - Optional multipart upload of the written file
//! - Terminal tree browser with a live row preview
//!
//! ## Example
//!
//! ```no_run
//! use bim_tabulator::config::ExportConfig;
//! use bim_tabulator::export::{export_model, LogProgress};
//! use bim_tabulator::parser::load_model;
//!
//! let model = load_model("model.ifc").expect("Failed to load");
//! let config = ExportConfig::default();
//! let summary = export_model(&model, &[], &config, &mut LogProgress).expect("Export failed");
//! println!("{} rows, {} columns", summary.elements, summary.columns);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod flatten;
pub mod model;
pub mod parser;
pub mod ui;
pub mod upload;
