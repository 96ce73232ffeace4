//! Per-element property extraction and column schema discovery.
//!
//! [`PropertyExtractor`] turns one element into an [`ExtractedRow`] and
//! records every column it produces in a [`ColumnSchema`]. Running it over
//! the whole traversal sequence is the scan pass; the frozen schema then
//! drives the write pass.

pub mod guid;
pub mod keys;
pub mod row;
pub mod schema;

pub use guid::{is_nil_identifier, resolve_guid};
pub use keys::unique_key;
pub use row::{CellValue, ExtractedRow, ERROR_COLUMN, FIXED_COLUMNS};
pub use schema::{ColumnSchema, FrozenSchema};

use crate::error::AccessError;
use crate::model::{ElementSource, Property, PropertyValue};
use keys::join_key;
use row::{CATEGORY_CLASS, ELEMENT_NAME, GUID, UNKNOWN, X_COORDINATE, Y_COORDINATE, Z_COORDINATE};

#[derive(Debug, Default)]
pub struct PropertyExtractor {
    schema: ColumnSchema,
}

impl PropertyExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    #[must_use]
    pub fn into_schema(self) -> ColumnSchema {
        self.schema
    }

    /// Builds the row for `element`, registering its columns in the schema.
    ///
    /// Never fails: unreadable properties are skipped, a failed geometry
    /// query blanks the coordinates, and a failure reading the element's
    /// categories collapses the dynamic part to a single `Error` entry.
    pub fn extract<E: ElementSource>(&mut self, element: &E) -> ExtractedRow {
        let label = element.display_name().unwrap_or(UNKNOWN);
        let _span = tracing::debug_span!("extract", element = label).entered();

        let mut row = ExtractedRow::new();
        fill_fixed_columns(element, &mut row);

        if let Err(err) = self.extract_properties(element, &mut row) {
            tracing::warn!(element = label, error = %err, "element extraction failed");
            row.retain(|column, _| FIXED_COLUMNS.contains(&column.as_str()));
            row.insert(ERROR_COLUMN.to_string(), CellValue::Text(err.to_string()));
            self.schema.register(ERROR_COLUMN);
        }

        row
    }

    fn extract_properties<E: ElementSource>(
        &mut self,
        element: &E,
        row: &mut ExtractedRow,
    ) -> Result<(), AccessError> {
        for category in element.categories()? {
            let mut stack: Vec<(String, &Property)> = category
                .properties
                .iter()
                .rev()
                .map(|p| (join_key(&category.name, p.label()), p))
                .collect();

            while let Some((key, property)) = stack.pop() {
                stack.extend(
                    property
                        .children
                        .iter()
                        .rev()
                        .map(|child| (join_key(&key, child.label()), child)),
                );

                match property.value.display() {
                    Ok(Some(text)) => {
                        let column = unique_key(&key, row);
                        self.schema.register(&column);
                        row.insert(column, cell_value(&property.value, text));
                    }
                    Ok(None) => self.schema.register(&key),
                    Err(err) => {
                        tracing::debug!(property = %key, error = %err, "skipping property");
                    }
                }
            }
        }
        Ok(())
    }
}

fn fill_fixed_columns<E: ElementSource>(element: &E, row: &mut ExtractedRow) {
    let class = element.class_name().filter(|s| !s.trim().is_empty());
    let name = element
        .display_name()
        .filter(|s| !s.trim().is_empty())
        .or(class)
        .unwrap_or(UNKNOWN);

    row.insert(ELEMENT_NAME.to_string(), name.into());
    row.insert(CATEGORY_CLASS.to_string(), class.unwrap_or(UNKNOWN).into());
    row.insert(GUID.to_string(), resolve_guid(element).into());

    let coordinates = match element.bounding_box() {
        Ok(bounds) => bounds.center().map(CellValue::Number),
        Err(err) => {
            tracing::debug!(error = %err, "no bounding box, blanking coordinates");
            [CellValue::Blank, CellValue::Blank, CellValue::Blank]
        }
    };
    for (column, value) in [X_COORDINATE, Y_COORDINATE, Z_COORDINATE]
        .into_iter()
        .zip(coordinates)
    {
        row.insert(column.to_string(), value);
    }
}

fn cell_value(value: &PropertyValue, text: String) -> CellValue {
    match value {
        PropertyValue::Number(n) => CellValue::Number(*n),
        PropertyValue::Integer(i) => CellValue::Number(*i as f64),
        _ => CellValue::Text(text),
    }
}
