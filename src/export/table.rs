use crate::extract::{CellValue, ExtractedRow, FrozenSchema};
use serde::Serialize;

/// Rectangular output: one header row and one row per element, every row
/// exactly as wide as the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Empty table carrying only the header.
    #[must_use]
    pub fn with_header(schema: &FrozenSchema) -> Self {
        Self {
            header: schema.header().map(str::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends one row laid out against the header. Columns the row has no
    /// entry for are left blank.
    pub fn push(&mut self, row: &ExtractedRow) {
        let cells = Self::layout(&self.header, row);
        self.rows.push(cells);
    }

    fn layout(header: &[String], row: &ExtractedRow) -> Vec<CellValue> {
        header
            .iter()
            .map(|column| row.get(column).cloned().unwrap_or(CellValue::Blank))
            .collect()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.header.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `column` in the header.
    #[must_use]
    pub fn column(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ColumnSchema, PropertyExtractor, FIXED_COLUMNS};
    use crate::flatten::flatten;
    use crate::model::{Element, Property, PropertyCategory, PropertyValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_roots_one_child() {
        let mut wall = Element::named("Wall-01");
        wall.categories.push(PropertyCategory::new(
            "Item",
            vec![Property::new("Name", PropertyValue::Text("Wall-01".into()))],
        ));
        let mut storey = Element::named("Level 1");
        storey.children.push(Element::named("Slab"));
        let roots = vec![wall, storey];

        let mut extractor = PropertyExtractor::new();
        let rows: Vec<_> = flatten(&roots).map(|e| extractor.extract(e)).collect();
        let mut table = Table::with_header(&extractor.into_schema().freeze());
        for row in &rows {
            table.push(row);
        }

        let mut expected_header: Vec<String> =
            FIXED_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        expected_header.push("Item.Name".to_string());
        assert_eq!(table.header, expected_header);
        assert_eq!(table.len(), 3);

        let name = table.column("Item.Name").unwrap();
        assert_eq!(table.rows[0][name], CellValue::from("Wall-01"));
        assert_eq!(table.rows[1][name], CellValue::Blank);
        assert_eq!(table.rows[2][name], CellValue::Blank);
        assert!(table.rows.iter().all(|r| r.len() == table.width()));
    }

    #[test]
    fn test_dynamic_columns_sorted_ordinally() {
        let mut schema = ColumnSchema::new();
        for column in ["Z.Last", "A.First", "A.First (2)"] {
            schema.register(column);
        }
        let table = Table::with_header(&schema.freeze());

        assert_eq!(&table.header[6..], ["A.First", "A.First (2)", "Z.Last"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_push_fills_missing_cells_blank() {
        let mut schema = ColumnSchema::new();
        schema.register("A.B");
        let mut table = Table::with_header(&schema.freeze());

        table.push(&ExtractedRow::new());
        assert_eq!(table.rows[0], vec![CellValue::Blank; 7]);
    }
}
