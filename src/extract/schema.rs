use super::row::FIXED_COLUMNS;
use std::collections::BTreeSet;

/// Dynamic column names discovered during the scan pass.
///
/// `BTreeSet<String>` orders by byte value, which for UTF-8 is code point
/// order, so freezing needs no extra sort.
#[derive(Debug, Default, Clone)]
pub struct ColumnSchema {
    columns: BTreeSet<String>,
}

impl ColumnSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dynamic column. Fixed column names are ignored.
    pub fn register(&mut self, column: &str) {
        if FIXED_COLUMNS.contains(&column) {
            return;
        }
        if !self.columns.contains(column) {
            self.columns.insert(column.to_string());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Ends discovery. The returned schema cannot be extended.
    #[must_use]
    pub fn freeze(self) -> FrozenSchema {
        FrozenSchema {
            dynamic: self.columns.into_iter().collect(),
        }
    }
}

/// Column layout of the output table, fixed before any row is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenSchema {
    dynamic: Vec<String>,
}

impl FrozenSchema {
    /// Dynamic columns sorted by ordinal comparison.
    #[must_use]
    pub fn dynamic_columns(&self) -> &[String] {
        &self.dynamic
    }

    /// Full header: fixed columns then dynamic columns.
    pub fn header(&self) -> impl Iterator<Item = &str> {
        FIXED_COLUMNS
            .iter()
            .copied()
            .chain(self.dynamic.iter().map(String::as_str))
    }

    #[must_use]
    pub fn width(&self) -> usize {
        FIXED_COLUMNS.len() + self.dynamic.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_freeze_sorts_ordinally() {
        let mut schema = ColumnSchema::new();
        for column in ["Z.Last", "A.First", "A.First (2)", "a.lower", "B.Second"] {
            schema.register(column);
        }

        let frozen = schema.freeze();
        assert_eq!(
            frozen.dynamic_columns(),
            ["A.First", "A.First (2)", "B.Second", "Z.Last", "a.lower"]
        );
    }

    #[test]
    fn test_register_deduplicates_and_skips_fixed() {
        let mut schema = ColumnSchema::new();
        schema.register("Item.Name");
        schema.register("Item.Name");
        schema.register("GUID");

        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_header_starts_with_fixed_columns() {
        let mut schema = ColumnSchema::new();
        schema.register("Item.Name");
        let frozen = schema.freeze();

        let header: Vec<&str> = frozen.header().collect();
        assert_eq!(
            header,
            vec![
                "Element Name",
                "Category/Class",
                "GUID",
                "X Coordinate",
                "Y Coordinate",
                "Z Coordinate",
                "Item.Name",
            ]
        );
        assert_eq!(frozen.width(), 7);
    }
}
