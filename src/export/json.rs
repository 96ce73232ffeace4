use super::table::Table;
use crate::error::ExportError;
use crate::extract::CellValue;
use serde_json::{Map, Value};
use std::path::Path;

pub fn export_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let json = render_json(table)?;
    std::fs::write(path_ref, json).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })
}

/// An array of objects, one per row, keys in header order. Blank cells are
/// `null`.
pub fn render_json(table: &Table) -> Result<String, ExportError> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|cells| {
            let record: Map<String, Value> = table
                .header
                .iter()
                .zip(cells)
                .map(|(column, cell)| (column.clone(), cell_json(cell)))
                .collect();
            Value::Object(record)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}

fn cell_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Text(text) => Value::String(text.clone()),
        CellValue::Number(number) => serde_json::Number::from_f64(*number)
            .map_or(Value::Null, Value::Number),
        CellValue::Blank => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_follow_header() {
        let table = Table {
            header: vec!["Element Name".into(), "Q.Area".into(), "Item.Name".into()],
            rows: vec![vec![
                CellValue::from("Wall"),
                CellValue::Number(3.5),
                CellValue::Blank,
            ]],
        };

        let value: Value = serde_json::from_str(&render_json(&table).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "Element Name": "Wall", "Q.Area": 3.5, "Item.Name": null }])
        );
    }
}
