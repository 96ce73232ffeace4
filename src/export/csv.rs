use super::table::Table;
use crate::error::ExportError;
use std::path::Path;

pub fn export_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let content = render_csv(table)?;
    std::fs::write(path_ref, content).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })
}

pub fn render_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&table.header)?;
    for cells in &table.rows {
        writer.write_record(cells.iter().map(ToString::to_string))?;
    }

    writer.into_inner().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_cells_are_empty_fields() {
        let table = Table {
            header: vec!["Element Name".into(), "Item.Name".into(), "Q.Area".into()],
            rows: vec![
                vec![CellValue::from("Wall, north"), CellValue::from("W1"), CellValue::Number(12.5)],
                vec![CellValue::from("Slab"), CellValue::Blank, CellValue::Blank],
            ],
        };

        let text = String::from_utf8(render_csv(&table).unwrap()).unwrap();
        assert_eq!(
            text,
            "Element Name,Item.Name,Q.Area\n\"Wall, north\",W1,12.5\nSlab,,\n"
        );
    }
}
