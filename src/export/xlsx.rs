use super::table::Table;
use crate::error::ExportError;
use crate::extract::CellValue;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

pub const SHEET_NAME: &str = "Elements";

/// Longest text a worksheet cell accepts, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

pub fn export_xlsx<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let content = render_xlsx(table)?;
    std::fs::write(path_ref, content).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })
}

/// Builds the workbook in memory: a bold, frozen header row followed by one
/// row per element. Blank cells are left unwritten.
pub fn render_xlsx(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, column) in table.header.iter().enumerate() {
        let col = column_index(col)?;
        worksheet.write_string_with_format(0, col, fit_cell(column, 0, col), &header_format)?;
    }

    for (index, cells) in table.rows.iter().enumerate() {
        let row = row_index(index + 1)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = column_index(col)?;
            match cell {
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, fit_cell(text, row, col))?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, col, *number)?;
                }
                CellValue::Blank => {}
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Cuts text past the cell limit so one oversized value cannot fail the
/// whole workbook.
fn fit_cell(text: &str, row: u32, col: u16) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            tracing::warn!(
                row,
                col,
                chars = text.chars().count(),
                "text exceeds the cell limit, truncating"
            );
            &text[..end]
        }
        None => text,
    }
}

fn column_index(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::WriteError {
        message: format!("column {col} exceeds the worksheet width"),
    })
}

fn row_index(row: usize) -> Result<u32, ExportError> {
    u32::try_from(row).map_err(|_| ExportError::WriteError {
        message: format!("row {row} exceeds the worksheet height"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_zip_container() {
        let table = Table {
            header: vec!["Element Name".into(), "Pset.Width".into()],
            rows: vec![
                vec![CellValue::from("Wall"), CellValue::Number(0.2)],
                vec![CellValue::from("Slab"), CellValue::Blank],
            ],
        };

        let bytes = render_xlsx(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_fit_cell_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let fitted = fit_cell(&long, 1, 0);
        assert_eq!(fitted.chars().count(), MAX_CELL_CHARS);

        let short = "Wall-01";
        assert_eq!(fit_cell(short, 1, 0), "Wall-01");
    }

    #[test]
    fn test_oversized_text_still_renders() {
        let table = Table {
            header: vec!["Element Name".into(), "Pset.Notes".into()],
            rows: vec![vec![CellValue::from("Wall"), CellValue::from("x".repeat(40_000))]],
        };

        assert!(render_xlsx(&table).is_ok());
    }

    #[test]
    fn test_too_many_columns_is_rejected() {
        let header = (0..20_000).map(|i| format!("C{i:05}")).collect();
        let table = Table {
            header,
            rows: Vec::new(),
        };

        assert!(render_xlsx(&table).is_err());
    }
}
