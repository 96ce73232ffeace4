//! Two-pass export of a model selection into a single table.
//!
//! The scan pass extracts every element of the traversal sequence and grows
//! the column schema. Only once it has consumed the whole sequence is the
//! schema frozen, and the write pass lays the same rows out against it.

pub mod csv;
pub mod json;
pub mod progress;
pub mod table;
pub mod xlsx;

pub use crate::error::ExportError;
pub use csv::export_csv;
pub use json::export_json;
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use table::Table;
pub use xlsx::export_xlsx;

use crate::config::{ExportConfig, OutputFormat};
use crate::extract::{PropertyExtractor, ERROR_COLUMN};
use crate::flatten::flatten;
use crate::model::{ElementSource, Model};
use progress::report_every;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SCANNING_STATUS: &str = "Scanning properties";
pub const WRITING_STATUS: &str = "Writing rows";

/// Outcome of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Data rows written.
    pub elements: usize,
    /// Header width, fixed columns included.
    pub columns: usize,
    /// Rows whose extraction failed and carry an `Error` cell.
    pub error_rows: usize,
}

/// Runs both passes over an already flattened sequence.
pub fn tabulate<E: ElementSource>(
    elements: &[&E],
    interval: usize,
    progress: &mut dyn ProgressSink,
) -> Table {
    let total = elements.len();
    let mut extractor = PropertyExtractor::new();
    let mut rows = Vec::with_capacity(total);

    for (index, element) in elements.iter().enumerate() {
        rows.push(extractor.extract(*element));
        report_every(progress, interval, index + 1, total, SCANNING_STATUS);
    }

    let schema = extractor.into_schema().freeze();
    tracing::debug!(
        columns = schema.width(),
        dynamic = schema.dynamic_columns().len(),
        "column schema frozen"
    );

    let mut table = Table::with_header(&schema);
    for (index, row) in rows.iter().enumerate() {
        table.push(row);
        report_every(progress, interval, index + 1, total, WRITING_STATUS);
    }
    table
}

/// Exports the subtrees under `roots` to `config.output`.
///
/// Any file already at the output path is removed first, so a failed export
/// never leaves a stale table behind.
pub fn export_elements<'a, E, I>(
    roots: I,
    config: &ExportConfig,
    progress: &mut dyn ProgressSink,
) -> Result<ExportSummary, ExportError>
where
    E: ElementSource + 'a,
    I: IntoIterator<Item = &'a E>,
{
    remove_previous(&config.output)?;

    let elements: Vec<&E> = flatten(roots).collect();
    if elements.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    tracing::info!(elements = elements.len(), output = %config.output.display(), "exporting");

    let table = tabulate(&elements, config.progress_interval, progress);
    write_table(&table, config.format, &config.output)?;

    let error_rows = table.column(ERROR_COLUMN).map_or(0, |col| {
        table.rows.iter().filter(|row| !row[col].is_blank()).count()
    });
    let summary = ExportSummary {
        path: config.output.clone(),
        elements: table.len(),
        columns: table.width(),
        error_rows,
    };
    tracing::info!(
        elements = summary.elements,
        columns = summary.columns,
        error_rows = summary.error_rows,
        "export written"
    );
    Ok(summary)
}

/// Exports the model elements matched by `patterns`, or the whole model when
/// no pattern is given.
pub fn export_model(
    model: &Model,
    patterns: &[String],
    config: &ExportConfig,
    progress: &mut dyn ProgressSink,
) -> Result<ExportSummary, ExportError> {
    if model.roots.is_empty() {
        return Err(ExportError::EmptyModel);
    }
    let roots = model.select(patterns)?;
    export_elements(roots, config, progress)
}

pub fn write_table(table: &Table, format: OutputFormat, path: &Path) -> Result<(), ExportError> {
    match format {
        OutputFormat::Xlsx => export_xlsx(table, path),
        OutputFormat::Csv => export_csv(table, path),
        OutputFormat::Json => export_json(table, path),
    }
}

fn remove_previous(path: &Path) -> Result<(), ExportError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed previous export");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ExportError::FileRemove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::CellValue;
    use crate::model::{Element, Property, PropertyCategory, PropertyValue};
    use pretty_assertions::assert_eq;

    fn elements(count: usize) -> Vec<Element> {
        (0..count)
            .map(|i| {
                let mut e = Element::named(format!("E{i}"));
                e.categories.push(PropertyCategory::new(
                    "Pset",
                    vec![Property::new("Index", PropertyValue::Integer(i as i64))],
                ));
                e
            })
            .collect()
    }

    #[test]
    fn test_progress_reports_both_passes() {
        let roots = elements(250);
        let refs: Vec<&Element> = roots.iter().collect();
        let mut seen = Vec::new();
        {
            let mut sink = |current: usize, total: usize, status: &str| {
                seen.push((current, total, status.to_string()));
            };
            tabulate(&refs, 100, &mut sink);
        }

        let scanning: Vec<usize> = seen
            .iter()
            .filter(|(_, _, s)| s == SCANNING_STATUS)
            .map(|(c, _, _)| *c)
            .collect();
        assert_eq!(scanning, vec![100, 200, 250]);
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().all(|(_, total, _)| *total == 250));
    }

    #[test]
    fn test_schema_covers_late_columns() {
        // A column first seen on the last element still reaches the first row.
        let mut roots = elements(3);
        roots[2].categories.push(PropertyCategory::new(
            "Late",
            vec![Property::new("Flag", PropertyValue::Boolean(true))],
        ));
        let refs: Vec<&Element> = roots.iter().collect();

        let table = tabulate(&refs, 100, &mut NoProgress);
        let late = table.column("Late.Flag").unwrap();
        assert_eq!(table.rows[0][late], CellValue::Blank);
        assert_eq!(table.rows[2][late], CellValue::from("Yes"));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path().join("out.csv")).unwrap();
        let roots: Vec<Element> = Vec::new();

        let result = export_elements(&roots, &config, &mut NoProgress);
        assert!(matches!(result, Err(ExportError::EmptySelection)));
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let config = ExportConfig::default();
        let result = export_model(&Model::default(), &[], &config, &mut NoProgress);
        assert!(matches!(result, Err(ExportError::EmptyModel)));
    }

    #[test]
    fn test_previous_output_removed_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();
        let config = ExportConfig::new(&path).unwrap();
        let roots: Vec<Element> = Vec::new();

        assert!(export_elements(&roots, &config, &mut NoProgress).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_summary_counts_error_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path().join("out.json")).unwrap();
        let mut roots = elements(2);
        roots[1].properties_fault = Some("host threw".to_string());

        let summary = export_elements(&roots, &config, &mut NoProgress).unwrap();
        assert_eq!(summary.elements, 2);
        assert_eq!(summary.error_rows, 1);
        // Six fixed columns, Error and Pset.Index.
        assert_eq!(summary.columns, 8);
        assert!(summary.path.exists());
    }
}
