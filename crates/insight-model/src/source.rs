use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

use crate::import::{read_csv_grid, CsvImportError, CsvOptions};
use crate::workbook::{WorkbookError, WorkbookReader};
use crate::SheetGrid;

/// Upper bound on how many workbook tabs are materialized by [`load_sheets`].
pub const DEFAULT_MAX_SHEETS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Workbook,
}

impl SourceFormat {
    /// Pick a reader from the file extension. Unknown extensions are handed to the
    /// workbook reader, which sniffs the container itself.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") | Some("txt") => SourceFormat::Csv,
            Some("tsv") | Some("tab") => SourceFormat::Tsv,
            _ => SourceFormat::Workbook,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Csv(#[from] CsvImportError),
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error("failed to open `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load the candidate sheets of a file.
///
/// Delimited text yields a single sheet named after the file stem; workbooks yield their
/// first `max_sheets` tabs in order. `csv` overrides the delimited-text defaults.
pub fn load_sheets(
    path: impl AsRef<Path>,
    csv: Option<&CsvOptions>,
    max_sheets: usize,
) -> Result<Vec<SheetGrid>, LoadError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path);
    match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let defaults = if format == SourceFormat::Tsv {
                CsvOptions::tsv()
            } else {
                CsvOptions::default()
            };
            let options = csv.unwrap_or(&defaults);
            let file = File::open(path).map_err(|source| LoadError::Open {
                path: path.display().to_string(),
                source,
            })?;
            let grid = read_csv_grid(BufReader::new(file), options)?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Sheet1")
                .to_string();
            Ok(vec![SheetGrid::new(name, grid)])
        }
        SourceFormat::Workbook => {
            let mut reader = WorkbookReader::open(path)?;
            Ok(reader.read_sheets(max_sheets))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/b.CSV")), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("b.tsv")), SourceFormat::Tsv);
        assert_eq!(SourceFormat::from_path(Path::new("b.xlsx")), SourceFormat::Workbook);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), SourceFormat::Workbook);
    }
}
