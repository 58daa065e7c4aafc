//! Workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) ingestion into per-sheet raw grids.
//!
//! Cells are typed here, once: numeric cells become [`CellValue::Number`], date-formatted
//! cells become [`CellValue::Date`], and everything else keeps its text.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::Timelike;
use thiserror::Error;

use crate::{CellValue, Grid, SheetGrid};

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to read workbook: {0}")]
    Read(#[from] calamine::Error),
    #[error("sheet `{0}` not found")]
    SheetNotFound(String),
}

/// An open workbook whose sheets can be materialized as [`Grid`]s on demand.
pub struct WorkbookReader {
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let workbook = open_workbook_auto(path)?;
        Ok(Self { workbook })
    }

    /// Sheet names in workbook tab order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_owned()
    }

    pub fn read_sheet(&mut self, name: &str) -> Result<Grid, WorkbookError> {
        if !self.sheet_names().iter().any(|s| s == name) {
            return Err(WorkbookError::SheetNotFound(name.to_string()));
        }
        let range = self.workbook.worksheet_range(name)?;
        Ok(range_to_grid(&range))
    }

    /// Read the first `limit` sheets in tab order.
    ///
    /// Sheets that fail to decode are skipped with a warning; one corrupt tab should not hide
    /// the rest of the workbook.
    pub fn read_sheets(&mut self, limit: usize) -> Vec<SheetGrid> {
        let mut out = Vec::new();
        for name in self.sheet_names().into_iter().take(limit) {
            match self.workbook.worksheet_range(&name) {
                Ok(range) => out.push(SheetGrid::new(name, range_to_grid(&range))),
                Err(err) => log::warn!("skipping sheet `{name}`: {err}"),
            }
        }
        out
    }
}

/// Convert a calamine range into a grid anchored at `A1`.
///
/// calamine ranges start at the first used cell; leading blank rows/columns are restored
/// so row indices match what a user sees in the sheet.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::new();
    };

    let mut grid = Grid::new();
    for _ in 0..start_row {
        grid.push_row(Vec::new());
    }
    for row in range.rows() {
        let mut cells = Vec::with_capacity(start_col as usize + row.len());
        cells.resize(start_col as usize, CellValue::Empty);
        cells.extend(row.iter().map(convert_value));
        grid.push_row(cells);
    }
    grid
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Boolean(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::String(v.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
        Data::DateTime(v) => {
            if v.is_duration() {
                return CellValue::Number(v.as_f64());
            }
            match v.as_datetime() {
                Some(dt) if dt.num_seconds_from_midnight() == 0 => {
                    CellValue::Date(dt.format("%Y-%m-%d").to_string())
                }
                Some(dt) => CellValue::Date(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
                None => CellValue::Number(v.as_f64()),
            }
        }
        Data::DateTimeIso(v) => CellValue::Date(v.clone()),
        Data::DurationIso(v) => CellValue::String(v.clone()),
    }
}
