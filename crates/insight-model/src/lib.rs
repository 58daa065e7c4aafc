//! `insight-model` defines the data shapes shared by the insight analytics core.
//!
//! - [`CellValue`]: the tagged cell type every reader produces.
//! - [`Grid`]: a raw, possibly ragged 2D grid as read from a sheet.
//! - [`InferredTable`] / [`Record`]: the cleaned table recovered from a grid.
//! - [`import`] / [`workbook`]: CSV and workbook readers that type cells at ingestion time.

mod grid;
pub mod import;
mod source;
mod table;
mod value;
pub mod workbook;

pub use grid::{Grid, SheetGrid};
pub use source::{load_sheets, LoadError, SourceFormat, DEFAULT_MAX_SHEETS};
pub use table::{InferredTable, Record};
pub use value::CellValue;
