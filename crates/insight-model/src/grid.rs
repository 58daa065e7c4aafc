use serde::{Deserialize, Serialize};

use crate::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// A raw, row-major 2D grid of parsed cells.
///
/// Rows may have different lengths; reads past the end of a short row behave as if the
/// row were padded with [`CellValue::Empty`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    /// Returns the stored cells of row `row` (not padded), or an empty slice past the end.
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.row(row).get(col).unwrap_or(&EMPTY)
    }

    /// Longest row length anywhere in the grid.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl From<Vec<Vec<CellValue>>> for Grid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::from_rows(rows)
    }
}

impl FromIterator<Vec<CellValue>> for Grid {
    fn from_iter<I: IntoIterator<Item = Vec<CellValue>>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

/// One named grid out of a multi-sheet source (a workbook tab, or the single sheet of a CSV).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub name: String,
    pub grid: Grid,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// Build a [`Grid`] from literal rows, converting each cell with `Into<CellValue>`.
///
/// ```
/// use insight_model::{grid, CellValue};
///
/// let g = grid![["Name", "Revenue"], ["Alice", 100.0]];
/// assert_eq!(g.cell(1, 1), &CellValue::Number(100.0));
/// ```
#[macro_export]
macro_rules! grid {
    ($([$($cell:expr),* $(,)?]),* $(,)?) => {
        $crate::Grid::from_rows(vec![
            $(vec![$($crate::CellValue::from($cell)),*]),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_read_as_empty() {
        let g = Grid::from_rows(vec![
            vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")],
            vec![CellValue::from(1.0)],
        ]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.cell(1, 2), &CellValue::Empty);
        assert_eq!(g.cell(9, 0), &CellValue::Empty);
        assert!(g.row(9).is_empty());
    }
}
