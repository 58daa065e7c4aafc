//! Table recovery for messy sheets.
//!
//! A raw grid goes through three passes:
//! 1. pick the header row ([`detect_header_row`]),
//! 2. keep only columns with data in the body ([`prune_columns`]),
//! 3. cut the body at the first long run of blank rows ([`trim_footer`]).
//!
//! [`infer_table`] runs all three and assembles named records. None of these steps can
//! fail; degenerate input produces a degenerate (empty) table.

use std::collections::HashSet;

use insight_model::{CellValue, Grid, InferredTable};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Only the first `max_header_scan` rows are header candidates.
    pub max_header_scan: usize,
    /// Fraction of a row's non-blank cells that must be short text for the row to count as
    /// "mostly strings".
    pub min_header_text_ratio: f64,
    /// Text cells at least this many characters long do not count as header-like.
    pub max_header_label_len: usize,
    /// Score bonus for "mostly strings" rows. Large enough to dominate the other terms.
    pub text_row_bonus: f64,
    /// Score penalty per numeric cell in a candidate header row.
    pub numeric_cell_penalty: f64,
    /// This many consecutive fully-blank body rows end the table.
    pub footer_blank_run_length: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_header_scan: 30,
            min_header_text_ratio: 0.6,
            max_header_label_len: 128,
            text_row_bonus: 1000.0,
            numeric_cell_penalty: 0.2,
            footer_blank_run_length: 3,
        }
    }
}

/// Infer a table from `grid` with default options.
pub fn infer_table(grid: &Grid) -> InferredTable {
    infer_table_with(grid, &InferenceOptions::default())
}

pub fn infer_table_with(grid: &Grid, options: &InferenceOptions) -> InferredTable {
    if grid.is_empty() {
        return InferredTable::default();
    }

    let header_row_index = detect_header_row(grid, options);
    let keep_cols = prune_columns(grid, header_row_index);

    let headers = header_names(grid.row(header_row_index), &keep_cols);

    let body: Vec<Vec<CellValue>> = grid.rows()[header_row_index + 1..]
        .iter()
        .map(|row| project_row(row, &keep_cols))
        .collect();
    let (rows, trimmed_footer_rows) = trim_footer(body, options.footer_blank_run_length);

    log::debug!(
        "inferred table: header_row={header_row_index} columns={} rows={} trimmed_footer_rows={trimmed_footer_rows}",
        headers.len(),
        rows.len()
    );

    InferredTable::from_parts(headers, rows, header_row_index, trimmed_footer_rows)
}

/// Choose the row most likely to hold column labels.
///
/// Rows are scored as `bonus(mostly short text) + distinct labels - penalty * numbers`;
/// the highest score wins and ties keep the earliest row. Returns 0 when no candidate
/// row has any non-blank cell.
pub fn detect_header_row(grid: &Grid, options: &InferenceOptions) -> usize {
    let mut best: Option<(usize, f64)> = None;

    for (idx, row) in grid.rows().iter().take(options.max_header_scan).enumerate() {
        let Some(score) = header_score(row, options) else {
            continue;
        };
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }

    best.map(|(idx, _)| idx).unwrap_or(0)
}

fn header_score(row: &[CellValue], options: &InferenceOptions) -> Option<f64> {
    let vals: Vec<&CellValue> = row.iter().filter(|v| !v.is_blank()).collect();
    if vals.is_empty() {
        return None;
    }

    let distinct = vals
        .iter()
        .map(|v| v.to_string().trim().to_lowercase())
        .collect::<HashSet<_>>()
        .len();
    let strings = vals
        .iter()
        .filter(|v| {
            v.as_text()
                .is_some_and(|s| s.chars().count() < options.max_header_label_len)
        })
        .count();
    let numeric = vals.iter().filter(|v| v.is_number()).count();

    let mostly_strings = strings as f64 >= vals.len() as f64 * options.min_header_text_ratio;
    let bonus = if mostly_strings {
        options.text_row_bonus
    } else {
        0.0
    };
    Some(bonus + distinct as f64 - numeric as f64 * options.numeric_cell_penalty)
}

/// Indices of the columns that hold at least one non-blank value below the header row.
///
/// The column count is taken from the widest row anywhere in the grid, so a header row
/// wider than every data row cannot hide columns.
pub fn prune_columns(grid: &Grid, header_row: usize) -> Vec<usize> {
    let body = grid.rows().get(header_row + 1..).unwrap_or(&[]);
    (0..grid.width())
        .filter(|&col| {
            body.iter()
                .any(|row| row.get(col).is_some_and(|v| !v.is_blank()))
        })
        .collect()
}

/// Drop everything from the first run of `blank_run_length` consecutive blank rows onward.
///
/// Blank rows before the run reaches the threshold are kept (they are visual separators
/// inside the data). Returns the kept rows and how many input rows were dropped.
pub fn trim_footer(
    rows: Vec<Vec<CellValue>>,
    blank_run_length: usize,
) -> (Vec<Vec<CellValue>>, usize) {
    let blank_run_length = blank_run_length.max(1);
    let total = rows.len();
    let mut kept = Vec::with_capacity(total);
    let mut consecutive_blank = 0usize;

    for row in rows {
        if row.iter().all(CellValue::is_blank) {
            consecutive_blank += 1;
        } else {
            consecutive_blank = 0;
        }
        if consecutive_blank >= blank_run_length {
            break;
        }
        kept.push(row);
    }

    let trimmed = total - kept.len();
    (kept, trimmed)
}

fn project_row(row: &[CellValue], keep_cols: &[usize]) -> Vec<CellValue> {
    keep_cols
        .iter()
        .map(|&c| row.get(c).cloned().unwrap_or(CellValue::Empty))
        .collect()
}

/// Header labels for the retained columns: trimmed header text, `column_N` (1-based among
/// retained columns) for blanks, and a `_2`, `_3`, ... suffix for repeats.
fn header_names(header_row: &[CellValue], keep_cols: &[usize]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(keep_cols.len());
    keep_cols
        .iter()
        .enumerate()
        .map(|(pos, &col)| {
            let raw = header_row.get(col).map(|v| v.to_string()).unwrap_or_default();
            let trimmed = raw.trim();
            let base = if trimmed.is_empty() {
                format!("column_{}", pos + 1)
            } else {
                trimmed.to_string()
            };

            let mut name = base.clone();
            let mut suffix = 2;
            while used.contains(&name) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}
