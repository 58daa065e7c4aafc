use insight_model::{InferredTable, SheetGrid};
use serde::{Deserialize, Serialize};

use crate::table::{infer_table_with, InferenceOptions};

/// Weights for [`score_table`]. The defaults are empirical and untuned.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Rows inspected per column when counting numeric cells.
    pub sample_rows: usize,
    /// A column is numeric when at least this fraction of sampled cells are numbers.
    pub numeric_ratio: f64,
    pub min_wide_columns: usize,
    pub min_long_rows: usize,
    pub width_weight: f64,
    pub length_weight: f64,
    /// Only the first N sheets of a workbook compete in [`select_best_sheet`].
    pub max_candidate_sheets: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            sample_rows: 200,
            numeric_ratio: 0.3,
            min_wide_columns: 5,
            min_long_rows: 20,
            width_weight: 10.0,
            length_weight: 10.0,
            max_candidate_sheets: insight_model::DEFAULT_MAX_SHEETS,
        }
    }
}

/// Tabularity score: higher means more likely to be the dataset a user wants charted.
///
/// `width_weight` if the table is wide, `length_weight` if it is long, plus one point per
/// mostly-numeric column. Empty tables score 0.
pub fn score_table(table: &InferredTable, options: &ScoringOptions) -> f64 {
    if table.rows.is_empty() || table.headers.is_empty() {
        return 0.0;
    }

    let sample = &table.rows[..table.rows.len().min(options.sample_rows)];
    let threshold = sample.len() as f64 * options.numeric_ratio;
    let numeric_score = (0..table.headers.len())
        .filter(|&col| {
            let numbers = sample
                .iter()
                .filter(|r| r.value(col).is_some_and(|v| v.is_number()))
                .count();
            numbers as f64 >= threshold
        })
        .count();

    let width_bonus = if table.headers.len() >= options.min_wide_columns {
        options.width_weight
    } else {
        0.0
    };
    let length_bonus = if table.rows.len() >= options.min_long_rows {
        options.length_weight
    } else {
        0.0
    };

    width_bonus + length_bonus + numeric_score as f64
}

/// The sheet picked from a workbook, with the table inferred from it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SheetChoice {
    pub name: String,
    /// Position of the sheet in the candidate list.
    pub index: usize,
    pub score: f64,
    pub table: InferredTable,
}

/// Infer a table for each of the first `max_candidate_sheets` sheets and keep the best.
///
/// Ties keep the earlier sheet. Returns `None` only when `sheets` is empty.
pub fn select_best_sheet(
    sheets: &[SheetGrid],
    inference: &InferenceOptions,
    scoring: &ScoringOptions,
) -> Option<SheetChoice> {
    let mut best: Option<SheetChoice> = None;

    for (index, sheet) in sheets
        .iter()
        .take(scoring.max_candidate_sheets)
        .enumerate()
    {
        let table = infer_table_with(&sheet.grid, inference);
        let score = score_table(&table, scoring);
        log::debug!("sheet `{}` scored {score}", sheet.name);

        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(SheetChoice {
                name: sheet.name.clone(),
                index,
                score,
                table,
            });
        }
    }

    best
}

/// Infer and score the sheet named `name`, bypassing the best-sheet competition.
pub fn choose_sheet(
    sheets: &[SheetGrid],
    name: &str,
    inference: &InferenceOptions,
    scoring: &ScoringOptions,
) -> Option<SheetChoice> {
    let (index, sheet) = sheets.iter().enumerate().find(|(_, s)| s.name == name)?;
    let table = infer_table_with(&sheet.grid, inference);
    let score = score_table(&table, scoring);
    Some(SheetChoice {
        name: sheet.name.clone(),
        index,
        score,
        table,
    })
}
