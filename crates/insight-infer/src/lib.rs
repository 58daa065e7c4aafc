//! Structure inference for messy spreadsheet grids.
//!
//! Given a raw [`Grid`](insight_model::Grid) this crate recovers the table inside it
//! ([`infer_table`]), labels each column with a semantic role ([`infer_column_roles`]),
//! and scores candidate tables so the most chartable sheet of a workbook can be picked
//! automatically ([`select_best_sheet`]).
//!
//! Everything here is a pure function of its input. Heuristics never fail: malformed
//! input produces an empty table, a zero score, or the `text` role.

pub mod analysis;
mod roles;
mod scoring;
mod table;

pub use roles::{
    infer_column_roles, infer_column_roles_with, ColumnRole, ColumnRoles, RoleOptions,
    DEFAULT_DATE_PATTERN, DEFAULT_ID_PATTERN,
};
pub use scoring::{choose_sheet, score_table, select_best_sheet, ScoringOptions, SheetChoice};
pub use table::{
    detect_header_row, infer_table, infer_table_with, prune_columns, trim_footer,
    InferenceOptions,
};
