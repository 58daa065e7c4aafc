//! Descriptive checks run over an inferred table before it is handed to summarization:
//! overall change of a metric over time, outlier values, and the categories that
//! contribute most to a metric.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use insight_model::{CellValue, InferredTable};
use serde::Serialize;

/// Changes within this many percent count as "stable".
const STABLE_CHANGE_PCT: f64 = 5.0;
const MIN_ANOMALY_VALUES: usize = 10;
const ANOMALY_Z: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// Absolute change between the first and last period, in percent.
    pub percentage: f64,
    pub periods: usize,
    pub description: String,
}

/// Compare the first and last value of `value_col` after ordering rows by `date_col`.
///
/// Returns `None` for unknown columns, fewer than two usable rows, or a first value of 0.
pub fn analyze_trend(
    table: &InferredTable,
    date_col: &str,
    value_col: &str,
) -> Option<TrendAnalysis> {
    let date_idx = table.column_index(date_col)?;
    let value_idx = table.column_index(value_col)?;

    let mut points: Vec<(Option<f64>, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let date = row.value(date_idx)?;
            let value = row.value(value_idx)?;
            if date.is_blank() || value.is_blank() {
                return None;
            }
            Some((time_key(date), value.coerce_number().unwrap_or(0.0)))
        })
        .collect();
    if points.len() < 2 {
        return None;
    }

    // Stable sort; rows without a usable time key keep their order after the dated ones.
    points.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let first = points[0].1;
    let last = points[points.len() - 1].1;
    if first == 0.0 {
        return None;
    }

    let change = (last - first) / first.abs() * 100.0;
    let percentage = change.abs();
    let direction = if percentage > STABLE_CHANGE_PCT {
        if change > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    } else {
        TrendDirection::Stable
    };
    let verb = match direction {
        TrendDirection::Up => "increased",
        TrendDirection::Down => "decreased",
        TrendDirection::Stable => "remained stable",
    };

    Some(TrendAnalysis {
        direction,
        percentage,
        periods: points.len(),
        description: format!(
            "{} has {verb} by {percentage:.1}% over the analyzed period",
            friendly_label(value_col)
        ),
    })
}

/// Sortable position of a time-like cell: numbers as-is, `YYYY-MM-DD`, `YYYY-MM`, and
/// `YYYY` prefixes as days since the common era.
fn time_key(value: &CellValue) -> Option<f64> {
    if let Some(n) = value.as_number() {
        return Some(n);
    }
    let text = value.as_text()?.trim();
    let date = text
        .get(..10)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok())
        .or_else(|| {
            let year: i32 = text.parse().ok().filter(|_| text.len() == 4)?;
            NaiveDate::from_ymd_opt(year, 1, 1)
        })?;
    Some(date.num_days_from_ce() as f64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spike,
    Drop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Anomaly {
    pub field: String,
    pub row: usize,
    pub value: f64,
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub z_score: f64,
    pub description: String,
}

/// Flag values more than two standard deviations from their column mean.
///
/// A column is numeric when its first row holds a number (or numeric text); columns with
/// fewer than ten numeric values are skipped. At most `limit` anomalies are returned, in
/// column-then-row order.
pub fn detect_anomalies(table: &InferredTable, limit: usize) -> Vec<Anomaly> {
    let mut out = Vec::new();
    if limit == 0 {
        return out;
    }

    for (col, header) in table.headers.iter().enumerate() {
        if !first_row_is_numeric(table, col) {
            continue;
        }
        let values: Vec<(usize, f64)> = table
            .column(col)
            .enumerate()
            .filter_map(|(row, v)| v.coerce_number().map(|n| (row, n)))
            .collect();
        if values.len() < MIN_ANOMALY_VALUES {
            continue;
        }

        let n = values.len() as f64;
        let mean = values.iter().map(|(_, v)| v).sum::<f64>() / n;
        let std = (values.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std == 0.0 {
            continue;
        }

        for &(row, value) in &values {
            let z = ((value - mean) / std).abs();
            if z <= ANOMALY_Z {
                continue;
            }
            let severity = if z > 3.0 {
                Severity::High
            } else if z > 2.5 {
                Severity::Medium
            } else {
                Severity::Low
            };
            let kind = if value > mean {
                AnomalyKind::Spike
            } else {
                AnomalyKind::Drop
            };
            let label = friendly_label(header);
            let kind_word = match kind {
                AnomalyKind::Spike => "spike",
                AnomalyKind::Drop => "drop",
            };
            out.push(Anomaly {
                field: header.clone(),
                row,
                value,
                kind,
                severity,
                z_score: z,
                description: format!(
                    "{label} shows an unusual {kind_word} of {} ({z:.1}σ from average)",
                    format_compact(value)
                ),
            });
            if out.len() >= limit {
                return out;
            }
        }
    }

    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopDriver {
    /// Category column the driver belongs to.
    pub field: String,
    pub category: String,
    pub total: f64,
    /// Share of the metric's grand total, in percent.
    pub impact: f64,
    pub description: String,
}

/// Sum the first numeric column per value of the first categorical column and return the
/// `limit` largest contributors.
///
/// A column is categorical when it has more than one distinct value and fewer distinct
/// values than half the row count.
pub fn identify_top_drivers(table: &InferredTable, limit: usize) -> Vec<TopDriver> {
    let row_count = table.rows.len();
    let category_col = (0..table.headers.len()).find(|&col| {
        let distinct: HashSet<String> = table.column(col).map(|v| v.to_string()).collect();
        distinct.len() > 1 && (distinct.len() as f64) < row_count as f64 * 0.5
    });
    let metric_col = (0..table.headers.len()).find(|&col| first_row_is_numeric(table, col));
    let (Some(category_col), Some(metric_col)) = (category_col, metric_col) else {
        return Vec::new();
    };

    let totals = sum_by_category(table, category_col, metric_col);
    let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();

    let mut ranked = totals;
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);

    let field = table.headers[category_col].clone();
    let metric_label = friendly_label(&table.headers[metric_col]);
    ranked
        .into_iter()
        .map(|(category, total)| {
            let impact = if grand_total == 0.0 {
                0.0
            } else {
                total / grand_total * 100.0
            };
            TopDriver {
                field: field.clone(),
                description: format!(
                    "{category} contributes {impact:.1}% of total {metric_label}"
                ),
                category,
                total,
                impact,
            }
        })
        .collect()
}

/// Per-category sums in first-seen category order.
fn sum_by_category(
    table: &InferredTable,
    category_col: usize,
    metric_col: usize,
) -> Vec<(String, f64)> {
    let (totals, _) = table.rows.iter().fold(
        (Vec::<(String, f64)>::new(), HashMap::<String, usize>::new()),
        |(mut totals, mut index), row| {
            let key = row
                .value(category_col)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let value = row
                .value(metric_col)
                .and_then(CellValue::coerce_number)
                .unwrap_or(0.0);
            match index.get(&key) {
                Some(&pos) => totals[pos].1 += value,
                None => {
                    index.insert(key.clone(), totals.len());
                    totals.push((key, value));
                }
            }
            (totals, index)
        },
    );
    totals
}

fn first_row_is_numeric(table: &InferredTable, col: usize) -> bool {
    table
        .rows
        .first()
        .and_then(|r| r.value(col))
        .and_then(CellValue::coerce_number)
        .is_some()
}

/// Business-friendly label for a column name: `net_revenue` -> `Net Revenue`.
pub fn friendly_label(name: &str) -> String {
    name.trim()
        .replace(['_', '-'], " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Compact number for prose: `1.2B`, `3.4M`, `5.6K`, otherwise up to two decimals.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        let s = format!("{value:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
