use std::fmt;
use std::sync::OnceLock;

use insight_model::{CellValue, InferredTable};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::smoothing::DEFAULT_MIN_POINTS;

/// X-axis label of a series point: free text (usually a date) or a plain number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeLabel {
    Number(f64),
    Text(String),
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLabel::Number(n) => fmt::Display::fmt(&CellValue::Number(*n), f),
            TimeLabel::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TimeLabel {
    fn from(value: &str) -> Self {
        TimeLabel::Text(value.to_string())
    }
}

impl From<String> for TimeLabel {
    fn from(value: String) -> Self {
        TimeLabel::Text(value)
    }
}

impl From<f64> for TimeLabel {
    fn from(value: f64) -> Self {
        TimeLabel::Number(value)
    }
}

impl From<&CellValue> for TimeLabel {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Number(n) => TimeLabel::Number(*n),
            other => TimeLabel::Text(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub t: TimeLabel,
    pub y: f64,
}

impl SeriesPoint {
    pub fn new(t: impl Into<TimeLabel>, y: f64) -> Self {
        Self { t: t.into(), y }
    }
}

/// Build a series from two columns of `table`.
///
/// Numbers are taken as-is, numeric text and booleans are coerced, and anything else
/// (blanks, labels) plots as 0. Returns an empty series when either column is missing.
pub fn series_from_records(
    table: &InferredTable,
    x_field: &str,
    y_field: &str,
) -> Vec<SeriesPoint> {
    let (Some(x), Some(y)) = (table.column_index(x_field), table.column_index(y_field)) else {
        return Vec::new();
    };

    table
        .rows
        .iter()
        .map(|record| {
            let t = record.value(x).map(TimeLabel::from).unwrap_or_else(|| "".into());
            let y = record
                .value(y)
                .and_then(CellValue::coerce_number)
                .unwrap_or(0.0);
            SeriesPoint { t, y }
        })
        .collect()
}

const TIME_WORDS: [&str; 7] = ["date", "time", "month", "year", "quarter", "period", "week"];

/// Whether a series plotted against `x_field` is worth offering a forecast for.
///
/// Needs enough points, and an x axis that is time-like either by name or by the
/// look of its first value.
pub fn can_forecast(x_field: &str, first_x_value: &str, point_count: usize) -> bool {
    can_forecast_with(x_field, first_x_value, point_count, DEFAULT_MIN_POINTS)
}

/// [`can_forecast`] with a configured point minimum (see [`ForecastOptions::min_points`]).
///
/// [`ForecastOptions::min_points`]: crate::ForecastOptions::min_points
pub fn can_forecast_with(
    x_field: &str,
    first_x_value: &str,
    point_count: usize,
    min_points: usize,
) -> bool {
    if point_count < min_points.max(1) || x_field.is_empty() {
        return false;
    }

    let name = x_field.to_lowercase();
    if TIME_WORDS.iter().any(|word| name.contains(word)) {
        return true;
    }

    static DATE_LIKE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_LIKE_RE.get_or_init(|| {
        Regex::new(r"\d{4}|\d{1,2}/\d{1,2}|\d{4}-\d{2}").expect("valid regex")
    });
    re.is_match(first_x_value)
}
