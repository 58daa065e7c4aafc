use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-friendly representation of a single parsed cell.
///
/// The variant is decided once, at ingestion time, by whichever reader produced the
/// grid. Downstream heuristics branch on the tag instead of re-sniffing text.
///
/// The enum uses an explicit `{type, value}` tagged layout for stable IPC.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Empty / unset cell value.
    Empty,
    /// IEEE-754 double precision number.
    Number(f64),
    /// Plain string.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// Date-like text, normalized where the source allowed it (`YYYY-MM-DD` or ISO datetime).
    Date(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// Returns true if the value is [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns true for values that carry no data: [`CellValue::Empty`] or a zero-length string.
    ///
    /// Whitespace-only strings are *not* blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    /// Returns true for textual cells (plain strings and date-like strings).
    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::String(_) | CellValue::Date(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the underlying text for [`CellValue::String`] and [`CellValue::Date`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort numeric coercion: numbers as-is, numeric text parsed, booleans as 0/1.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Date(_) | CellValue::Empty => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::String(s) | CellValue::Date(s) => f.write_str(s),
            CellValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Render a number the way a spreadsheet's "General" format would for header text:
/// integral values drop the fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}
