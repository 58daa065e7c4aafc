use std::borrow::Cow;
use std::io::Read;

use chrono::NaiveDate;
use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use serde::Deserialize;
use thiserror::Error;

use crate::{CellValue, Grid};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// How to decode raw CSV bytes into text fields.
    pub encoding: CsvTextEncoding,
    /// Decimal separator used when parsing numbers.
    ///
    /// `.` matches inputs like `1,234.56`. `,` matches inputs like `1.234,56`.
    pub decimal_separator: char,
    /// Preferred order for ambiguous numeric dates like `01/02/2024`.
    pub date_order: CsvDateOrder,
    /// Currency symbols stripped before numeric parsing (`$1,200` reads as `1200`).
    pub currency_symbols: Vec<char>,
    /// Stop reading after this many records. `None` reads the whole input.
    pub max_rows: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: CsvTextEncoding::Auto,
            decimal_separator: '.',
            date_order: CsvDateOrder::default(),
            currency_symbols: vec!['$', '€', '£', '¥'],
            max_rows: None,
        }
    }
}

impl CsvOptions {
    /// Defaults for tab-separated input.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvTextEncoding {
    /// Attempt to decode as UTF-8; if a field contains invalid UTF-8, fall back to Windows-1252.
    ///
    /// This matches common Excel behavior when opening CSV files on Windows.
    Auto,
    /// Decode as UTF-8 and reject invalid byte sequences.
    Utf8,
    /// Decode as Windows-1252 (aka CP-1252).
    Windows1252,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvDateOrder {
    /// Month / day / year (e.g. `12/31/2024`).
    #[default]
    Mdy,
    /// Day / month / year (e.g. `31/12/2024`).
    Dmy,
}

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("csv input was empty")]
    EmptyInput,
    #[error("csv parse error at row {row}, column {column}: {reason}")]
    Parse { row: u64, column: u64, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read a CSV stream into a raw [`Grid`], typing every field as it is decoded.
///
/// Rows keep their own lengths (no padding). Delimiter-only lines (`,,,`) become rows of
/// [`CellValue::Empty`], so spreadsheet exports keep their blank separator rows.
pub fn read_csv_grid<R: Read>(reader: R, options: &CsvOptions) -> Result<Grid, CsvImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        // Header detection happens later on the whole grid.
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid = Grid::new();
    let mut record = ByteRecord::new();
    let mut record_index: u64 = 0;

    loop {
        if options.max_rows.is_some_and(|max| grid.len() >= max) {
            log::debug!("csv import stopped at max_rows={}", grid.len());
            break;
        }
        record.clear();
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                record_index += 1;
                let mut row = Vec::with_capacity(record.len());
                for (idx, raw) in record.iter().enumerate() {
                    let field = decode_field(raw, record_index, idx as u64 + 1, options.encoding)?;
                    row.push(parse_cell(field.as_ref(), options));
                }
                grid.push_row(row);
            }
            Err(e) => return Err(map_csv_error(e, record_index + 1)),
        }
    }

    if record_index == 0 {
        return Err(CsvImportError::EmptyInput);
    }
    Ok(grid)
}

/// Type a single text field the way the CSV reader does.
///
/// Order: blank, boolean, number (currency/percent/grouping aware), date, text.
pub fn parse_cell(field: &str, options: &CsvOptions) -> CellValue {
    let v = field.trim();
    if v.is_empty() {
        return CellValue::Empty;
    }
    if let Some(b) = parse_bool(v) {
        return CellValue::Boolean(b);
    }
    if let Some(n) = parse_number_f64(v, options) {
        return CellValue::Number(n);
    }
    if let Some(date) = parse_date(v, options.date_order) {
        return CellValue::Date(date);
    }
    CellValue::String(field.to_string())
}

fn parse_bool(v: &str) -> Option<bool> {
    if v.eq_ignore_ascii_case("true") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_number_f64(v: &str, options: &CsvOptions) -> Option<f64> {
    let (sign, body) = split_sign_and_body(v);
    let (body, _) = strip_symbol(body, &options.currency_symbols);
    let (body, percent) = match body.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), true),
        None => (body, false),
    };
    if body.is_empty() {
        return None;
    }

    let normalized = normalize_number(body, options.decimal_separator)?;
    let parsed: f64 = normalized.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    let scaled = if percent { parsed / 100.0 } else { parsed };
    Some(scaled * sign as f64)
}

fn normalize_number(s: &str, decimal_separator: char) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut saw_digit = false;
    let mut saw_decimal = false;
    let mut saw_exp = false;
    let mut saw_exp_sign = false;

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            saw_digit = true;
            out.push(ch);
            continue;
        }

        if !saw_exp && ch == decimal_separator {
            if saw_decimal {
                return None;
            }
            saw_decimal = true;
            out.push('.');
            continue;
        }

        if !saw_exp && is_grouping_separator(ch, decimal_separator) {
            // Grouping only makes sense between digits of the integer part.
            if !saw_digit || saw_decimal {
                return None;
            }
            continue;
        }

        if !saw_exp && matches!(ch, 'e' | 'E') {
            if !saw_digit {
                return None;
            }
            saw_exp = true;
            saw_exp_sign = false;
            out.push('e');
            continue;
        }

        if saw_exp && !saw_exp_sign && matches!(ch, '+' | '-') {
            // Exponent sign is only valid immediately after `e` / `E`.
            if out.ends_with('e') {
                saw_exp_sign = true;
                out.push(ch);
                continue;
            }
            return None;
        }

        return None;
    }

    if !saw_digit {
        return None;
    }
    if out.ends_with('e') || out.ends_with("e+") || out.ends_with("e-") {
        return None;
    }
    Some(out)
}

fn split_sign_and_body(mut s: &str) -> (i64, &str) {
    s = s.trim();
    let mut sign: i64 = 1;

    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        sign = -1;
        s = inner.trim();
    }

    if let Some(rest) = s.strip_prefix('-') {
        sign = -sign;
        s = rest.trim_start();
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest.trim_start();
    }

    (sign, s)
}

fn strip_symbol<'a>(mut s: &'a str, symbols: &[char]) -> (&'a str, bool) {
    s = s.trim();
    for sym in symbols {
        if let Some(rest) = s.strip_prefix(*sym) {
            return (rest.trim_start(), true);
        }
        if let Some(rest) = s.strip_suffix(*sym) {
            return (rest.trim_end(), true);
        }
    }
    (s, false)
}

fn is_grouping_separator(ch: char, decimal_separator: char) -> bool {
    match ch {
        ',' => decimal_separator != ',',
        '.' => decimal_separator != '.',
        // Common grouping separators across locales.
        '\u{00A0}' | '\u{202F}' | '_' | '\'' | '’' => true,
        _ => false,
    }
}

/// Recognize `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY` (or `DD/MM/YYYY`), optionally followed
/// by a time part. Date-only input is normalized to `YYYY-MM-DD`; datetimes keep their text.
fn parse_date(s: &str, date_order: CsvDateOrder) -> Option<String> {
    let date_end = s
        .bytes()
        .position(|b| !(b.is_ascii_digit() || b == b'-' || b == b'/'))
        .unwrap_or(s.len());
    if date_end == 0 {
        return None;
    }

    // `date_part` is ASCII only.
    let date_part = &s[..date_end];
    let rest = &s[date_end..];

    let parts: Vec<&str> = date_part.split(|c| c == '-' || c == '/').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?)
    } else if parts[2].len() == 4 {
        let year: i32 = parts[2].parse().ok()?;
        let a: u32 = parts[0].parse().ok()?;
        let b: u32 = parts[1].parse().ok()?;
        let (month, day) = if a > 12 && b <= 12 {
            (b, a)
        } else if b > 12 && a <= 12 {
            (a, b)
        } else {
            match date_order {
                CsvDateOrder::Dmy => (b, a),
                CsvDateOrder::Mdy => (a, b),
            }
        };
        (year, month, day)
    } else {
        return None;
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if rest.is_empty() {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let time = rest.strip_prefix(['T', ' '])?;
    if time.starts_with(|c: char| c.is_ascii_digit()) {
        Some(s.to_string())
    } else {
        None
    }
}

fn decode_field<'a>(
    field: &'a [u8],
    row: u64,
    column: u64,
    encoding: CsvTextEncoding,
) -> Result<Cow<'a, str>, CsvImportError> {
    // Handle UTF-8 BOM at the start of the file. This commonly appears in Excel-exported CSVs.
    let field = if row == 1 && column == 1 && field.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &field[3..]
    } else {
        field
    };

    match encoding {
        CsvTextEncoding::Utf8 => std::str::from_utf8(field)
            .map(Cow::Borrowed)
            .map_err(|e| CsvImportError::Parse {
                row,
                column,
                reason: format!("invalid UTF-8: {e}"),
            }),
        CsvTextEncoding::Windows1252 => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            Ok(cow)
        }
        CsvTextEncoding::Auto => match std::str::from_utf8(field) {
            Ok(s) => Ok(Cow::Borrowed(s)),
            Err(_) => {
                let (cow, _, _) = WINDOWS_1252.decode(field);
                Ok(cow)
            }
        },
    }
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> CsvImportError {
    let reason = err.to_string();
    let pos = err.position().cloned();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => CsvImportError::Io(e),
        _ => {
            let row = pos
                .map(|p| p.record())
                .filter(|r| *r > 0)
                .unwrap_or(fallback_row);
            CsvImportError::Parse {
                row,
                column: 0,
                reason,
            }
        }
    }
}
