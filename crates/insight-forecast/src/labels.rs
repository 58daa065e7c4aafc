use chrono::{Datelike, Months, NaiveDate};

use crate::series::TimeLabel;

/// Synthesize the label `periods_ahead` steps after `last`.
///
/// The cadence is read off the shape of the label:
/// - `YYYY-MM-DD` steps by calendar months, clamping the day to the end of shorter months,
/// - `YYYY-MM` steps by months,
/// - `YYYY` steps by years,
/// - numbers (and numeric text) step by one.
///
/// Labels with no recognizable cadence get a ` (+N)` suffix so projected points stay
/// distinguishable on an axis.
pub fn next_time_label(last: &TimeLabel, periods_ahead: usize) -> TimeLabel {
    let text = match last {
        TimeLabel::Number(n) => return TimeLabel::Number(n + periods_ahead as f64),
        TimeLabel::Text(text) => text.as_str(),
    };

    step_calendar_label(text, periods_ahead)
        .or_else(|| {
            let n: f64 = text.trim().parse().ok().filter(|n: &f64| n.is_finite())?;
            Some(TimeLabel::Number(n + periods_ahead as f64).to_string())
        })
        .map(TimeLabel::Text)
        .unwrap_or_else(|| TimeLabel::Text(format!("{text} (+{periods_ahead})")))
}

fn step_calendar_label(text: &str, periods_ahead: usize) -> Option<String> {
    let parts: Vec<&str> = text.split('-').collect();
    let widths: Vec<usize> = parts.iter().map(|p| p.len()).collect();
    if !parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let months = u32::try_from(periods_ahead).ok()?;

    match widths.as_slice() {
        [4, 2, 2] => {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            let next = date.checked_add_months(Months::new(months))?;
            Some(next.format("%Y-%m-%d").to_string())
        }
        [4, 2] => {
            let year: i32 = parts[0].parse().ok()?;
            let month: u32 = parts[1].parse().ok()?;
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let next = first.checked_add_months(Months::new(months))?;
            Some(format!("{:04}-{:02}", next.year(), next.month()))
        }
        [4] => {
            let year: i64 = parts[0].parse().ok()?;
            Some((year + i64::from(months)).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> TimeLabel {
        TimeLabel::Text(s.to_string())
    }

    #[test]
    fn iso_dates_step_by_month() {
        assert_eq!(next_time_label(&text("2024-01-15"), 1), text("2024-02-15"));
        assert_eq!(next_time_label(&text("2024-11-30"), 3), text("2025-02-28"));
        assert_eq!(next_time_label(&text("2024-01-31"), 1), text("2024-02-29"));
    }

    #[test]
    fn year_month_steps_by_month() {
        assert_eq!(next_time_label(&text("2023-12"), 1), text("2024-01"));
        assert_eq!(next_time_label(&text("2023-06"), 18), text("2024-12"));
    }

    #[test]
    fn years_and_numbers_increment() {
        assert_eq!(next_time_label(&text("2023"), 2), text("2025"));
        assert_eq!(next_time_label(&TimeLabel::Number(7.0), 3), TimeLabel::Number(10.0));
        assert_eq!(next_time_label(&text("12"), 1), text("13"));
        assert_eq!(next_time_label(&text(" 2.5 "), 2), text("4.5"));
    }

    #[test]
    fn unrecognized_labels_get_a_step_suffix() {
        assert_eq!(next_time_label(&text("Q4 FY24"), 1), text("Q4 FY24 (+1)"));
        assert_eq!(next_time_label(&text("Q4 FY24"), 2), text("Q4 FY24 (+2)"));
        // Right shape, impossible month.
        assert_eq!(next_time_label(&text("2024-13"), 1), text("2024-13 (+1)"));
    }
}
