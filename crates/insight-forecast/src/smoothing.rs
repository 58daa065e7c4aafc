//! Exponential smoothing forecasters.
//!
//! ```text
//! SES:   L_t = α y_t + (1 - α) L_{t-1}                    F_{t+h} = L_t
//! Holt:  L_t = α y_t + (1 - α)(L_{t-1} + T_{t-1})
//!        T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}        F_{t+h} = L_t + h T_t
//! ```
//!
//! Both report one-step-ahead fitted values, a prediction band of `z * std(residuals)`
//! (widened by `sqrt(h)` for Holt), and two 0..=100 quality scores derived from the
//! residuals.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labels::next_time_label;
use crate::series::{SeriesPoint, TimeLabel};
use crate::trend::detect_trend;

/// Fewest points a series needs before any forecaster will run.
pub const DEFAULT_MIN_POINTS: usize = 8;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    /// Level smoothing constant, in `(0, 1]`.
    pub alpha: f64,
    /// Trend smoothing constant, in `[0, 1]`.
    pub beta: f64,
    pub min_points: usize,
    /// Width of the prediction band in residual standard deviations (1.96 ~ 95%).
    pub z: f64,
    /// A slope steeper than this fraction of the mean level counts as a trend.
    pub trend_threshold: f64,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.1,
            min_points: DEFAULT_MIN_POINTS,
            z: 1.96,
            trend_threshold: 0.01,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("insufficient data for forecasting: need at least {required} numeric points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("smoothing parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    SimpleExponentialSmoothing,
    HoltLinearTrend,
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Methodology::SimpleExponentialSmoothing => "Simple Exponential Smoothing",
            Methodology::HoltLinearTrend => "Holt Linear Trend",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub t: TimeLabel,
    pub y: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResult {
    /// One-step-ahead fit for each finite input value. The first entry is the seed.
    pub fitted: Vec<f64>,
    pub forecast: Vec<ForecastPoint>,
    /// `(1 - residual std / mean) * 100`, clamped to `0..=100`.
    pub confidence: f64,
    pub methodology: Methodology,
    /// `(1 - MAPE) * 100`, clamped to `0..=100`.
    pub accuracy: f64,
}

/// Flat-line forecast for series without a meaningful trend.
pub fn ses_forecast(
    series: &[SeriesPoint],
    horizon: usize,
    options: &ForecastOptions,
) -> Result<ForecastResult, ForecastError> {
    check_unit_interval("alpha", options.alpha, false)?;
    let ys = finite_values(series, options.min_points)?;

    let mut level = ys[0];
    let mut fitted = Vec::with_capacity(ys.len());
    fitted.push(level);
    for &y in &ys[1..] {
        fitted.push(level);
        level = options.alpha * y + (1.0 - options.alpha) * level;
    }

    let fit = Fit::new(&ys, fitted);
    let margin = options.z * fit.residual_std;
    let forecast = project(series, horizon, |_| (level, margin));
    Ok(fit.into_result(forecast, Methodology::SimpleExponentialSmoothing))
}

/// Linear-trend forecast; the band widens with `sqrt(h)`.
pub fn holt_forecast(
    series: &[SeriesPoint],
    horizon: usize,
    options: &ForecastOptions,
) -> Result<ForecastResult, ForecastError> {
    check_unit_interval("alpha", options.alpha, false)?;
    check_unit_interval("beta", options.beta, true)?;
    let ys = finite_values(series, options.min_points.max(2))?;

    let mut level = ys[0];
    let mut trend = ys[1] - ys[0];
    let mut fitted = Vec::with_capacity(ys.len());
    fitted.push(level);
    for &y in &ys[1..] {
        fitted.push(level + trend);
        let prev_level = level;
        level = options.alpha * y + (1.0 - options.alpha) * (level + trend);
        trend = options.beta * (level - prev_level) + (1.0 - options.beta) * trend;
    }

    let fit = Fit::new(&ys, fitted);
    let std = fit.residual_std;
    let forecast = project(series, horizon, |h| {
        let h = h as f64;
        (level + h * trend, options.z * std * h.sqrt())
    });
    Ok(fit.into_result(forecast, Methodology::HoltLinearTrend))
}

/// Pick Holt when the series trends and SES otherwise.
///
/// If Holt cannot run, SES is tried instead and its error (if any) is returned.
pub fn smart_forecast(
    series: &[SeriesPoint],
    horizon: usize,
    options: &ForecastOptions,
) -> Result<ForecastResult, ForecastError> {
    let ys: Vec<f64> = series.iter().map(|p| p.y).collect();
    if !detect_trend(&ys, options) {
        log::debug!("no trend detected; using simple exponential smoothing");
        return ses_forecast(series, horizon, options);
    }

    log::debug!("trend detected; using Holt linear trend");
    holt_forecast(series, horizon, options).or_else(|err| {
        log::warn!("Holt forecast failed ({err}); falling back to simple exponential smoothing");
        ses_forecast(series, horizon, options)
    })
}

fn check_unit_interval(
    name: &'static str,
    value: f64,
    allow_zero: bool,
) -> Result<(), ForecastError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && lower_ok && value <= 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter { name, value })
    }
}

/// Finite `y` values of `series`, or an error when fewer than `required` (at least 1) remain.
fn finite_values(series: &[SeriesPoint], required: usize) -> Result<Vec<f64>, ForecastError> {
    let required = required.max(1);
    if series.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            actual: series.len(),
        });
    }
    let ys: Vec<f64> = series.iter().map(|p| p.y).filter(|y| y.is_finite()).collect();
    if ys.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            actual: ys.len(),
        });
    }
    Ok(ys)
}

/// Forecast points `1..=horizon` labelled from the last input point.
fn project(
    series: &[SeriesPoint],
    horizon: usize,
    value_and_margin: impl Fn(usize) -> (f64, f64),
) -> Vec<ForecastPoint> {
    let Some(last) = series.last() else {
        return Vec::new();
    };
    (1..=horizon)
        .map(|h| {
            let (y, margin) = value_and_margin(h);
            ForecastPoint {
                t: next_time_label(&last.t, h),
                y,
                upper_bound: y + margin,
                lower_bound: y - margin,
            }
        })
        .collect()
}

struct Fit {
    fitted: Vec<f64>,
    residual_std: f64,
    confidence: f64,
    accuracy: f64,
}

impl Fit {
    /// Score one-step-ahead fits against `ys`. Index 0 is the seed and is not scored.
    fn new(ys: &[f64], fitted: Vec<f64>) -> Self {
        let residuals: Vec<f64> = ys
            .iter()
            .zip(&fitted)
            .skip(1)
            .map(|(y, f)| y - f)
            .collect();
        let residual_std = population_std(&residuals);

        let mean = ys.iter().sum::<f64>() / ys.len() as f64;
        let confidence = if mean == 0.0 {
            0.0
        } else {
            percent(1.0 - residual_std / mean)
        };

        let (ape_sum, scored) = ys[1..]
            .iter()
            .zip(&residuals)
            .filter(|(y, _)| **y != 0.0)
            .fold((0.0, 0usize), |(sum, count), (y, r)| (sum + (r / y).abs(), count + 1));
        let accuracy = if scored == 0 {
            0.0
        } else {
            percent(1.0 - ape_sum / scored as f64)
        };

        Self {
            fitted,
            residual_std,
            confidence,
            accuracy,
        }
    }

    fn into_result(self, forecast: Vec<ForecastPoint>, methodology: Methodology) -> ForecastResult {
        ForecastResult {
            fitted: self.fitted,
            forecast,
            confidence: self.confidence,
            methodology,
            accuracy: self.accuracy,
        }
    }
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

fn percent(fraction: f64) -> f64 {
    (fraction * 100.0).clamp(0.0, 100.0)
}
