//! Short-horizon forecasting for chart series.
//!
//! [`smart_forecast`] is the usual entry point: it checks the series for a linear drift
//! ([`detect_trend`]) and runs Holt's linear method when there is one, simple exponential
//! smoothing otherwise. Forecast points are labelled by continuing the cadence of the last
//! input label ([`next_time_label`]).

mod labels;
mod seasonal;
mod series;
mod smoothing;
mod summary;
mod trend;

pub use labels::next_time_label;
pub use seasonal::{holt_winters_additive, HoltWintersFit};
pub use series::{can_forecast, can_forecast_with, series_from_records, SeriesPoint, TimeLabel};
pub use smoothing::{
    holt_forecast, ses_forecast, smart_forecast, ForecastError, ForecastOptions, ForecastPoint,
    ForecastResult, Methodology, DEFAULT_MIN_POINTS,
};
pub use summary::forecast_summary;
pub use trend::detect_trend;
