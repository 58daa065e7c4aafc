use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use insight_forecast::ForecastOptions;
use insight_infer::{InferenceOptions, RoleOptions, ScoringOptions};
use insight_model::import::CsvOptions;
use serde::Deserialize;

/// Tuning knobs loaded from `--config`. Every section and field is optional.
///
/// ```json
/// {
///   "inference": { "footer_blank_run_length": 2 },
///   "roles": { "id_pattern": "(?i)^(id|sku)$" },
///   "scoring": { "numeric_ratio": 0.5 },
///   "forecast": { "alpha": 0.5 },
///   "csv": { "delimiter": 59, "decimal_separator": "," }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub inference: InferenceOptions,
    pub roles: RoleOptions,
    pub scoring: ScoringOptions,
    pub forecast: ForecastOptions,
    /// Overrides the delimited-text defaults (which otherwise follow the file extension).
    pub csv: Option<CsvOptions>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }
}
