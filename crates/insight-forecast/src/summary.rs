use crate::smoothing::ForecastResult;

/// One-sentence, business-facing description of a forecast.
pub fn forecast_summary(result: &ForecastResult, metric_name: &str) -> String {
    let (Some(first), Some(last)) = (result.forecast.first(), result.forecast.last()) else {
        return format!("{metric_name} forecast has no projected periods");
    };

    let direction = if last.y > first.y {
        "an increasing"
    } else if last.y < first.y {
        "a decreasing"
    } else {
        "a flat"
    };
    let level = if result.confidence > 70.0 {
        "high"
    } else if result.confidence > 50.0 {
        "moderate"
    } else {
        "low"
    };

    format!(
        "{metric_name} forecast shows {direction} trend with {level} confidence \
         ({:.0}% confidence, {:.0}% fit accuracy) using {}",
        result.confidence, result.accuracy, result.methodology
    )
}
