use crate::smoothing::ForecastOptions;

/// Whether `values` drift enough to warrant a trend-aware forecaster.
///
/// Fits an ordinary least-squares line against the index and reports a trend when
/// `|slope| > trend_threshold * |mean|`. Non-finite values are dropped first; fewer than
/// `min_points` remaining values never count as a trend.
pub fn detect_trend(values: &[f64], options: &ForecastOptions) -> bool {
    let ys: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = ys.len();
    if n < options.min_points.max(2) {
        return false;
    }

    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / (nf * sum_x2 - sum_x * sum_x);
    let mean = sum_y / nf;
    let threshold = (mean * options.trend_threshold).abs();
    let trending = slope.abs() > threshold;

    log::debug!(
        "trend detection: slope={slope:.4} mean={mean:.2} threshold={threshold:.4} trending={trending}"
    );
    trending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_growth_is_a_trend() {
        let ys: Vec<f64> = (0..10).map(|i| 10.0 + 5.0 * i as f64).collect();
        assert!(detect_trend(&ys, &ForecastOptions::default()));
        let falling: Vec<f64> = ys.iter().rev().copied().collect();
        assert!(detect_trend(&falling, &ForecastOptions::default()));
    }

    #[test]
    fn flat_and_noisy_series_are_not() {
        assert!(!detect_trend(&[100.0; 12], &ForecastOptions::default()));
        let zigzag = [100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0, 101.0, 99.0, 100.0];
        assert!(!detect_trend(&zigzag, &ForecastOptions::default()));
    }

    #[test]
    fn short_series_never_trend() {
        let ys: Vec<f64> = (0..7).map(|i| i as f64 * 100.0).collect();
        assert!(!detect_trend(&ys, &ForecastOptions::default()));

        let mut padded = ys.clone();
        padded.push(f64::NAN);
        assert!(!detect_trend(&padded, &ForecastOptions::default()));
    }
}
