//! Additive Holt-Winters for quick projections over a bare value series.

use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HoltWintersFit {
    /// One-step-ahead fit for every input value, seed included.
    pub fitted: Vec<f64>,
    pub forecast: Vec<f64>,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Level + trend + additive seasonal smoothing with `season` slots.
///
/// Seasonal slots start at zero and learn as the series is walked, so the first season is
/// fitted as plain Holt. `season == 0` disables seasonality entirely. Empty input gives an
/// empty fit.
pub fn holt_winters_additive(
    values: &[f64],
    season: usize,
    alpha: f64,
    beta: f64,
    gamma: f64,
    periods: usize,
) -> HoltWintersFit {
    let mut fit = HoltWintersFit {
        alpha,
        beta,
        gamma,
        ..HoltWintersFit::default()
    };
    let Some(&first) = values.first() else {
        return fit;
    };

    let mut level = first;
    let mut trend = values.get(1).map_or(0.0, |second| second - first);
    let mut seasonals = vec![0.0; season];
    let slot = |i: usize| if season > 0 { Some(i % season) } else { None };

    fit.fitted.reserve(values.len());
    for (i, &y) in values.iter().enumerate() {
        let s = slot(i).map_or(0.0, |k| seasonals[k]);
        fit.fitted.push(level + trend + s);

        let prev_level = level;
        level = alpha * (y - s) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        if let Some(k) = slot(i) {
            seasonals[k] = gamma * (y - level) + (1.0 - gamma) * s;
        }
    }

    let n = values.len();
    fit.forecast = (1..=periods)
        .map(|h| {
            let s = slot(n + h - 1).map_or(0.0, |k| seasonals[k]);
            level + h as f64 * trend + s
        })
        .collect();
    fit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_gives_empty_fit() {
        let fit = holt_winters_additive(&[], 4, 0.3, 0.1, 0.1, 6);
        assert!(fit.fitted.is_empty());
        assert!(fit.forecast.is_empty());
        assert_eq!(fit.alpha, 0.3);
    }

    #[test]
    fn no_season_tracks_a_line() {
        let ys: Vec<f64> = (0..12).map(|i| 3.0 * i as f64).collect();
        let fit = holt_winters_additive(&ys, 0, 0.3, 0.1, 0.1, 3);
        assert_eq!(fit.fitted.len(), 12);
        // The seed step overshoots, then the fit settles back onto the line.
        for (h, value) in fit.forecast.iter().enumerate() {
            let expected = 3.0 * (12 + h) as f64;
            assert!((value - expected).abs() < 1.0, "h={h} value={value}");
        }
        assert!(fit.forecast.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn seasonal_pattern_shows_up_in_the_forecast() {
        let pattern = [10.0, 20.0, 30.0, 20.0];
        let ys: Vec<f64> = pattern.iter().cycle().take(40).copied().collect();
        let fit = holt_winters_additive(&ys, 4, 0.3, 0.05, 0.5, 4);
        let peak = fit
            .forecast
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        // The next cycle starts at slot 0, so its peak is the third projected point.
        assert_eq!(peak, Some(2));
    }

    #[test]
    fn single_value_has_no_trend() {
        let fit = holt_winters_additive(&[5.0], 0, 0.3, 0.1, 0.1, 2);
        assert_eq!(fit.fitted, vec![5.0]);
        assert_eq!(fit.forecast, vec![5.0, 5.0]);
    }
}
