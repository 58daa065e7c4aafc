use insight_forecast::{
    holt_forecast, ses_forecast, smart_forecast, ForecastOptions, ForecastResult, SeriesPoint,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

const CASES: u32 = 256;

fn series() -> impl Strategy<Value = Vec<SeriesPoint>> {
    prop::collection::vec(-1.0e6f64..1.0e6, 8..60).prop_map(|ys| {
        ys.into_iter()
            .enumerate()
            .map(|(i, y)| SeriesPoint::new(i as f64, y))
            .collect()
    })
}

fn check_bounds(result: &ForecastResult, horizon: usize) -> Result<(), TestCaseError> {
    prop_assert!((0.0..=100.0).contains(&result.confidence), "confidence {}", result.confidence);
    prop_assert!((0.0..=100.0).contains(&result.accuracy), "accuracy {}", result.accuracy);
    prop_assert_eq!(result.forecast.len(), horizon);
    for point in &result.forecast {
        prop_assert!(point.lower_bound <= point.y);
        prop_assert!(point.y <= point.upper_bound);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: CASES,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn scores_stay_in_percent_range(points in series(), horizon in 0usize..12) {
        let options = ForecastOptions::default();
        check_bounds(&ses_forecast(&points, horizon, &options).unwrap(), horizon)?;
        check_bounds(&holt_forecast(&points, horizon, &options).unwrap(), horizon)?;
        check_bounds(&smart_forecast(&points, horizon, &options).unwrap(), horizon)?;
    }

    #[test]
    fn fitted_covers_every_input(points in series()) {
        let result = smart_forecast(&points, 1, &ForecastOptions::default()).unwrap();
        prop_assert_eq!(result.fitted.len(), points.len());
        prop_assert_eq!(result.fitted[0], points[0].y);
    }
}
