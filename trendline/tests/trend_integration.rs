//! Integration tests for trendline

use trendline::distributions::two_sided_p_value;
use trendline::prelude::*;
use trendline::{codes, prediction_frame_at};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Frontier systems: fast growth, 0.6 OOMs/year
fn frontier() -> Dataset {
    let names = ["F0", "F1", "F2", "F3", "S0", "S1", "S2", "F4", "F5", "F6"];
    let years = [2012.0, 2013.0, 2014.0, 2015.0, 2016.0, 2017.0, 2018.0, 2019.0, 2020.0, 2021.0];
    let noise = [0.08, -0.11, 0.04, 0.02, -0.06, 0.09, -0.03, 0.05, -0.07, -0.01];
    build(&names, &years, &noise, 0.6, 17.0)
}

/// Broader population: slower growth, shares S0..S2 with the frontier
fn population() -> Dataset {
    let names = ["P0", "P1", "S0", "S1", "P2", "S2", "P3", "P4", "P5", "P6", "P7", "P8"];
    let years = [
        2012.0, 2013.0, 2016.0, 2017.0, 2015.0, 2018.0, 2016.0, 2017.0, 2019.0, 2020.0, 2021.0, 2014.0,
    ];
    let noise = [0.12, -0.09, -0.02, 0.10, 0.03, -0.05, -0.08, 0.06, 0.01, -0.04, 0.07, -0.11];
    build(&names, &years, &noise, 0.4, 16.0)
}

fn build(names: &[&str], years: &[f64], noise: &[f64], slope: f64, base: f64) -> Dataset {
    let compute: Vec<f64> = years
        .iter()
        .zip(noise)
        .map(|(y, e)| 10f64.powf(base + slope * (y - 2012.0) + e))
        .collect();
    Dataset::new()
        .with_text("System", names.iter().map(|n| Some(*n)))
        .unwrap()
        .with_values("year", years)
        .unwrap()
        .with_values("compute", &compute)
        .unwrap()
}

#[test]
fn test_fit_and_growth_report() {
    init_tracing();
    let model = fit_ols(&frontier(), &["year"], "compute", &FitOptions::new().with_log_target(true)).unwrap();

    assert!((model.slope() - 0.6).abs() < 0.05);
    assert!(model.r_squared() > 0.95);
    assert_eq!(model.nobs(), 10);

    let report = GrowthReport::from_model(&model).unwrap();
    let (lo, hi) = report.doubling_time_ci;
    assert!(lo < report.doubling_time_months && report.doubling_time_months < hi);
    // 0.6 OOMs/year doubles in about six months
    assert!((report.doubling_time_months - 6.0).abs() < 1.0);
    assert!(print_growth_rates(&model).is_ok());
}

#[test]
fn test_prediction_grid() {
    init_tracing();
    let model = fit_ols(&frontier(), &["year"], "compute", &FitOptions::new().with_log_target(true)).unwrap();
    let grid = Dataset::new()
        .with_values("year", &[2012.0, 2022.0, 2030.0])
        .unwrap();

    let points = predict(&model, &grid).unwrap();
    let frame = prediction_frame(&model, &grid).unwrap();
    assert_eq!(frame.len(), 3);
    for (point, row) in points.iter().zip(&frame.rows) {
        let est = row.estimate.unwrap();
        assert!((point.unwrap() - est.mean).abs() < 1e-9);
        assert!(est.obs_ci_lower < est.mean_ci_lower);
        assert!(est.mean_ci_upper < est.obs_ci_upper);
    }

    // extrapolating further out widens the mean interval
    let near = frame.rows[1].estimate.unwrap();
    let far = frame.rows[2].estimate.unwrap();
    assert!(far.mean_se > near.mean_se);

    let narrow = prediction_frame_at(&model, &grid, 0.8).unwrap();
    let narrow_far = narrow.rows[2].estimate.unwrap();
    assert!(narrow_far.obs_ci_upper - narrow_far.obs_ci_lower < far.obs_ci_upper - far.obs_ci_lower);
}

#[test]
fn test_compare_frontier_with_population() {
    init_tracing();
    let opts = ComparisonOptions::new().with_log_target(true);
    let result = regression_slope_t_test(&frontier(), &population(), &["year"], "compute", &opts).unwrap();

    assert_eq!(result.common_rows, 3);
    assert_eq!(result.df, 18);
    assert!(result.warnings.is_empty());
    assert!(result.slope1 > result.slope2);
    assert!(result.t_statistic > 0.0);
    assert!((result.p_value - two_sided_p_value(result.t_statistic, 18.0)).abs() < 1e-15);
    assert!(result.is_significant(0.05));

    let reversed = compare_slopes(&population(), &frontier(), &["year"], "compute", &opts).unwrap();
    assert!((reversed.t_statistic + result.t_statistic).abs() < 1e-9);
}

#[test]
fn test_compare_raw_target() {
    init_tracing();
    let opts = ComparisonOptions::new();
    let result = compare_slopes(&frontier(), &population(), &["year"], "compute", &opts).unwrap();
    assert!(result.t_statistic.is_finite());
}

#[test]
fn test_compare_errors_carry_dataset() {
    init_tracing();
    let broken = Dataset::new()
        .with_text("System", vec![Some("X"), Some("Y"), Some("Z")])
        .unwrap()
        .with_values("year", &[2012.0, 2013.0, 2014.0])
        .unwrap();
    let opts = ComparisonOptions::new().with_log_target(true);
    let err = compare_slopes(&frontier(), &broken, &["year"], "compute", &opts).unwrap_err();

    assert_eq!(err.code, codes::MISSING_FEATURE);
    assert_eq!(err.columns(), &["compute".to_string()]);
    assert_eq!(err.context.as_ref().unwrap().dataset.as_deref(), Some("data2"));
}

#[test]
fn test_render_and_json() {
    init_tracing();
    let opts = ComparisonOptions::new().with_log_target(true);
    let result = compare_slopes(&frontier(), &population(), &["year"], "compute", &opts).unwrap();

    let md = Renderer::new().render_comparison(&result);
    assert!(md.contains("| common rows | 3 |"));

    let json = trendline::to_json(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["df"], 18);
    assert!(value.get("warnings").is_none());
}
