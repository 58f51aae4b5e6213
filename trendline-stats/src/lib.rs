//! Trendline Statistics - Trend models and slope tests
//!
//! Provides the statistical engine for Trendline:
//! - Ordinary least squares with intercept (`fit_ols`, `fit_design`)
//! - Point predictions and mean/observation intervals (`predict`, `prediction_frame`)
//! - Growth-rate summaries for log10 trends (`GrowthReport`, `print_growth_rates`)
//! - Two-sample slope comparison corrected for shared entities (`compare_slopes`)
//!
//! All computation is f64. Every fallible operation returns `TrendError`.

mod compare;
mod growth;
mod helpers;
mod linalg;
mod ols;
mod options;
mod predict;

pub mod distributions;

pub use compare::{compare_slopes, regression_slope_t_test, SlopeComparison};
pub use growth::{ooms_to_doubling_time_months, ooms_to_factor_per_year, print_growth_rates, GrowthReport};
pub use helpers::pearson;
pub use ols::{fit_design, fit_ols, FittedModel, INTERCEPT};
pub use options::{ComparisonOptions, FitOptions, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_ENTITY_COLUMN};
pub use predict::{predict, prediction_frame, prediction_frame_at, PredictionEstimate, PredictionFrame, PredictionRow};
