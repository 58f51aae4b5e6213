//! Trendline - Log-linear trends for compute-scaling data
//!
//! Fits `log10(target) ~ year`-style trends to tables of systems, reports
//! them as growth rates and tests whether two trends differ, correcting for
//! systems that appear in both datasets.
//!
//! ```ignore
//! use trendline::prelude::*;
//!
//! let opts = ComparisonOptions::new().with_log_target(true);
//! let result = compare_slopes(&frontier, &all_systems, &["year"], "compute", &opts)?;
//! println!("{}", result);
//! ```

mod render;

pub use render::{to_json, NumberFormat, Renderer};

pub use trendline_core::{codes, Column, Dataset, DatasetError, ErrorContext, Severity, TrendError};
pub use trendline_stats::{
    compare_slopes, fit_design, fit_ols, ooms_to_doubling_time_months, ooms_to_factor_per_year, predict,
    prediction_frame, prediction_frame_at, print_growth_rates, regression_slope_t_test, ComparisonOptions,
    FitOptions, FittedModel, GrowthReport, PredictionEstimate, PredictionFrame, PredictionRow, SlopeComparison,
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_ENTITY_COLUMN, INTERCEPT,
};

/// Student's t distribution
pub use trendline_stats::distributions;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        compare_slopes, fit_ols, predict, prediction_frame, print_growth_rates, regression_slope_t_test,
        ComparisonOptions, Dataset, FitOptions, FittedModel, GrowthReport, PredictionFrame, Renderer,
        SlopeComparison, TrendError,
    };
}
