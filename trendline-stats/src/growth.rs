//! Growth-rate reporting for log10 trend models
//!
//! A slope in log10 units per year is an order-of-magnitude (OOM) growth
//! rate. It converts to a multiplicative factor per year and to a doubling
//! time. The doubling-time transform is decreasing in the slope, so the
//! interval bounds swap: the upper slope bound gives the lower doubling time.

use crate::ols::FittedModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use trendline_core::TrendError;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Multiplicative growth per year for a rate in OOMs/year
pub fn ooms_to_factor_per_year(ooms: f64) -> f64 {
    10f64.powf(ooms)
}

/// Doubling time in months for a rate in OOMs/year
pub fn ooms_to_doubling_time_months(ooms: f64) -> f64 {
    MONTHS_PER_YEAR * std::f64::consts::LOG10_2 / ooms
}

/// Growth summary of the first feature of a log10 model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    pub adj_r_squared: f64,
    pub confidence_level: f64,
    /// OOMs per year
    pub slope: f64,
    pub slope_ci: (f64, f64),
    pub factor_per_year: f64,
    pub factor_ci: (f64, f64),
    pub doubling_time_months: f64,
    /// (at upper slope bound, at lower slope bound)
    pub doubling_time_ci: (f64, f64),
}

impl GrowthReport {
    pub fn from_model(model: &FittedModel) -> Result<Self, TrendError> {
        if model.features().is_empty() {
            return Err(TrendError::domain_error("growth report needs a time feature"));
        }

        let slope = model.slope();
        let (lo, hi) = model.slope_conf_int();

        Ok(Self {
            adj_r_squared: model.adj_r_squared(),
            confidence_level: model.confidence_level(),
            slope,
            slope_ci: (lo, hi),
            factor_per_year: ooms_to_factor_per_year(slope),
            factor_ci: (ooms_to_factor_per_year(lo), ooms_to_factor_per_year(hi)),
            doubling_time_months: ooms_to_doubling_time_months(slope),
            doubling_time_ci: (ooms_to_doubling_time_months(hi), ooms_to_doubling_time_months(lo)),
        })
    }
}

/// "95" for 0.95, "97.5" for 0.975
pub(crate) fn level_label(level: f64) -> String {
    let pct = (level * 100.0 * 1000.0).round() / 1000.0;
    format!("{}", pct)
}

impl fmt::Display for GrowthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = level_label(self.confidence_level);
        writeln!(f, "Adj. R^2={:.2}", self.adj_r_squared)?;
        writeln!(
            f,
            "{:.2} OOMs/year ({}% CI: {:.2}, {:.2})",
            self.slope, level, self.slope_ci.0, self.slope_ci.1
        )?;
        writeln!(
            f,
            "{:.1}x/year ({}% CI: {:.1}x, {:.1}x)",
            self.factor_per_year, level, self.factor_ci.0, self.factor_ci.1
        )?;
        write!(
            f,
            "doubling time of {:.0} months ({}% CI: {:.0}, {:.0})",
            self.doubling_time_months, level, self.doubling_time_ci.0, self.doubling_time_ci.1
        )
    }
}

/// Print the growth summary of `model` to stdout
pub fn print_growth_rates(model: &FittedModel) -> Result<(), TrendError> {
    let report = GrowthReport::from_model(model)?;
    println!("{}", report);
    Ok(())
}
