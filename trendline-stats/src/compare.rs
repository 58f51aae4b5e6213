//! Two-sample comparison of regression slopes
//!
//! Two trends fitted on different datasets are compared with
//!
//! ```text
//! t = (b₁ − b₂) / sqrt(SE₁² + SE₂² − 2·SE₁·SE₂·ρ),   df = (n₁ − 2) + (n₂ − 2)
//! ```
//!
//! When the datasets share entities their residuals are not independent.
//! ρ is the correlation of the two models' residuals over the shared rows
//! and is applied to the standard errors of the full fits. With no shared
//! rows ρ = 0 and the statistic is the ordinary uncorrelated one.

use crate::distributions::two_sided_p_value;
use crate::helpers::pearson;
use crate::ols::{fit_design, prepare_sample, FittedModel, Sample};
use crate::options::ComparisonOptions;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};
use trendline_core::{Dataset, TrendError};

/// Relative size below which the slope-difference variance counts as zero
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Outcome of a slope comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeComparison {
    pub slope1: f64,
    pub std_error1: f64,
    pub slope2: f64,
    pub std_error2: f64,
    /// Residual correlation on the common subset (0 when not adjusted)
    pub correlation: f64,
    /// Entities paired across the two datasets
    pub common_rows: usize,
    pub nobs1: usize,
    pub nobs2: usize,
    pub t_statistic: f64,
    pub df: usize,
    pub p_value: f64,
    /// Non-fatal conditions met on the way
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TrendError>,
}

impl SlopeComparison {
    /// Whether the slopes differ at significance level `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for SlopeComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Slope 1: {:.2} (SE: {:.2})", self.slope1, self.std_error1)?;
        writeln!(f, "Slope 2: {:.2} (SE: {:.2})", self.slope2, self.std_error2)?;
        writeln!(f, "Correlation of residuals: {:.2}", self.correlation)?;
        writeln!(f, "Test statistic: {:.2}", self.t_statistic)?;
        write!(f, "p-value: {:.2}", self.p_value)
    }
}

/// Row pairs (dataset-1 row, dataset-2 row), one per shared entity
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CommonSubset {
    pub rows1: Vec<usize>,
    pub rows2: Vec<usize>,
}

impl CommonSubset {
    pub fn len(&self) -> usize {
        self.rows1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows1.is_empty()
    }
}

/// One row pair per entity present in both datasets: the first `data1` row
/// and the first `data2` row carrying it, in `data1` order. Later duplicates
/// are ignored on both sides. Missing entity ids never match.
pub(crate) fn common_subset(data1: &Dataset, data2: &Dataset, entity: &str) -> Result<CommonSubset, TrendError> {
    let col1 = data1
        .column(entity)
        .ok_or_else(|| TrendError::missing_feature(&[entity]).in_dataset("data1"))?;
    let col2 = data2
        .column(entity)
        .ok_or_else(|| TrendError::missing_feature(&[entity]).in_dataset("data2"))?;

    let mut first_in_2: HashMap<String, usize> = HashMap::new();
    for row in 0..data2.len() {
        if let Some(key) = col2.key(row) {
            first_in_2.entry(key).or_insert(row);
        }
    }

    let mut subset = CommonSubset::default();
    let mut seen: HashSet<String> = HashSet::new();
    for row in 0..data1.len() {
        let Some(key) = col1.key(row) else { continue };
        if let Some(&other) = first_in_2.get(&key) {
            if seen.insert(key) {
                subset.rows1.push(row);
                subset.rows2.push(other);
            }
        }
    }
    Ok(subset)
}

fn prepare(data: &Dataset, features: &[&str], target: &str, log: bool, label: &str) -> Result<Sample, TrendError> {
    prepare_sample(data, features, target, log).map_err(|e| e.in_dataset(label))
}

/// Residual correlation over the common subset, with any warning it raised
fn residual_correlation(
    subset: &CommonSubset,
    sample1: &Sample,
    sample2: &Sample,
    model1: &FittedModel,
    model2: &FittedModel,
    options: &ComparisonOptions,
) -> Result<(f64, Option<TrendError>), TrendError> {
    if subset.is_empty() {
        warn!(entity = %options.entity_column, "no common entities; residual correlation set to 0");
        return Ok((0.0, Some(TrendError::empty_common_subset(&options.entity_column))));
    }
    if !options.adjust_correlation {
        return Ok((0.0, None));
    }

    // Design rows come from dataset 1; targets were transformed with their samples.
    let x12 = sample1.x.select_rows(subset.rows1.iter());
    let y1_common = sample1.y.select_rows(subset.rows1.iter());
    let y2_common = sample2.y.select_rows(subset.rows2.iter());

    let residuals1 = y1_common - model1.predict_design(&x12)?;
    let residuals2 = y2_common - model2.predict_design(&x12)?;

    match pearson(residuals1.as_slice(), residuals2.as_slice()) {
        Some(rho) => Ok((rho, None)),
        None => {
            warn!(pairs = subset.len(), "residual correlation undefined; set to 0");
            Ok((0.0, Some(TrendError::undefined_correlation(subset.len()))))
        }
    }
}

/// Compare the slope on the first feature between two datasets.
///
/// Each dataset is filtered and fitted independently. Entities
/// (`options.entity_column`) present in both datasets form the common
/// subset used for the residual correlation, one row pair per entity, so
/// swapping the datasets only flips the sign of the statistic.
pub fn compare_slopes<S: AsRef<str>>(
    data1: &Dataset,
    data2: &Dataset,
    features: &[S],
    target: &str,
    options: &ComparisonOptions,
) -> Result<SlopeComparison, TrendError> {
    options.validate()?;
    let features: Vec<&str> = features.iter().map(|f| f.as_ref()).collect();
    let entity = options.entity_column.as_str();

    let sample1 = prepare(data1, &features, target, options.log_target, "data1")?;
    let sample2 = prepare(data2, &features, target, options.log_target, "data2")?;
    let subset = common_subset(&sample1.data, &sample2.data, entity)?;
    debug!(
        nobs1 = sample1.data.len(),
        nobs2 = sample2.data.len(),
        common = subset.len(),
        "prepared slope comparison"
    );

    let fit_options = options.fit_options();
    let model1 = fit_design(&sample1.x, &sample1.y, &features, target, &fit_options)
        .map_err(|e| e.in_dataset("data1"))?;
    let model2 = fit_design(&sample2.x, &sample2.y, &features, target, &fit_options)
        .map_err(|e| e.in_dataset("data2"))?;

    let (b1, se1) = (model1.slope(), model1.slope_std_error());
    let (b2, se2) = (model2.slope(), model2.slope_std_error());

    let (rho, warning) = residual_correlation(&subset, &sample1, &sample2, &model1, &model2, options)?;

    let scale = se1 * se1 + se2 * se2;
    let variance = scale - 2.0 * se1 * se2 * rho;
    if !variance.is_finite() || variance <= DEGENERATE_TOLERANCE * scale {
        return Err(TrendError::degenerate_variance(variance));
    }
    let t_statistic = (b1 - b2) / variance.sqrt();

    let (n1, n2) = (model1.nobs(), model2.nobs());
    let df = (n1 + n2)
        .checked_sub(4)
        .filter(|&df| df > 0)
        .ok_or_else(|| TrendError::insufficient_data(format!("{} + {} rows leave no degrees of freedom", n1, n2)))?;
    let p_value = two_sided_p_value(t_statistic, df as f64);

    debug!(t = t_statistic, df, p = p_value, rho, "compared slopes");

    Ok(SlopeComparison {
        slope1: b1,
        std_error1: se1,
        slope2: b2,
        std_error2: se2,
        correlation: rho,
        common_rows: subset.len(),
        nobs1: n1,
        nobs2: n2,
        t_statistic,
        df,
        p_value,
        warnings: warning.into_iter().collect(),
    })
}

/// Compare slopes and print the report to stdout
pub fn regression_slope_t_test<S: AsRef<str>>(
    data1: &Dataset,
    data2: &Dataset,
    features: &[S],
    target: &str,
    options: &ComparisonOptions,
) -> Result<SlopeComparison, TrendError> {
    let result = compare_slopes(data1, data2, features, target, options)?;
    println!("{}", result);
    Ok(result)
}
