//! Ordinary least squares: fit_ols, fit_design
//!
//! A model is "target ~ intercept + features" where the features are an
//! explicit ordered list. That order is stored on the fitted model and every
//! design matrix built later (prediction, intervals, comparison) follows it.

use crate::distributions::t_inv;
use crate::helpers::sum_sq_dev;
use crate::linalg::{add_constant, lstsq};
use crate::options::FitOptions;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trendline_core::{Dataset, TrendError};

/// Name of the constant term in `FittedModel::terms`
pub const INTERCEPT: &str = "Intercept";

/// Result of an OLS fit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    features: Vec<String>,
    target: String,
    log_target: bool,
    /// Intercept first, then one coefficient per feature
    params: Vec<f64>,
    std_errors: Vec<f64>,
    conf_int: Vec<(f64, f64)>,
    confidence_level: f64,
    r_squared: f64,
    adj_r_squared: f64,
    nobs: usize,
    df_resid: usize,
    /// Residual variance s² = SSR / df_resid
    scale: f64,
    /// Row-major parameter covariance s² (XᵀX)⁻¹
    cov_params: Vec<Vec<f64>>,
}

impl FittedModel {
    /// Feature names in fit order
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the target was regressed in log10 units
    pub fn log_target(&self) -> bool {
        self.log_target
    }

    /// Term names aligned with `params`: "Intercept" then the features
    pub fn terms(&self) -> Vec<&str> {
        std::iter::once(INTERCEPT)
            .chain(self.features.iter().map(String::as_str))
            .collect()
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn intercept(&self) -> f64 {
        self.params[0]
    }

    /// Feature coefficients in fit order
    pub fn coefficients(&self) -> &[f64] {
        &self.params[1..]
    }

    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.feature_index(feature).map(|i| self.params[i])
    }

    /// Standard errors aligned with `params`
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Confidence intervals aligned with `params`
    pub fn conf_int(&self) -> &[(f64, f64)] {
        &self.conf_int
    }

    /// Coefficient on the first feature
    pub fn slope(&self) -> f64 {
        self.params[1]
    }

    pub fn slope_std_error(&self) -> f64 {
        self.std_errors[1]
    }

    pub fn slope_conf_int(&self) -> (f64, f64) {
        self.conf_int[1]
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn adj_r_squared(&self) -> f64 {
        self.adj_r_squared
    }

    /// Number of observations used in the fit
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn df_resid(&self) -> usize {
        self.df_resid
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn cov_params(&self) -> DMatrix<f64> {
        let p = self.params.len();
        DMatrix::from_fn(p, p, |i, j| self.cov_params[i][j])
    }

    /// Predictions for a design matrix that already carries the constant column
    pub fn predict_design(&self, x: &DMatrix<f64>) -> Result<DVector<f64>, TrendError> {
        if x.ncols() != self.params.len() {
            return Err(TrendError::internal(format!(
                "design has {} columns, model has {} parameters",
                x.ncols(),
                self.params.len()
            )));
        }
        Ok(x * DVector::from_column_slice(&self.params))
    }

    fn feature_index(&self, feature: &str) -> Option<usize> {
        self.features.iter().position(|f| f == feature).map(|i| i + 1)
    }
}

/// Design matrix and target of one dataset, after filtering and transforms
#[derive(Debug, Clone)]
pub(crate) struct Sample {
    pub data: Dataset,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
}

/// Validate columns, drop incomplete rows, build the design matrix with the
/// constant and the (optionally log10) target.
pub(crate) fn prepare_sample<S: AsRef<str>>(
    data: &Dataset,
    features: &[S],
    target: &str,
    log_target: bool,
) -> Result<Sample, TrendError> {
    if features.is_empty() {
        return Err(TrendError::domain_error("at least one feature is required"));
    }

    let mut required: Vec<&str> = features.iter().map(|f| f.as_ref()).collect();
    required.push(target);
    data.require_columns(&required)?;
    for name in &required {
        data.numeric(name)?;
    }

    let clean = data.drop_missing(&required)?;
    let x = add_constant(&feature_matrix(&clean, features)?);
    let mut y = column_vector(&clean, target)?;
    if log_target {
        log10_in_place(&mut y, target)?;
    }

    Ok(Sample { data: clean, x, y })
}

/// Features of a fully observed dataset as an n×k matrix
pub(crate) fn feature_matrix<S: AsRef<str>>(data: &Dataset, features: &[S]) -> Result<DMatrix<f64>, TrendError> {
    let mut x = DMatrix::zeros(data.len(), features.len());
    for (j, name) in features.iter().enumerate() {
        let col = column_vector(data, name.as_ref())?;
        x.set_column(j, &col);
    }
    Ok(x)
}

fn column_vector(data: &Dataset, name: &str) -> Result<DVector<f64>, TrendError> {
    let cells = data.numeric(name)?;
    let values = cells
        .iter()
        .map(|c| c.ok_or_else(|| TrendError::internal(format!("missing value left in '{}'", name))))
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(DVector::from_vec(values))
}

/// Replace values by their base-10 logarithm, rejecting non-positive input
pub(crate) fn log10_in_place(values: &mut DVector<f64>, column: &str) -> Result<(), TrendError> {
    let non_positive = values.iter().filter(|v| !(**v > 0.0)).count();
    if non_positive > 0 {
        return Err(TrendError::invalid_transform(column, non_positive));
    }
    for v in values.iter_mut() {
        *v = v.log10();
    }
    Ok(())
}

/// Fit `target ~ features` with an intercept by ordinary least squares.
///
/// Rows with a missing feature or target are dropped first. With
/// `options.log_target` the target is replaced by its base-10 logarithm.
pub fn fit_ols<S: AsRef<str>>(
    data: &Dataset,
    features: &[S],
    target: &str,
    options: &FitOptions,
) -> Result<FittedModel, TrendError> {
    options.validate()?;
    let sample = prepare_sample(data, features, target, options.log_target)?;
    fit_design(&sample.x, &sample.y, features, target, options)
}

/// Fit a prebuilt design matrix whose column 0 is the constant.
pub fn fit_design<S: AsRef<str>>(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    features: &[S],
    target: &str,
    options: &FitOptions,
) -> Result<FittedModel, TrendError> {
    options.validate()?;
    if features.is_empty() {
        return Err(TrendError::domain_error("at least one feature is required"));
    }
    let (n, p) = x.shape();
    if p != features.len() + 1 {
        return Err(TrendError::internal(format!(
            "design has {} columns for {} feature(s) plus intercept",
            p,
            features.len()
        )));
    }
    if n <= p {
        return Err(TrendError::insufficient_data(format!(
            "{} complete row(s) for {} parameter(s); need at least {}",
            n,
            p,
            p + 1
        )));
    }

    let ls = lstsq(x, y)?;
    let fitted = x * &ls.params;
    let resid = y - fitted;
    let ssr = resid.norm_squared();
    let df_resid = n - p;
    let scale = ssr / df_resid as f64;

    let cov = &ls.normalized_cov * scale;
    let std_errors: Vec<f64> = (0..p).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();

    let alpha = 1.0 - options.confidence_level;
    let t_crit = t_inv(1.0 - alpha / 2.0, df_resid as f64)?;
    let params: Vec<f64> = ls.params.iter().copied().collect();
    let conf_int = params
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| (b - t_crit * se, b + t_crit * se))
        .collect();

    let sst = sum_sq_dev(y.as_slice());
    let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - ssr / sst };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_resid as f64;

    debug!(
        column = target,
        nobs = n,
        params = p,
        r_squared,
        "fitted OLS model"
    );

    Ok(FittedModel {
        features: features.iter().map(|f| f.as_ref().to_string()).collect(),
        target: target.to_string(),
        log_target: options.log_target,
        params,
        std_errors,
        conf_int,
        confidence_level: options.confidence_level,
        r_squared,
        adj_r_squared,
        nobs: n,
        df_resid,
        scale,
        cov_params: (0..p).map(|i| (0..p).map(|j| cov[(i, j)]).collect()).collect(),
    })
}
