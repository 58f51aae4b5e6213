//! Predictions and prediction intervals from a fitted model

use crate::distributions::t_inv;
use crate::linalg::quad_form;
use crate::ols::FittedModel;
use crate::options::validate_level;
use serde::{Deserialize, Serialize};
use trendline_core::{Dataset, TrendError};

/// Point predictions, one per row of `data`, in row order.
///
/// Every model feature must be a column of `data`; otherwise this fails with
/// `MISSING_FEATURE` naming exactly the absent features. A row with a missing
/// feature value predicts `None`.
pub fn predict(model: &FittedModel, data: &Dataset) -> Result<Vec<Option<f64>>, TrendError> {
    let columns = feature_columns(model, data)?;
    let coefficients = model.coefficients();

    Ok((0..data.len())
        .map(|row| {
            let mut y = model.intercept();
            for (coef, col) in coefficients.iter().zip(&columns) {
                y += coef * col[row]?;
            }
            Some(y)
        })
        .collect())
}

fn feature_columns<'a>(model: &FittedModel, data: &'a Dataset) -> Result<Vec<&'a [Option<f64>]>, TrendError> {
    data.require_columns(model.features())?;
    model.features().iter().map(|f| data.numeric(f)).collect()
}

/// Interval estimate for a single row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionEstimate {
    pub mean: f64,
    pub mean_se: f64,
    pub mean_ci_lower: f64,
    pub mean_ci_upper: f64,
    pub obs_ci_lower: f64,
    pub obs_ci_upper: f64,
}

/// One input row: its estimate and the feature values it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// `None` when a feature value is missing
    pub estimate: Option<PredictionEstimate>,
    /// Feature values in model order
    pub features: Vec<Option<f64>>,
}

/// Per-row prediction summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFrame {
    pub features: Vec<String>,
    pub confidence_level: f64,
    pub rows: Vec<PredictionRow>,
}

impl PredictionFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Point estimates in row order
    pub fn means(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.estimate.map(|e| e.mean)).collect()
    }
}

/// Prediction summary at the model's confidence level
pub fn prediction_frame(model: &FittedModel, data: &Dataset) -> Result<PredictionFrame, TrendError> {
    prediction_frame_at(model, data, model.confidence_level())
}

/// Prediction summary at an explicit confidence level.
///
/// The mean interval covers the regression line; the observation interval
/// also covers residual noise, so it always contains the mean interval.
pub fn prediction_frame_at(model: &FittedModel, data: &Dataset, level: f64) -> Result<PredictionFrame, TrendError> {
    validate_level(level)?;
    let columns = feature_columns(model, data)?;
    let cov = model.cov_params();
    let t_crit = t_inv(1.0 - (1.0 - level) / 2.0, model.df_resid() as f64)?;

    let rows = (0..data.len())
        .map(|row| {
            let features: Vec<Option<f64>> = columns.iter().map(|col| col[row]).collect();
            let estimate = features
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
                .map(|values| {
                    // constant first, same order as at fit time
                    let mut x0 = Vec::with_capacity(values.len() + 1);
                    x0.push(1.0);
                    x0.extend(values);

                    let mean: f64 = x0.iter().zip(model.params()).map(|(x, b)| x * b).sum();
                    let mean_var = quad_form(&x0, &cov).max(0.0);
                    let mean_se = mean_var.sqrt();
                    let obs_se = (mean_var + model.scale()).sqrt();

                    PredictionEstimate {
                        mean,
                        mean_se,
                        mean_ci_lower: mean - t_crit * mean_se,
                        mean_ci_upper: mean + t_crit * mean_se,
                        obs_ci_lower: mean - t_crit * obs_se,
                        obs_ci_upper: mean + t_crit * obs_se,
                    }
                });
            PredictionRow { estimate, features }
        })
        .collect();

    Ok(PredictionFrame {
        features: model.features().to_vec(),
        confidence_level: level,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ols::fit_ols;
    use crate::options::FitOptions;
    use trendline_core::codes;

    fn training() -> Dataset {
        Dataset::new()
            .with_values("x", &[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_values("y", &[2.0, 4.0, 5.0, 4.0, 5.0])
            .unwrap()
    }

    fn model() -> FittedModel {
        fit_ols(&training(), &["x"], "y", &FitOptions::default()).unwrap()
    }

    #[test]
    fn test_predict_reproduces_fitted_values() {
        let preds = predict(&model(), &training()).unwrap();
        let expected = [2.8, 3.4, 4.0, 4.6, 5.2];
        for (p, e) in preds.iter().zip(expected) {
            assert!((p.unwrap() - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_predict_missing_feature() {
        let data = Dataset::new().with_values("z", &[1.0]).unwrap();
        let err = predict(&model(), &data).unwrap_err();
        assert_eq!(err.code, codes::MISSING_FEATURE);
        assert_eq!(err.columns(), &["x".to_string()]);
    }

    #[test]
    fn test_predict_missing_value_row() {
        let data = Dataset::new()
            .with_numeric("x", vec![Some(0.0), None, Some(10.0)])
            .unwrap();
        let preds = predict(&model(), &data).unwrap();
        assert!((preds[0].unwrap() - 2.2).abs() < 1e-12);
        assert_eq!(preds[1], None);
        assert!((preds[2].unwrap() - 8.2).abs() < 1e-12);
    }

    #[test]
    fn test_predict_ignores_extra_columns() {
        let data = training().with_text("System", vec![Some("a"); 5]).unwrap();
        assert_eq!(predict(&model(), &data).unwrap().len(), 5);
    }

    #[test]
    fn test_frame_matches_predict() {
        let m = model();
        let frame = prediction_frame(&m, &training()).unwrap();
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.features, vec!["x".to_string()]);
        let preds = predict(&m, &training()).unwrap();
        for (a, b) in frame.means().iter().zip(&preds) {
            assert!((a.unwrap() - b.unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_frame_interval_values() {
        let m = model();
        let data = Dataset::new().with_values("x", &[3.0]).unwrap();
        let frame = prediction_frame(&m, &data).unwrap();
        let est = frame.rows[0].estimate.unwrap();
        // at the mean of x the mean se is sqrt(s² / n) = sqrt(0.8 / 5)
        assert!((est.mean - 4.0).abs() < 1e-12);
        assert!((est.mean_se - 0.16f64.sqrt()).abs() < 1e-12);
        let t = 3.182446305284263;
        assert!((est.mean_ci_upper - (4.0 + t * 0.4)).abs() < 1e-7);
        assert!((est.obs_ci_upper - (4.0 + t * 0.96f64.sqrt())).abs() < 1e-7);
        assert_eq!(frame.rows[0].features, vec![Some(3.0)]);
    }

    #[test]
    fn test_frame_bounds_nest() {
        let m = model();
        let data = Dataset::new()
            .with_numeric("x", vec![Some(-3.0), Some(2.5), None, Some(12.0)])
            .unwrap();
        let frame = prediction_frame(&m, &data).unwrap();
        assert!(frame.rows[2].estimate.is_none());
        assert_eq!(frame.rows[2].features, vec![None]);
        for row in frame.rows.iter().filter_map(|r| r.estimate) {
            assert!(row.obs_ci_lower < row.mean_ci_lower);
            assert!(row.mean_ci_lower < row.mean);
            assert!(row.mean < row.mean_ci_upper);
            assert!(row.mean_ci_upper < row.obs_ci_upper);
        }
    }

    #[test]
    fn test_frame_narrower_at_lower_level() {
        let m = model();
        let data = Dataset::new().with_values("x", &[4.0]).unwrap();
        let wide = prediction_frame_at(&m, &data, 0.99).unwrap().rows[0].estimate.unwrap();
        let narrow = prediction_frame_at(&m, &data, 0.8).unwrap().rows[0].estimate.unwrap();
        assert!(narrow.obs_ci_upper < wide.obs_ci_upper);
        assert!(prediction_frame_at(&m, &data, 1.5).is_err());
    }
}
