//! Least-squares plumbing over nalgebra
//!
//! Design matrices are `DMatrix<f64>` with the constant in column 0 followed
//! by the features in fit order.

use nalgebra::{DMatrix, DVector};
use trendline_core::TrendError;

/// Prepend the constant column
pub fn add_constant(features: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, cols) = features.shape();
    DMatrix::from_fn(rows, cols + 1, |i, j| if j == 0 { 1.0 } else { features[(i, j - 1)] })
}

/// Solution of an ordinary least-squares problem
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub params: DVector<f64>,
    pub rank: usize,
    /// (XᵀX)⁻¹
    pub normalized_cov: DMatrix<f64>,
}

/// Solve `x β ≈ y` by SVD.
///
/// Rank is judged against `max(σ) · max(n, p) · ε`; a rank-deficient design is
/// rejected instead of silently taking the minimum-norm solution.
pub fn lstsq(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares, TrendError> {
    let (n, p) = x.shape();
    if y.len() != n {
        return Err(TrendError::internal(format!(
            "lstsq: design has {} rows but target has {}",
            n,
            y.len()
        )));
    }
    if p == 0 || n < p {
        return Err(TrendError::insufficient_data(format!(
            "{} observation(s) for {} parameter(s)",
            n, p
        )));
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let tol = max_sv * (n.max(p) as f64) * f64::EPSILON;
    let rank = svd.singular_values.iter().filter(|&&s| s > tol).count();
    if rank < p {
        return Err(TrendError::singular_design(format!("rank {} < {} columns", rank, p)));
    }

    let params = svd
        .solve(y, tol)
        .map_err(|e| TrendError::internal(format!("least squares solution failed: {}", e)))?;

    let xtx = x.transpose() * x;
    let normalized_cov = xtx
        .try_inverse()
        .ok_or_else(|| TrendError::singular_design("XᵀX is not invertible"))?;

    Ok(LeastSquares {
        params,
        rank,
        normalized_cov,
    })
}

/// Quadratic form xᵀ A x for a row of a design matrix
pub fn quad_form(row: &[f64], a: &DMatrix<f64>) -> f64 {
    let v = DVector::from_column_slice(row);
    (v.transpose() * a * &v)[(0, 0)]
}
