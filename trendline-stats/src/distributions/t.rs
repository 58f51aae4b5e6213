//! Student's t distribution functions

use trendline_core::TrendError;

/// Student's t probability density
pub fn t_pdf(x: f64, df: f64) -> f64 {
    // PDF(x) = Γ((ν+1)/2) / (√(νπ) * Γ(ν/2)) * (1 + x²/ν)^(-(ν+1)/2)
    let nu = df;
    let coef = gamma_ln((nu + 1.0) / 2.0) - gamma_ln(nu / 2.0) - 0.5 * (nu * std::f64::consts::PI).ln();
    let term = -(nu + 1.0) / 2.0 * (1.0 + x * x / nu).ln();
    (coef + term).exp()
}

/// Student's t cumulative distribution
pub fn t_cdf(x: f64, df: f64) -> f64 {
    // Use regularized incomplete beta function
    let t2 = x * x;
    let p = df / (df + t2);

    if x >= 0.0 {
        1.0 - 0.5 * regularized_incomplete_beta(df / 2.0, 0.5, p)
    } else {
        0.5 * regularized_incomplete_beta(df / 2.0, 0.5, p)
    }
}

/// Student's t quantile (inverse CDF)
pub fn t_inv(p: f64, df: f64) -> Result<f64, TrendError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(TrendError::domain_error(format!("t quantile requires 0 < p < 1, got {}", p)));
    }
    if !(df > 0.0) {
        return Err(TrendError::domain_error(format!("t quantile requires df > 0, got {}", df)));
    }
    if p < 0.5 {
        return t_inv(1.0 - p, df).map(|x| -x);
    }

    // Newton-Raphson from the normal quantile. The CDF is concave on x > 0 and
    // the t quantile lies above the normal one, so iterates increase monotonically.
    let mut x = norm_inv_approx(p).max(0.0);

    for _ in 0..100 {
        let cdf = t_cdf(x, df);
        let pdf = t_pdf(x, df);
        if pdf.abs() < 1e-300 {
            break;
        }
        let dx = (cdf - p) / pdf;
        x -= dx;
        if dx.abs() < 1e-12 * x.abs().max(1.0) {
            break;
        }
    }

    Ok(x)
}

/// Two-sided p-value of a t statistic: 2 · (1 − T_df(|t|))
pub fn two_sided_p_value(t: f64, df: f64) -> f64 {
    2.0 * (1.0 - t_cdf(t.abs(), df))
}

fn norm_inv_approx(p: f64) -> f64 {
    const A: [f64; 4] = [2.515517, 0.802853, 0.010328, 0.0];
    const B: [f64; 4] = [1.0, 1.432788, 0.189269, 0.001308];

    let sign = if p < 0.5 { -1.0 } else { 1.0 };
    let p_adj = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * p_adj.ln()).sqrt();
    let num = A[0] + t * (A[1] + t * A[2]);
    let den = 1.0 + t * (B[1] + t * (B[2] + t * B[3]));
    sign * (t - num / den)
}

/// Log gamma function using Lanczos approximation
pub fn gamma_ln(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }

    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    let g = 7.0;
    let z = x - 1.0;

    let mut sum = 0.99999999999980993;
    for (i, &c) in COEFFS.iter().enumerate() {
        sum += c / (z + i as f64 + 1.0);
    }

    let t = z + g + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (z + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b)
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let bt = (gamma_ln(a + b) - gamma_ln(a) - gamma_ln(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    // Continued fraction converges fastest below the mean
    let sym = (a + 1.0) / (a + b + 2.0);
    if x < sym {
        bt * beta_cf(a, b, x) / a
    } else {
        1.0 - bt * beta_cf(b, a, 1.0 - x) / b
    }
}

fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    let fpmin = 1e-300;
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < fpmin {
        d = fpmin;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=300 {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < fpmin {
            d = fpmin;
        }
        c = 1.0 + aa / c;
        if c.abs() < fpmin {
            c = fpmin;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < fpmin {
            d = fpmin;
        }
        c = 1.0 + aa / c;
        if c.abs() < fpmin {
            c = fpmin;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < 3e-16 {
            break;
        }
    }

    h
}
