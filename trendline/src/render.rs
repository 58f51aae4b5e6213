//! Markdown and JSON renderer
//!
//! Renders fitted models, prediction frames and comparison results as
//! markdown tables, or as JSON through serde.

use serde::Serialize;
use trendline_core::TrendError;
use trendline_stats::{FittedModel, GrowthReport, PredictionFrame, SlopeComparison};

/// Display format for numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberFormat {
    /// Fixed decimal places (default)
    Decimal(usize),
    /// Significant figures with scientific notation for large/small values
    SigFigs(usize),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Decimal(4)
    }
}

impl NumberFormat {
    pub fn format(&self, x: f64) -> String {
        if !x.is_finite() {
            return x.to_string();
        }
        match *self {
            NumberFormat::Decimal(places) => format!("{:.*}", places, x),
            NumberFormat::SigFigs(sigfigs) => {
                let sigfigs = sigfigs.max(1);
                if x == 0.0 {
                    return "0".to_string();
                }
                let magnitude = x.abs().log10().floor() as i32;
                if magnitude < -4 || magnitude >= sigfigs as i32 {
                    format!("{:.*e}", sigfigs - 1, x)
                } else {
                    let places = (sigfigs as i32 - 1 - magnitude).max(0) as usize;
                    format!("{:.*}", places, x)
                }
            }
        }
    }
}

/// Result renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    format: NumberFormat,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    fn num(&self, x: f64) -> String {
        self.format.format(x)
    }

    fn opt(&self, x: Option<f64>) -> String {
        x.map(|v| self.num(v)).unwrap_or_default()
    }

    /// Model summary followed by the coefficient table
    pub fn render_model(&self, model: &FittedModel) -> String {
        let target = if model.log_target() {
            format!("log10({})", model.target())
        } else {
            model.target().to_string()
        };
        let level = ((model.confidence_level() * 100_000.0).round() / 1000.0).to_string();

        let mut output = format!("## {} ~ {}\n\n", target, model.features().join(" + "));

        output.push_str("| name | value |\n");
        output.push_str("|------|-------|\n");
        output.push_str(&format!("| observations | {} |\n", model.nobs()));
        output.push_str(&format!("| df residual | {} |\n", model.df_resid()));
        output.push_str(&format!("| R^2 | {} |\n", self.num(model.r_squared())));
        output.push_str(&format!("| adj. R^2 | {} |\n", self.num(model.adj_r_squared())));
        output.push_str(&format!("| residual variance | {} |\n", self.num(model.scale())));
        output.push('\n');

        output.push_str(&format!("| term | coef | std err | {0}% lower | {0}% upper |\n", level));
        output.push_str("|------|------|---------|----------|----------|\n");
        let rows = model
            .terms()
            .into_iter()
            .zip(model.params())
            .zip(model.std_errors())
            .zip(model.conf_int());
        for (((term, coef), se), (lo, hi)) in rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                term,
                self.num(*coef),
                self.num(*se),
                self.num(*lo),
                self.num(*hi)
            ));
        }

        output
    }

    /// One table row per prediction; rows with missing features stay blank
    pub fn render_predictions(&self, frame: &PredictionFrame) -> String {
        let mut output = String::new();

        let mut header: Vec<String> = frame.features.clone();
        header.extend(
            ["mean", "mean se", "mean lower", "mean upper", "obs lower", "obs upper"]
                .iter()
                .map(|s| s.to_string()),
        );
        output.push_str(&format!("| {} |\n", header.join(" | ")));
        output.push_str(&format!("|{}\n", "------|".repeat(header.len())));

        for row in &frame.rows {
            let mut cells: Vec<String> = row.features.iter().map(|v| self.opt(*v)).collect();
            match row.estimate {
                Some(e) => cells.extend(
                    [
                        e.mean,
                        e.mean_se,
                        e.mean_ci_lower,
                        e.mean_ci_upper,
                        e.obs_ci_lower,
                        e.obs_ci_upper,
                    ]
                    .iter()
                    .map(|v| self.num(*v)),
                ),
                None => cells.extend(std::iter::repeat(String::new()).take(6)),
            }
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }

        output
    }

    pub fn render_growth(&self, report: &GrowthReport) -> String {
        let mut output = String::new();
        output.push_str("| measure | estimate | lower | upper |\n");
        output.push_str("|---------|----------|-------|-------|\n");
        let rows = [
            ("OOMs/year", report.slope, report.slope_ci),
            ("factor/year", report.factor_per_year, report.factor_ci),
            ("doubling time (months)", report.doubling_time_months, report.doubling_time_ci),
        ];
        for (name, estimate, (lo, hi)) in rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                name,
                self.num(estimate),
                self.num(lo),
                self.num(hi)
            ));
        }
        output
    }

    /// Comparison table, then any warnings as a list
    pub fn render_comparison(&self, result: &SlopeComparison) -> String {
        let mut output = String::new();
        output.push_str("| name | value |\n");
        output.push_str("|------|-------|\n");
        output.push_str(&format!("| slope 1 | {} |\n", self.num(result.slope1)));
        output.push_str(&format!("| std err 1 | {} |\n", self.num(result.std_error1)));
        output.push_str(&format!("| slope 2 | {} |\n", self.num(result.slope2)));
        output.push_str(&format!("| std err 2 | {} |\n", self.num(result.std_error2)));
        output.push_str(&format!("| residual correlation | {} |\n", self.num(result.correlation)));
        output.push_str(&format!("| common rows | {} |\n", result.common_rows));
        output.push_str(&format!("| t | {} |\n", self.num(result.t_statistic)));
        output.push_str(&format!("| df | {} |\n", result.df));
        output.push_str(&format!("| p-value | {} |\n", self.num(result.p_value)));

        if !result.warnings.is_empty() {
            output.push('\n');
            for warning in &result.warnings {
                output.push_str(&format!("- {}\n", warning));
            }
        }

        output
    }
}

/// Serialize any result type as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String, TrendError> {
    serde_json::to_string_pretty(value).map_err(|e| TrendError::internal(format!("JSON encoding failed: {}", e)))
}
