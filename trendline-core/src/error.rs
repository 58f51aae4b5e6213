//! Structured errors for trend analysis
//!
//! Every fallible operation returns a `TrendError`. Errors carry a
//! machine-readable code, a human-readable message and enough context
//! (dataset label, offending columns) to act on. Non-fatal conditions use
//! the same type with `Severity::Warning` and ride along on results.

use crate::DatasetError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const MISSING_FEATURE: &str = "MISSING_FEATURE";
    pub const INVALID_TRANSFORM: &str = "INVALID_TRANSFORM";
    pub const DEGENERATE_VARIANCE: &str = "DEGENERATE_VARIANCE";
    pub const EMPTY_COMMON_SUBSET: &str = "EMPTY_COMMON_SUBSET";
    pub const UNDEFINED_CORRELATION: &str = "UNDEFINED_CORRELATION";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const SINGULAR_DESIGN: &str = "SINGULAR_DESIGN";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const INVALID_DATASET: &str = "INVALID_DATASET";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Computation continued with degraded result
    Warning,
    /// Operation aborted
    Error,
    /// Bug or solver failure
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Label of the dataset involved ("data1", "data2", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Columns the error is about, in request order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub columns: Vec<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error for trend analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl TrendError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: set dataset label
    pub fn in_dataset(mut self, dataset: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.dataset = Some(dataset.into());
        self
    }

    /// Builder: record the columns involved
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Columns recorded in the context, empty when there is none
    pub fn columns(&self) -> &[String] {
        self.context
            .as_ref()
            .map(|c| c.columns.as_slice())
            .unwrap_or(&[])
    }

    // ========== Common Error Constructors ==========

    pub fn missing_feature<S: AsRef<str>>(names: &[S]) -> Self {
        let list: Vec<String> = names.iter().map(|s| s.as_ref().to_string()).collect();
        Self::new(
            codes::MISSING_FEATURE,
            format!("Required column(s) missing: {}", list.join(", ")),
        )
        .with_suggestion("Add the listed columns or fit the model on the columns you have")
        .with_columns(list)
    }

    pub fn invalid_transform(column: &str, non_positive: usize) -> Self {
        Self::new(
            codes::INVALID_TRANSFORM,
            format!(
                "log10 transform of '{}' requires positive values, found {} value(s) <= 0",
                column, non_positive
            ),
        )
        .with_suggestion("Drop or correct non-positive targets, or fit without the log transform")
        .with_columns([column])
    }

    pub fn degenerate_variance(variance: f64) -> Self {
        Self::new(
            codes::DEGENERATE_VARIANCE,
            format!(
                "Adjusted variance of the slope difference is not positive ({})",
                variance
            ),
        )
        .with_suggestion("Residuals are almost perfectly correlated; rerun without correlation adjustment")
    }

    pub fn empty_common_subset(entity_column: &str) -> Self {
        Self::new(
            codes::EMPTY_COMMON_SUBSET,
            format!("No entities in '{}' are shared by both datasets", entity_column),
        )
        .with_note("Residual correlation set to 0")
        .with_columns([entity_column])
        .with_severity(Severity::Warning)
    }

    pub fn undefined_correlation(pairs: usize) -> Self {
        Self::new(
            codes::UNDEFINED_CORRELATION,
            format!("Residual correlation is undefined over {} common row(s)", pairs),
        )
        .with_note("Residual correlation set to 0")
        .with_severity(Severity::Warning)
    }

    pub fn type_error(column: &str, expected: &str, got: &str) -> Self {
        Self::new(
            codes::TYPE_ERROR,
            format!("Column '{}': expected {}, got {}", column, expected, got),
        )
        .with_columns([column])
    }

    pub fn insufficient_data(details: impl Into<String>) -> Self {
        Self::new(
            codes::INSUFFICIENT_DATA,
            format!("Insufficient data: {}", details.into()),
        )
        .with_suggestion("Provide more complete rows")
    }

    pub fn singular_design(details: impl Into<String>) -> Self {
        Self::new(
            codes::SINGULAR_DESIGN,
            format!("Design matrix is rank deficient: {}", details.into()),
        )
        .with_suggestion("Remove constant or collinear features")
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for TrendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TrendError {}

impl From<DatasetError> for TrendError {
    fn from(err: DatasetError) -> Self {
        let columns = match &err {
            DatasetError::LengthMismatch { column, .. } => vec![column.clone()],
            DatasetError::DuplicateColumn(name) => vec![name.clone()],
            DatasetError::RowOutOfRange { .. } => vec![],
        };
        Self::new(codes::INVALID_DATASET, err.to_string()).with_columns(columns)
    }
}
