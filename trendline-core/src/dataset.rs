//! In-memory observation tables
//!
//! A `Dataset` is an ordered set of equally long named columns. Numeric
//! cells are `Option<f64>`; `None` marks a missing value and NaN is folded
//! into `None` on the way in. Text columns usually hold entity identifiers.

use crate::TrendError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Error type for dataset construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("Column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Row index {index} out of range for {len} rows")]
    RowOutOfRange { index: usize, len: usize },
}

/// One column of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "Numeric",
            Column::Text(_) => "Text",
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Numeric(v) => v.get(row).map_or(true, |c| c.is_none()),
            Column::Text(v) => v.get(row).map_or(true, |c| c.is_none()),
        }
    }

    /// Entity key for a row; numbers are keyed by their display form
    pub fn key(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Column::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Named, ordered columns of equal length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<(String, Column)>,
    rows: usize,
}

/// Wire form of a `Dataset`, checked before use
#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        let mut data = Dataset {
            columns: Vec::with_capacity(raw.columns.len()),
            rows: raw.rows,
        };
        for (name, column) in raw.columns {
            if column.len() != raw.rows {
                return Err(DatasetError::LengthMismatch {
                    column: name,
                    expected: raw.rows,
                    got: column.len(),
                });
            }
            if data.has_column(&name) {
                return Err(DatasetError::DuplicateColumn(name));
            }
            data.columns.push((name, column));
        }
        Ok(data)
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a numeric column. NaN becomes a missing value.
    pub fn with_numeric<I>(self, name: impl Into<String>, values: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let cells = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        self.with_column(name, Column::Numeric(cells))
    }

    /// Builder: add a fully observed numeric column
    pub fn with_values(self, name: impl Into<String>, values: &[f64]) -> Result<Self, DatasetError> {
        self.with_numeric(name, values.iter().map(|&v| Some(v)))
    }

    /// Builder: add a text column
    pub fn with_text<I, S>(self, name: impl Into<String>, values: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let cells = values.into_iter().map(|v| v.map(Into::into)).collect();
        self.with_column(name, Column::Text(cells))
    }

    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, DatasetError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                column: name,
                expected: self.rows,
                got: column.len(),
            });
        }
        self.columns.push((name, column));
        Ok(self)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Names from `required` that are not columns, in request order, deduplicated
    pub fn missing_columns<'a, S: AsRef<str>>(&self, required: &'a [S]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        required
            .iter()
            .map(|s| s.as_ref())
            .filter(|name| !self.has_column(name) && seen.insert(*name))
            .collect()
    }

    /// Fail with `MISSING_FEATURE` naming every absent column
    pub fn require_columns<S: AsRef<str>>(&self, required: &[S]) -> Result<(), TrendError> {
        let missing = self.missing_columns(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TrendError::missing_feature(&missing))
        }
    }

    /// Numeric cells of a column
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>], TrendError> {
        match self.column(name) {
            Some(Column::Numeric(v)) => Ok(v),
            Some(other) => Err(TrendError::type_error(name, "Numeric", other.type_name())),
            None => Err(TrendError::missing_feature(&[name])),
        }
    }

    /// Keep only the rows at `rows`, in that order
    pub fn select_rows(&self, rows: &[usize]) -> Result<Dataset, DatasetError> {
        if let Some(&index) = rows.iter().find(|&&i| i >= self.rows) {
            return Err(DatasetError::RowOutOfRange { index, len: self.rows });
        }
        Ok(Dataset {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.select(rows)))
                .collect(),
            rows: rows.len(),
        })
    }

    /// Indices of rows with no missing value in any of `subset`
    pub fn complete_rows<S: AsRef<str>>(&self, subset: &[S]) -> Result<Vec<usize>, TrendError> {
        self.require_columns(subset)?;
        let cols: Vec<&Column> = subset
            .iter()
            .filter_map(|name| self.column(name.as_ref()))
            .collect();
        Ok((0..self.rows)
            .filter(|&row| cols.iter().all(|c| !c.is_missing(row)))
            .collect())
    }

    /// Drop rows with a missing value in any of `subset`
    pub fn drop_missing<S: AsRef<str>>(&self, subset: &[S]) -> Result<Dataset, TrendError> {
        let keep = self.complete_rows(subset)?;
        Ok(self.select_rows(&keep)?)
    }
}
