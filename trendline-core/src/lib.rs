//! Trendline Core - Fundamental types
//!
//! This crate provides the core types used throughout Trendline:
//! - `Dataset`: Named numeric/text columns with missing values
//! - `TrendError`: Structured errors with codes, context and severity

mod dataset;
mod error;

pub use dataset::{Column, Dataset, DatasetError};
pub use error::{codes, ErrorContext, Severity, TrendError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Column, Dataset, Severity, TrendError};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_missing_feature_display() {
            let err = TrendError::missing_feature(&["year", "params"]);
            let text = err.to_string();
            assert!(text.starts_with("[MISSING_FEATURE]"), "got: {}", text);
            assert!(text.contains("year, params"));
        }

        #[test]
        fn test_warning_severity() {
            let warn = TrendError::empty_common_subset("System");
            assert!(warn.is_warning());
            assert_eq!(warn.code, codes::EMPTY_COMMON_SUBSET);
            assert!(!TrendError::degenerate_variance(-0.1).is_warning());
        }

        #[test]
        fn test_context_builders() {
            let err = TrendError::invalid_transform("flop", 2)
                .in_dataset("data2")
                .with_note("while fitting model 2");
            let ctx = err.context.as_ref().unwrap();
            assert_eq!(ctx.dataset.as_deref(), Some("data2"));
            assert_eq!(ctx.columns, vec!["flop".to_string()]);
            assert_eq!(ctx.notes.len(), 1);
        }

        #[test]
        fn test_serialize_roundtrip() {
            let err = TrendError::missing_feature(&["year"]).in_dataset("data1");
            let json = serde_json::to_string(&err).unwrap();
            assert!(json.contains("\"severity\":\"error\""));
            let back: TrendError = serde_json::from_str(&json).unwrap();
            assert_eq!(back, err);
        }

        #[test]
        fn test_from_dataset_error() {
            let err: TrendError = DatasetError::DuplicateColumn("year".to_string()).into();
            assert_eq!(err.code, codes::INVALID_DATASET);
            assert_eq!(err.columns(), &["year".to_string()]);
        }
    }

    mod dataset_tests {
        use super::*;

        #[test]
        fn test_serde_dataset() {
            let data = Dataset::new()
                .with_text("System", vec![Some("GPT-3")])
                .unwrap()
                .with_numeric("year", vec![None])
                .unwrap();
            let json = serde_json::to_string(&data).unwrap();
            let back: Dataset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, data);
            assert_eq!(back.column_names().collect::<Vec<_>>(), vec!["System", "year"]);
        }

        #[test]
        fn test_deserialize_rejects_ragged_columns() {
            let json = r#"{"columns":[
                ["System",{"type":"Text","values":["a"]}],
                ["x",{"type":"Numeric","values":[1.0,2.0,3.0,4.0]}],
                ["y",{"type":"Numeric","values":[2.0,4.0,5.0,4.0]}]
            ],"rows":4}"#;
            let err = serde_json::from_str::<Dataset>(json).unwrap_err();
            assert!(err.to_string().contains("Column 'System' has 1 rows, expected 4"), "got: {}", err);
        }

        #[test]
        fn test_deserialize_rejects_duplicate_columns() {
            let json = r#"{"columns":[
                ["x",{"type":"Numeric","values":[1.0]}],
                ["x",{"type":"Numeric","values":[2.0]}]
            ],"rows":1}"#;
            let err = serde_json::from_str::<Dataset>(json).unwrap_err();
            assert!(err.to_string().contains("Duplicate column name: x"), "got: {}", err);
        }

        #[test]
        fn test_deserialize_row_count_checked() {
            let json = r#"{"columns":[["x",{"type":"Numeric","values":[1.0,2.0]}]],"rows":3}"#;
            assert!(serde_json::from_str::<Dataset>(json).is_err());
            let ok = r#"{"columns":[["x",{"type":"Numeric","values":[1.0,null]}]],"rows":2}"#;
            let data: Dataset = serde_json::from_str(ok).unwrap();
            assert_eq!(data.len(), 2);
            assert_eq!(data.numeric("x").unwrap(), &[Some(1.0), None]);
        }
    }
}
