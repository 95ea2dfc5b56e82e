use std::fmt;
use thiserror::Error;

/// Errors that can occur while preparing a forest plot
#[derive(Debug, Error)]
pub enum ForestError {
    /// One or more rows cannot be placed on the plot
    #[error("{0}")]
    Validation(ValidationReport),

    /// Configuration error (invalid tick set, inconsistent ranges, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required input column is missing from a DataFrame
    #[error("Missing column '{0}' in input table")]
    MissingColumn(String),

    /// Polars error while reading a DataFrame
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Per-row sequences handed to the assembler disagree in length
    #[error("Length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Type alias for Results using ForestError
pub type Result<T> = std::result::Result<T, ForestError>;

/// What is wrong with a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    /// Effect estimate or a confidence bound is missing on a non-subtitle row
    MissingValues(Vec<&'static str>),
    /// Weight below zero
    NegativeWeight(f64),
    /// Effect or bound is zero or negative while the axis is logarithmic
    NonPositiveOnLogAxis { field: &'static str, value: f64 },
    /// Role flag is neither absent, 0 nor 1 (strict flag mode only)
    MalformedFlag { flag: &'static str, value: String },
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowErrorKind::MissingValues(fields) => {
                write!(f, "missing {}", fields.join(", "))
            }
            RowErrorKind::NegativeWeight(w) => write!(f, "negative weight {}", w),
            RowErrorKind::NonPositiveOnLogAxis { field, value } => {
                write!(f, "{} = {} cannot be placed on a log axis", field, value)
            }
            RowErrorKind::MalformedFlag { flag, value } => {
                write!(f, "{} flag has value '{}', expected 0 or 1", flag, value)
            }
        }
    }
}

/// A validation error attached to one input row
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based position of the row in the input
    pub row: usize,
    /// Study or biomarker name, whichever identifies the row
    pub label: String,
    pub kind: RowErrorKind,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "row {}: {}", self.row, self.kind)
        } else {
            write!(f, "row {} ({}): {}", self.row, self.label, self.kind)
        }
    }
}

/// All row errors found in one pass over the input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<RowError>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Rows (1-based) that have at least one error
    pub fn rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.errors.iter().map(|e| e.row).collect();
        rows.dedup();
        rows
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid row(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}
