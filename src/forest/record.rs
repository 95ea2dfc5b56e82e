//! Raw input rows and their normalized, typed counterpart
//!
//! A `RawRow` carries whatever the upstream reader produced for each cell:
//! text, integers, reals, booleans or nothing at all. `normalize_rows` turns
//! those into `NormalizedRecord`s once, so every later stage works with plain
//! `Option<f64>` and `bool` fields. Row order is never changed: it is the
//! top-to-bottom order of the plot.

use super::error::{RowError, RowErrorKind, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single untyped cell value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// True iff the value equals 1 (integer 1, real 1.0 or boolean true)
    ///
    /// Text cells never count as 1, not even `"1"`. An input where every cell
    /// is text (CSV read without type inference) has no subtitle or summary
    /// rows unless the flag columns are converted to numbers first.
    pub fn is_one(&self) -> bool {
        match self {
            RawValue::Int(i) => *i == 1,
            RawValue::Float(f) => *f == 1.0,
            RawValue::Bool(b) => *b,
            RawValue::Absent | RawValue::Text(_) => false,
        }
    }

    /// True for values a well-formed role flag may hold: absent, 0 or 1
    pub fn is_flag_like(&self) -> bool {
        match self {
            RawValue::Absent | RawValue::Bool(_) => true,
            RawValue::Int(i) => *i == 0 || *i == 1,
            RawValue::Float(f) => *f == 0.0 || *f == 1.0,
            RawValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Coerce to a finite real, or None
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Int(i) => *i as f64,
            RawValue::Float(f) => *f,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Absent | RawValue::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Render as display text (absent → empty string)
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Absent => String::new(),
            RawValue::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Absent => Ok(()),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Int(i) => write!(f, "{}", i),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// One input row as handed over by the reader
///
/// Keys match the column names of the source table. Missing keys are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub subtitle: RawValue,
    pub study: RawValue,
    pub biomarker: RawValue,
    pub effect: RawValue,
    pub lower: RawValue,
    pub upper: RawValue,
    pub weight: RawValue,
    pub is_subtitle: RawValue,
    pub is_summary: RawValue,
}

/// A typed row; built once by `normalize_rows` and never modified
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub subtitle: String,
    pub study: String,
    pub biomarker: String,
    pub effect: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub weight: Option<f64>,
    pub is_subtitle: bool,
    pub is_summary: bool,
}

impl NormalizedRecord {
    /// Name used to identify the row in error messages
    pub fn label(&self) -> &str {
        [&self.study, &self.biomarker, &self.subtitle]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// Effect fields that are absent, in column order
    pub fn missing_values(&self) -> Vec<&'static str> {
        [
            ("effect", self.effect),
            ("lower", self.lower),
            ("upper", self.upper),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Collapse every run of `\r` / `\n` into a single `\n`
pub fn normalize_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push('\n');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// Normalize a single raw row
pub fn normalize_row(row: &RawRow) -> NormalizedRecord {
    NormalizedRecord {
        subtitle: row.subtitle.to_text(),
        study: row.study.to_text(),
        biomarker: normalize_line_breaks(&row.biomarker.to_text()),
        effect: row.effect.to_f64(),
        lower: row.lower.to_f64(),
        upper: row.upper.to_f64(),
        weight: row.weight.to_f64(),
        is_subtitle: row.is_subtitle.is_one(),
        is_summary: row.is_summary.is_one(),
    }
}

/// Normalize all rows, preserving length and order
pub fn normalize_rows(rows: &[RawRow]) -> Vec<NormalizedRecord> {
    rows.iter().map(normalize_row).collect()
}

/// Rules applied by `validate_records`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValidationRules {
    /// Effect and bounds must be strictly positive
    pub log_axis: bool,
    /// Flag values other than absent/0/1 are errors
    pub strict_flags: bool,
}

/// Check every row and collect all errors
///
/// `raw` is only consulted for strict flag checks; when given it must be the
/// slice the records were normalized from.
pub fn validate_records(
    records: &[NormalizedRecord],
    raw: Option<&[RawRow]>,
    rules: ValidationRules,
) -> ValidationReport {
    let mut errors = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let mut push = |kind| {
            errors.push(RowError {
                row: idx + 1,
                label: record.label().to_string(),
                kind,
            })
        };

        if rules.strict_flags {
            if let Some(raw_row) = raw.and_then(|r| r.get(idx)) {
                for (flag, value) in [
                    ("is_subtitle", &raw_row.is_subtitle),
                    ("is_summary", &raw_row.is_summary),
                ] {
                    if !value.is_flag_like() {
                        push(RowErrorKind::MalformedFlag {
                            flag,
                            value: value.to_text(),
                        });
                    }
                }
            }
        }

        // Subtitle rows carry no effect data
        if record.is_subtitle {
            continue;
        }

        let missing = record.missing_values();
        if !missing.is_empty() {
            push(RowErrorKind::MissingValues(missing));
        }

        if let Some(w) = record.weight {
            if w < 0.0 {
                push(RowErrorKind::NegativeWeight(w));
            }
        }

        if rules.log_axis {
            for (field, value) in [
                ("effect", record.effect),
                ("lower", record.lower),
                ("upper", record.upper),
            ] {
                if let Some(v) = value.filter(|v| *v <= 0.0) {
                    push(RowErrorKind::NonPositiveOnLogAxis { field, value: v });
                }
            }
        }
    }

    ValidationReport { errors }
}
