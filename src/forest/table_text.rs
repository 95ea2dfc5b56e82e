//! Text table shown to the left of the interval graph
//!
//! Each record becomes a `DisplayRow` in three steps, always in this order:
//! 1. `base_row`: verbatim labels plus formatted effect and weight
//! 2. `blank_subtitle`: subtitle rows lose the effect and weight text
//! 3. `blank_summary`: summary rows lose the weight text
//!
//! The weight of a summary row only sizes its diamond; it is never printed.

use super::record::NormalizedRecord;
use serde::Serialize;

/// Number of text columns
pub const N_COLUMNS: usize = 5;

/// One row of the text table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisplayRow {
    pub category: String,
    pub study: String,
    pub biomarker: String,
    pub effect_text: String,
    pub weight_text: String,
}

impl DisplayRow {
    pub fn into_cells(self) -> [String; N_COLUMNS] {
        [
            self.category,
            self.study,
            self.biomarker,
            self.effect_text,
            self.weight_text,
        ]
    }
}

impl From<[String; N_COLUMNS]> for DisplayRow {
    fn from(cells: [String; N_COLUMNS]) -> Self {
        let [category, study, biomarker, effect_text, weight_text] = cells;
        Self {
            category,
            study,
            biomarker,
            effect_text,
            weight_text,
        }
    }
}

/// Header row followed by one row per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    pub header: DisplayRow,
    pub rows: Vec<DisplayRow>,
}

impl TextTable {
    /// All rows including the header, as plain cells
    pub fn matrix(&self) -> Vec<[String; N_COLUMNS]> {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .cloned()
            .map(DisplayRow::into_cells)
            .collect()
    }

    /// Number of rows including the header
    pub fn n_rows(&self) -> usize {
        self.rows.len() + 1
    }
}

/// `"1.23 [0.50, 2.00]"`, or empty when any of the three values is absent
pub fn format_effect(effect: Option<f64>, lower: Option<f64>, upper: Option<f64>) -> String {
    match (effect, lower, upper) {
        (Some(e), Some(l), Some(u)) => format!("{:.2} [{:.2}, {:.2}]", e, l, u),
        _ => String::new(),
    }
}

/// Two decimals, or empty when absent
pub fn format_weight(weight: Option<f64>) -> String {
    weight.map(|w| format!("{:.2}", w)).unwrap_or_default()
}

/// Labels and formatted numbers, before any role override
pub fn base_row(record: &NormalizedRecord) -> DisplayRow {
    DisplayRow {
        category: record.subtitle.clone(),
        study: record.study.clone(),
        biomarker: record.biomarker.clone(),
        effect_text: format_effect(record.effect, record.lower, record.upper),
        weight_text: format_weight(record.weight),
    }
}

/// Subtitle rows show no numbers
pub fn blank_subtitle(row: DisplayRow, record: &NormalizedRecord) -> DisplayRow {
    if record.is_subtitle {
        DisplayRow {
            effect_text: String::new(),
            weight_text: String::new(),
            ..row
        }
    } else {
        row
    }
}

/// Summary rows show no weight
pub fn blank_summary(row: DisplayRow, record: &NormalizedRecord) -> DisplayRow {
    if record.is_summary {
        DisplayRow {
            weight_text: String::new(),
            ..row
        }
    } else {
        row
    }
}

/// Display row for a single record
pub fn display_row(record: &NormalizedRecord) -> DisplayRow {
    let row = base_row(record);
    let row = blank_subtitle(row, record);
    blank_summary(row, record)
}

/// Build the full table
pub fn build_text_table(records: &[NormalizedRecord], header: &[String; N_COLUMNS]) -> TextTable {
    TextTable {
        header: DisplayRow::from(header.clone()),
        rows: records.iter().map(display_row).collect(),
    }
}
