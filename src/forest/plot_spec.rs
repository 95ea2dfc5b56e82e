//! Render-ready forest plot specification
//!
//! Every per-row sequence starts with the header row. The header has no
//! interval and no box, and is always emphasized like a summary row.

use super::error::{ForestError, Result};
use super::record::NormalizedRecord;
use super::table_text::{TextTable, N_COLUMNS};
use super::ticks::AxisTick;
use crate::config::PresentationParams;
use serde::Serialize;

/// Point estimate and confidence bounds of one row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IntervalRow {
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl IntervalRow {
    /// Header slot: nothing to draw
    pub const EMPTY: IntervalRow = IntervalRow {
        mean: None,
        lower: None,
        upper: None,
    };

    pub fn from_record(record: &NormalizedRecord) -> Self {
        Self {
            mean: record.effect,
            lower: record.lower,
            upper: record.upper,
        }
    }

    /// True when all three values are present
    pub fn is_drawable(&self) -> bool {
        self.mean.is_some() && self.lower.is_some() && self.upper.is_some()
    }
}

/// Everything the renderer needs for one forest plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    /// Text matrix, header row first
    pub table: Vec<[String; N_COLUMNS]>,
    /// Interval per row, header first
    pub intervals: Vec<IntervalRow>,
    /// Box size per row, `None` for the header
    pub box_sizes: Vec<Option<f64>>,
    /// Emphasized rows (header and summaries), drawn bold / as diamonds
    pub is_summary: Vec<bool>,
    pub ticks: Vec<AxisTick>,
    pub presentation: PresentationParams,
}

impl PlotSpec {
    /// Number of rows including the header
    pub fn n_rows(&self) -> usize {
        self.table.len()
    }

    /// Number of data rows (excluding the header)
    pub fn n_records(&self) -> usize {
        self.table.len().saturating_sub(1)
    }
}

/// Emphasis vector: header first (always true), then each record's summary flag
pub fn emphasis(records: &[NormalizedRecord]) -> Vec<bool> {
    std::iter::once(true)
        .chain(records.iter().map(|r| r.is_summary))
        .collect()
}

/// Interval triples: header first (empty), then one per record
pub fn intervals(records: &[NormalizedRecord]) -> Vec<IntervalRow> {
    std::iter::once(IntervalRow::EMPTY)
        .chain(records.iter().map(IntervalRow::from_record))
        .collect()
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ForestError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// Combine the stage outputs into a `PlotSpec`
pub fn assemble(
    records: &[NormalizedRecord],
    table: &TextTable,
    box_sizes: Vec<Option<f64>>,
    ticks: Vec<AxisTick>,
    presentation: PresentationParams,
) -> Result<PlotSpec> {
    let n_rows = records.len() + 1;
    check_len("text table", n_rows, table.n_rows())?;
    check_len("box sizes", n_rows, box_sizes.len())?;

    Ok(PlotSpec {
        table: table.matrix(),
        intervals: intervals(records),
        box_sizes,
        is_summary: emphasis(records),
        ticks,
        presentation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::forest::table_text::build_text_table;
    use crate::forest::ticks::TickSpec;
    use crate::forest::weights::box_sizes;

    fn record(study: &str, is_summary: bool) -> NormalizedRecord {
        NormalizedRecord {
            subtitle: String::new(),
            study: study.to_string(),
            biomarker: String::new(),
            effect: Some(0.8),
            lower: Some(0.6),
            upper: Some(1.1),
            weight: Some(20.0),
            is_subtitle: false,
            is_summary,
        }
    }

    fn assemble_records(records: &[NormalizedRecord]) -> Result<PlotSpec> {
        let config = ForestConfig::defaults()?;
        let table = build_text_table(records, &config.header);
        let weights: Vec<Option<f64>> = records.iter().map(|r| r.weight).collect();
        assemble(
            records,
            &table,
            box_sizes(&weights),
            TickSpec::default().build(true)?,
            config.presentation,
        )
    }

    #[test]
    fn test_header_is_emphasized_and_empty() {
        let records = vec![record("A", false), record("Overall", true)];
        let spec = assemble_records(&records).unwrap();

        assert_eq!(spec.n_rows(), 3);
        assert_eq!(spec.n_records(), 2);
        assert_eq!(spec.is_summary, vec![true, false, true]);
        assert_eq!(spec.intervals[0], IntervalRow::EMPTY);
        assert!(spec.intervals[1].is_drawable());
        assert_eq!(spec.box_sizes[0], None);
        assert_eq!(spec.table[0][0], "Category");
    }

    #[test]
    fn test_header_emphasized_without_summaries() {
        let spec = assemble_records(&[record("A", false)]).unwrap();
        assert_eq!(spec.is_summary, vec![true, false]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let records = vec![record("A", false)];
        let config = ForestConfig::defaults().unwrap();
        let table = build_text_table(&records, &config.header);

        let err = assemble(
            &records,
            &table,
            vec![None],
            Vec::new(),
            config.presentation,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ForestError::LengthMismatch {
                what: "box sizes",
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_serializes_for_renderer() {
        let spec = assemble_records(&[record("A", false)]).unwrap();
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["table"][1][1], "A");
        assert!(json["box_sizes"][0].is_null());
        assert!(json["intervals"][0]["mean"].is_null());
        assert_eq!(json["intervals"][1]["upper"], 1.1);
        assert_eq!(json["ticks"][0]["label"], "0.02");
        assert_eq!(json["presentation"]["clip"][1], 1000.0);
        assert_eq!(json["presentation"]["align"][3], "right");
    }
}
