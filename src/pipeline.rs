//! Shared forest plot preparation pipeline
//!
//! The pipeline:
//! 1. Normalizes raw rows into typed records
//! 2. Validates every record (all errors are collected)
//! 3. Builds the text table, box sizes and axis ticks
//! 4. Assembles the render-ready `PlotSpec`

use crate::config::ForestConfig;
use crate::forest::dataframe::raw_rows_from_dataframe;
use crate::forest::error::{ForestError, Result};
use crate::forest::plot_spec::{assemble, PlotSpec};
use crate::forest::record::{normalize_rows, validate_records, RawRow};
use crate::forest::table_text::build_text_table;
use polars::prelude::DataFrame;

/// Build a plot specification from raw rows
///
/// Fails with `ForestError::Validation` listing every malformed row, or with
/// `ForestError::Config` when the tick set does not fit the axis.
pub fn build_plot_spec(rows: &[RawRow], config: &ForestConfig) -> Result<PlotSpec> {
    tracing::info!("[1/4] Normalizing {} rows...", rows.len());
    let records = normalize_rows(rows);

    let n_subtitles = records.iter().filter(|r| r.is_subtitle).count();
    let n_summaries = records.iter().filter(|r| r.is_summary).count();
    tracing::debug!(
        "  Subtitle rows: {}, summary rows: {}",
        n_subtitles,
        n_summaries
    );

    tracing::info!("[2/4] Validating rows...");
    let report = validate_records(&records, Some(rows), config.validation_rules());
    if !report.is_empty() {
        tracing::warn!("  {} row error(s) found", report.len());
        return Err(ForestError::Validation(report));
    }

    tracing::info!("[3/4] Building table, box sizes and ticks...");
    let table = build_text_table(&records, &config.header);
    let weights: Vec<Option<f64>> = records.iter().map(|r| r.weight).collect();
    let box_sizes = config.weights.box_sizes(&weights);
    let ticks = config.ticks.build(config.presentation.log_axis)?;
    tracing::debug!(
        "  Ticks: {}",
        ticks
            .iter()
            .map(|t| t.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    tracing::info!("[4/4] Assembling plot specification...");
    let spec = assemble(
        &records,
        &table,
        box_sizes,
        ticks,
        config.presentation.clone(),
    )?;

    tracing::debug!(
        "  Drawable intervals: {}",
        spec.intervals.iter().filter(|i| i.is_drawable()).count()
    );
    tracing::info!("✓ Plot specification ready ({} rows + header)", spec.n_records());
    Ok(spec)
}

/// Build a plot specification from an already-parsed table
pub fn build_plot_spec_from_dataframe(df: &DataFrame, config: &ForestConfig) -> Result<PlotSpec> {
    let rows = raw_rows_from_dataframe(df)?;
    build_plot_spec(&rows, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::error::RowErrorKind;
    use crate::forest::properties::PropertySettings;
    use crate::forest::record::RawValue;
    use polars::prelude::*;

    fn subtitle(label: &str) -> RawRow {
        RawRow {
            subtitle: label.into(),
            is_subtitle: RawValue::Int(1),
            ..Default::default()
        }
    }

    fn study(name: &str, effect: f64, lower: f64, upper: f64, weight: Option<f64>) -> RawRow {
        RawRow {
            study: name.into(),
            biomarker: "PD-L1".into(),
            effect: effect.into(),
            lower: lower.into(),
            upper: upper.into(),
            weight: weight.into(),
            ..Default::default()
        }
    }

    fn summary(effect: f64, lower: f64, upper: f64, weight: f64) -> RawRow {
        RawRow {
            study: "Overall".into(),
            is_summary: RawValue::Int(1),
            ..study("Overall", effect, lower, upper, Some(weight))
        }
    }

    fn sample_rows() -> Vec<RawRow> {
        vec![
            subtitle("Lung cancer"),
            study("A", 1.234, 0.5, 2.0, Some(35.0)),
            study("B", 0.7, 0.4, 1.3, None),
            summary(0.95, 0.7, 1.3, 100.0),
        ]
    }

    #[test]
    fn test_full_pipeline() {
        let config = ForestConfig::defaults().unwrap();
        let spec = build_plot_spec(&sample_rows(), &config).unwrap();

        assert_eq!(spec.n_rows(), 5);
        assert_eq!(spec.table[0][3], "Effect [95% CI]");

        // Subtitle row: label only
        assert_eq!(spec.table[1][0], "Lung cancer");
        assert_eq!(spec.table[1][3], "");
        assert_eq!(spec.table[1][4], "");

        // Data rows
        assert_eq!(spec.table[2][3], "1.23 [0.50, 2.00]");
        assert_eq!(spec.table[2][4], "35.00");
        assert_eq!(spec.table[3][4], "");

        // Summary row keeps its effect but hides the weight
        assert_eq!(spec.table[4][3], "0.95 [0.70, 1.30]");
        assert_eq!(spec.table[4][4], "");

        assert_eq!(spec.is_summary, vec![true, false, false, false, true]);
        assert_eq!(spec.box_sizes.len(), 5);
        assert_eq!(spec.box_sizes[0], None);
        assert_eq!(spec.box_sizes[4], Some(0.25));
        assert!(spec.intervals[1].mean.is_none());
        assert_eq!(spec.ticks.len(), 7);
    }

    #[test]
    fn test_missing_effect_is_reported_not_blanked() {
        let mut rows = sample_rows();
        rows[2].effect = RawValue::Absent;
        rows.push(study("C", 1.0, 0.5, 2.0, Some(-4.0)));

        let config = ForestConfig::defaults().unwrap();
        let err = build_plot_spec(&rows, &config).unwrap_err();

        let report = match err {
            ForestError::Validation(report) => report,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert_eq!(report.rows(), vec![3, 5]);
        assert_eq!(report.errors[0].label, "B");
        assert_eq!(report.errors[0].kind, RowErrorKind::MissingValues(vec!["effect"]));
        assert_eq!(report.errors[1].kind, RowErrorKind::NegativeWeight(-4.0));
    }

    #[test]
    fn test_zero_effect_rejected_only_on_log_axis() {
        let rows = vec![study("A", 0.0, -0.5, 0.5, Some(10.0))];

        let config = ForestConfig::defaults().unwrap();
        assert!(matches!(
            build_plot_spec(&rows, &config),
            Err(ForestError::Validation(_))
        ));

        let linear: PropertySettings = [
            ("axis.log", "false"),
            ("axis.clip", "-1,1"),
            ("axis.ticks", "-1,0,1"),
            ("axis.zero", "0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = ForestConfig::from_properties(Some(&linear)).unwrap();
        let spec = build_plot_spec(&rows, &config).unwrap();
        assert_eq!(spec.table[1][3], "0.00 [-0.50, 0.50]");
        assert_eq!(spec.presentation.zero, 0.0);
    }

    #[test]
    fn test_only_subtitles() {
        let rows = vec![subtitle("Group 1"), subtitle("Group 2")];
        let config = ForestConfig::defaults().unwrap();
        let spec = build_plot_spec(&rows, &config).unwrap();
        assert_eq!(spec.n_records(), 2);
        assert_eq!(spec.box_sizes, vec![None, Some(0.15), Some(0.15)]);
    }

    #[test]
    fn test_empty_input() {
        let config = ForestConfig::defaults().unwrap();
        let spec = build_plot_spec(&[], &config).unwrap();
        assert_eq!(spec.n_rows(), 1);
        assert_eq!(spec.is_summary, vec![true]);
    }

    #[test]
    fn test_from_dataframe() {
        let df = df! {
            "subtitle" => [Some("Breast"), None],
            "study" => [None, Some("S1")],
            "biomarker" => [None, Some("HER2")],
            "effect" => [None, Some(1.5)],
            "lower" => [None, Some(1.1)],
            "upper" => [None, Some(2.2)],
            "weight" => [None, Some(12.0)],
            "is_subtitle" => [1i64, 0]
        }
        .unwrap();

        let config = ForestConfig::defaults().unwrap();
        let spec = build_plot_spec_from_dataframe(&df, &config).unwrap();
        assert_eq!(spec.table[1][0], "Breast");
        assert_eq!(spec.table[2][3], "1.50 [1.10, 2.20]");
        assert_eq!(spec.table[2][4], "12.00");
    }
}
