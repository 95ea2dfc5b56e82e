//! Forest plot configuration from properties
//!
//! Configuration is loaded from user properties layered over forest.json.
//! All default values come from forest.json - no hardcoded fallbacks in this code.

use crate::forest::error::{ForestError, Result};
use crate::forest::properties::{PropertyReader, PropertySettings};
use crate::forest::record::ValidationRules;
use crate::forest::table_text::N_COLUMNS;
use crate::forest::ticks::TickSpec;
use crate::forest::weights::WeightScaleParams;
use serde::Serialize;

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    Left,
    Right,
}

impl ColumnAlign {
    /// Parse "left"/"l" or "right"/"r" (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Pass-through parameters for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationParams {
    /// Confidence intervals are clipped to [min, max]
    pub clip: (f64, f64),

    /// Position of the no-effect reference line
    pub zero: f64,

    /// Alignment of each of the five table columns
    pub align: Vec<ColumnAlign>,

    /// Gap between table columns (mm)
    pub col_gap_mm: f64,

    /// Width of the interval graph (mm)
    pub graph_width_mm: f64,

    /// Line width of intervals, reference line and axis
    pub line_width: f64,

    /// Plot title (optional)
    pub title: Option<String>,

    /// Effect axis label (optional)
    pub axis_label: Option<String>,

    /// Logarithmic effect axis
    pub log_axis: bool,
}

#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Labels of the header row
    pub header: [String; N_COLUMNS],

    /// Axis tick positions and labels
    pub ticks: TickSpec,

    /// Weight → box size transform
    pub weights: WeightScaleParams,

    /// Report malformed role flags instead of treating them as unset
    pub strict_flags: bool,

    pub presentation: PresentationParams,
}

impl ForestConfig {
    /// Create config from user properties (None = all defaults)
    ///
    /// Unparsable scalar values are logged and replaced by their default.
    /// Structural problems (wrong column count, inverted ranges) are errors.
    pub fn from_properties(settings: Option<&PropertySettings>) -> Result<Self> {
        let props = PropertyReader::new(settings);

        // Header labels: exactly one per column, '|' separated
        let header_list = props.get_list("table.header", '|');
        let header: [String; N_COLUMNS] = header_list.try_into().map_err(|v: Vec<String>| {
            ForestError::Config(format!(
                "table.header needs {} labels, got {}",
                N_COLUMNS,
                v.len()
            ))
        })?;

        // Column alignment: one of left/right per column
        let align = props
            .get_list("table.align", ',')
            .iter()
            .map(|s| {
                ColumnAlign::parse(s).ok_or_else(|| {
                    ForestError::Config(format!("table.align: '{}' is not left or right", s))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if align.len() != N_COLUMNS {
            return Err(ForestError::Config(format!(
                "table.align needs {} values, got {}",
                N_COLUMNS,
                align.len()
            )));
        }

        let log_axis = props.get_bool("axis.log");

        // Ticks: labels derived from positions unless given explicitly
        let mut ticks = TickSpec::new(props.get_f64_list("axis.ticks"));
        let tick_labels = props.get_list("axis.tick.labels", ',');
        if !tick_labels.is_empty() {
            ticks = ticks.with_labels(tick_labels);
        }

        let clip = props
            .get_pair("axis.clip")
            .ok_or_else(|| ForestError::Config("axis.clip needs 'min,max'".into()))?;
        if clip.0 >= clip.1 {
            return Err(ForestError::Config(format!(
                "axis.clip min {} must be below max {}",
                clip.0, clip.1
            )));
        }
        if log_axis && clip.0 <= 0.0 {
            return Err(ForestError::Config(format!(
                "axis.clip min {} must be positive on a log axis",
                clip.0
            )));
        }

        let weights = WeightScaleParams {
            floor: props.get_f64_in_range("weight.floor", 0.0, 100.0),
            offset: props.get_f64_in_range("weight.offset", f64::MIN_POSITIVE, 100.0),
            min_size: props.get_f64_in_range("box.size.min", 0.0, 10.0),
            max_size: props.get_f64_in_range("box.size.max", 0.0, 10.0),
        };
        if weights.min_size > weights.max_size {
            return Err(ForestError::Config(format!(
                "box.size.min {} exceeds box.size.max {}",
                weights.min_size, weights.max_size
            )));
        }

        let presentation = PresentationParams {
            clip,
            zero: props.get_f64("axis.zero"),
            align,
            col_gap_mm: props.get_f64_in_range("table.col.gap", 0.0, 1000.0),
            graph_width_mm: props.get_f64_in_range("graph.width", 1.0, 10000.0),
            line_width: props.get_f64_in_range("line.width", 0.0, 20.0),
            title: props.get_optional_string("plot.title"),
            axis_label: props.get_optional_string("axis.label"),
            log_axis,
        };

        Ok(Self {
            header,
            ticks,
            weights,
            strict_flags: props.get_bool("flags.strict"),
            presentation,
        })
    }

    /// Default configuration from forest.json
    pub fn defaults() -> Result<Self> {
        Self::from_properties(None)
    }

    /// Row checks implied by this configuration
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            log_axis: self.presentation.log_axis,
            strict_flags: self.strict_flags,
        }
    }
}
