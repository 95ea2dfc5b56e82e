//! Log-scale axis ticks
//!
//! Tick positions are configuration (`axis.ticks`); labels default to the
//! shortest display form of each position ("0.02", "1", "1000").

use super::error::{ForestError, Result};
use serde::Serialize;

/// Default tick positions for hazard/odds ratio plots
pub const DEFAULT_TICKS: [f64; 7] = [0.02, 1.0, 4.0, 16.0, 64.0, 256.0, 1000.0];

/// A single axis tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Configured tick positions and optional explicit labels
#[derive(Debug, Clone, PartialEq)]
pub struct TickSpec {
    pub positions: Vec<f64>,
    pub labels: Option<Vec<String>>,
}

impl Default for TickSpec {
    fn default() -> Self {
        Self {
            positions: DEFAULT_TICKS.to_vec(),
            labels: None,
        }
    }
}

impl TickSpec {
    pub fn new(positions: Vec<f64>) -> Self {
        Self {
            positions,
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Build the ordered tick list
    ///
    /// Positions must be finite and strictly increasing. On a log axis they
    /// must also be strictly positive.
    pub fn build(&self, log_axis: bool) -> Result<Vec<AxisTick>> {
        if self.positions.is_empty() {
            return Err(ForestError::Config("axis needs at least one tick".into()));
        }

        for p in &self.positions {
            if !p.is_finite() {
                return Err(ForestError::Config(format!("tick position {} is not finite", p)));
            }
            if log_axis && *p <= 0.0 {
                return Err(ForestError::Config(format!(
                    "tick position {} is not positive on a log axis",
                    p
                )));
            }
        }

        if let Some(pair) = self.positions.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForestError::Config(format!(
                "tick positions must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }

        let labels = match &self.labels {
            Some(labels) if labels.len() != self.positions.len() => {
                return Err(ForestError::Config(format!(
                    "{} tick labels for {} tick positions",
                    labels.len(),
                    self.positions.len()
                )));
            }
            Some(labels) => labels.clone(),
            None => self.positions.iter().map(|p| tick_label(*p)).collect(),
        };

        Ok(self
            .positions
            .iter()
            .zip(labels)
            .map(|(position, label)| AxisTick {
                position: *position,
                label,
            })
            .collect())
    }
}

/// Shortest display form of a tick position
pub fn tick_label(position: f64) -> String {
    format!("{}", position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ticks() {
        let ticks = TickSpec::default().build(true).unwrap();
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["0.02", "1", "4", "16", "64", "256", "1000"]);
        assert_eq!(ticks[0].position, 0.02);
        assert_eq!(ticks[6].position, 1000.0);
    }

    #[test]
    fn test_custom_labels() {
        let ticks = TickSpec::new(vec![0.5, 1.0, 2.0])
            .with_labels(vec!["½".into(), "1".into(), "2".into()])
            .build(true)
            .unwrap();
        assert_eq!(ticks[0].label, "½");
    }

    #[test]
    fn test_label_count_mismatch() {
        let err = TickSpec::new(vec![1.0, 2.0])
            .with_labels(vec!["1".into()])
            .build(true)
            .unwrap_err();
        assert!(err.to_string().contains("1 tick labels for 2 tick positions"));
    }

    #[test]
    fn test_non_positive_rejected_on_log_axis() {
        let spec = TickSpec::new(vec![0.0, 1.0, 2.0]);
        assert!(spec.build(true).is_err());
        assert!(spec.build(false).is_ok());
    }

    #[test]
    fn test_unsorted_rejected() {
        assert!(TickSpec::new(vec![1.0, 4.0, 2.0]).build(true).is_err());
        assert!(TickSpec::new(vec![1.0, 1.0]).build(true).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert!(TickSpec::new(vec![]).build(true).is_err());
    }
}
