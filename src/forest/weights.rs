//! Box sizes from study weights
//!
//! Weights are log-compressed and min-max normalized so a 60% study and a
//! 0.5% study both stay readable. The header row gets no box.

/// Parameters of the weight → box size transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightScaleParams {
    /// Weight used for rows without one
    pub floor: f64,
    /// Added before the log so zero weights stay defined
    pub offset: f64,
    /// Box size of the smallest weight
    pub min_size: f64,
    /// Box size of the largest weight
    pub max_size: f64,
}

impl Default for WeightScaleParams {
    fn default() -> Self {
        Self {
            floor: 0.1,
            offset: 0.1,
            min_size: 0.15,
            max_size: 0.25,
        }
    }
}

impl WeightScaleParams {
    /// Weight that enters the log transform
    fn effective_weight(&self, weight: Option<f64>) -> f64 {
        match weight {
            Some(w) if w.is_finite() && w + self.offset > 0.0 => w,
            _ => self.floor,
        }
    }

    /// Log-transformed weights, one per row
    pub fn log_weights(&self, weights: &[Option<f64>]) -> Vec<f64> {
        weights
            .iter()
            .map(|w| (self.effective_weight(*w) + self.offset).ln())
            .collect()
    }

    /// Box sizes for every row, preceded by `None` for the header
    pub fn box_sizes(&self, weights: &[Option<f64>]) -> Vec<Option<f64>> {
        let logged = self.log_weights(weights);
        let normalized = min_max_normalize(&logged);

        std::iter::once(None)
            .chain(normalized.into_iter().map(|t| Some(self.rescale(t))))
            .collect()
    }

    /// Map a unit-interval value onto [min_size, max_size]
    fn rescale(&self, t: f64) -> f64 {
        let size = self.min_size + t * (self.max_size - self.min_size);
        size.min(self.max_size).max(self.min_size)
    }
}

/// Map values onto [0, 1] using their own min and max
///
/// When every value is equal the range is empty and all values map to 0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Box sizes with the default parameters
pub fn box_sizes(weights: &[Option<f64>]) -> Vec<Option<f64>> {
    WeightScaleParams::default().box_sizes(weights)
}
