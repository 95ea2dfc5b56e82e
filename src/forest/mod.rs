//! Forest plot data preparation
//!
//! Structure:
//! - `record.rs`: raw rows, normalization and row validation
//! - `weights.rs`: weight → box size scaling
//! - `table_text.rs`: text table with role-dependent blanking
//! - `ticks.rs`: log axis ticks
//! - `plot_spec.rs`: render-ready specification
//! - `dataframe.rs`: Polars DataFrame input
//! - `properties.rs`: property registry (forest.json) and reader
//! - `error.rs`: Error types

pub mod dataframe;
pub mod error;
pub mod plot_spec;
pub mod properties;
pub mod record;
pub mod table_text;
pub mod ticks;
pub mod weights;

// Re-exports for convenience
pub use error::{ForestError, Result, RowError, RowErrorKind, ValidationReport};
pub use plot_spec::{IntervalRow, PlotSpec};
pub use record::{NormalizedRecord, RawRow, RawValue};
