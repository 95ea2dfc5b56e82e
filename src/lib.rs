//! Forest Plot Preparation Library
//!
//! Turns effect-size rows (studies, subgroup subtitles, pooled summaries)
//! into a render-ready forest plot specification: text table, intervals,
//! box sizes, log axis ticks and presentation parameters.

pub mod config;
pub mod forest;
pub mod pipeline;
