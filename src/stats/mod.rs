// src/stats/mod.rs
// =============================================================================
// Aggregate statistics over a finished run: latency figures, success rate and
// the status histogram.
// =============================================================================

mod aggregate;

pub use aggregate::{aggregate, HistogramEntry, Statistics};
