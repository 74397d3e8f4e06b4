//! HTTP handler implementations, grouped by resource.

pub mod imports;
pub mod ml_metrics;
