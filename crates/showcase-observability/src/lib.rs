//! Observability for the rendering strategies showcase.
//!
//! This crate provides:
//! - `derive_metrics` / `Metrics` - Descriptive values from one completed fetch
//! - `format_kilobytes` - Payload size label
//! - `init_logging` - `tracing` subscriber setup

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
