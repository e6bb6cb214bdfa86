//! Core types for the rendering strategies showcase.
//!
//! This crate provides:
//! - `ShowcaseConfig` - Endpoint, fetch, and build configuration
//! - `ListingEndpoint` - Resolved endpoint handed to a fetch controller
//! - `RequestId` - Identifier correlating a mount with its request
//! - `TimingContext` - Elapsed-time tracking for a single fetch

mod config;
mod context;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
