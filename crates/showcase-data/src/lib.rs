//! Listing fetch layer with cooperative cancellation.
//!
//! This crate provides:
//! - `FetchController` - One cancellable listing request per mount
//! - `CancelHandle` - Idempotent cancellation with a one-shot completion gate
//! - `Transport` - Async seam over the HTTP client (`HttpTransport`, `FixtureTransport`)
//! - `FetchState` - Loading lifecycle owned by the render surface
//! - `Product` / `ProductListing` - Listing data model

mod client;
mod error;
mod product;
mod response;
mod state;
mod transport;

pub use client::*;
pub use error::*;
pub use product::*;
pub use response::*;
pub use state::*;
pub use transport::*;
