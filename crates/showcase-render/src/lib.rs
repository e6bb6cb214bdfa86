//! Render surface and pages for the rendering strategies showcase.
//!
//! This crate provides:
//! - `RenderSurface` - Owns one mount's fetch state and metrics
//! - `RenderStrategy` / `CachePolicy` - The three strategies and their headers
//! - Page builders for the client-fetched, build-time, and static pages

mod html;
mod pages;
mod strategy;
mod surface;

pub use html::{html_escape, CardStyle, EMPTY_MESSAGE, FALLBACK_MESSAGE};
pub use pages::*;
pub use strategy::*;
pub use surface::*;
