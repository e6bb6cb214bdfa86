//! Descriptive metrics for a completed fetch.
//!
//! Nothing here is a live counter: the values are display labels derived
//! once from a single response.

use serde::{Deserialize, Serialize};

/// Requests issued per page load. A fixed label, not a counter.
pub const REQUEST_COUNT: u32 = 1;

/// Cache hits on the client-fetched page. Always zero.
pub const CACHE_HITS: u32 = 0;

/// Allowance added to the fetch time for script execution when showing an
/// estimated time to interactive.
pub const SCRIPT_ALLOWANCE_MS: u64 = 100;

/// Metrics for one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Milliseconds from fetch invocation to decoded body.
    pub elapsed_ms: u64,
    /// Response body size in bytes.
    pub payload_bytes: u64,
    /// Body size as shown to users, e.g. `"1.5 KB"`.
    pub payload_size_kb: String,
    /// Always `REQUEST_COUNT`.
    pub request_count: u32,
}

impl Metrics {
    /// Build metrics from an already measured payload size.
    pub fn from_payload_size(payload_bytes: u64, elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            payload_bytes,
            payload_size_kb: format_kilobytes(payload_bytes),
            request_count: REQUEST_COUNT,
        }
    }

    /// Illustrative time to interactive: fetch time plus script allowance.
    pub fn time_to_interactive_ms(&self) -> u64 {
        self.elapsed_ms.saturating_add(SCRIPT_ALLOWANCE_MS)
    }
}

/// Derive metrics from the raw response body and the measured fetch time.
///
/// Pure: identical inputs always give identical output.
pub fn derive_metrics(raw_response_bytes: &[u8], elapsed_ms: u64) -> Metrics {
    Metrics::from_payload_size(raw_response_bytes.len() as u64, elapsed_ms)
}

/// Format a byte count as kilobytes with one decimal, rounding half up.
pub fn format_kilobytes(bytes: u64) -> String {
    // Tenths of a kilobyte, rounded half up: floor(bytes * 10 / 1024 + 1/2).
    let tenths = (bytes as u128 * 10 + 512) / 1024;
    format!("{}.{} KB", tenths / 10, tenths % 10)
}
