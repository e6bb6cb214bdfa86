//! Fetch error taxonomy.

use crate::state::FailureKind;

/// Error type for listing fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The origin answered with a non-success status.
    #[error("HTTP error: {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// The body was not a listing.
    #[error("Deserialization error: {0}")]
    Decode(String),

    /// The configured deadline elapsed.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The request was cancelled by its owner. Never reported to callers of
    /// `start_fetch`.
    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether this error is the cancellation signal rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Failure classification shown in logs; `None` for cancellation.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Network(_) => Some(FailureKind::Network),
            Self::HttpStatus { status, .. } => Some(FailureKind::HttpStatus(*status)),
            Self::Decode(_) => Some(FailureKind::Decode),
            Self::Timeout(_) => Some(FailureKind::Timeout),
            Self::Cancelled => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
