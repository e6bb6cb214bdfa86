//! Loading lifecycle for one mount.

use std::fmt;

use serde::Serialize;

use crate::product::ProductListing;

/// Why a fetch ended in `Failed`. Every kind renders the same fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    HttpStatus(u16),
    Decode,
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::HttpStatus(code) => write!(f, "http {}", code),
            Self::Decode => write!(f, "decode"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Fetch lifecycle.
///
/// Idle → Loading → (Succeeded | Failed). There is no path back to Idle and
/// a terminal state is never left.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Succeeded(ProductListing),
    Failed(FailureKind),
}

impl FetchState {
    /// Idle → Loading. Returns false if the state was not Idle.
    pub fn begin(&mut self) -> bool {
        if matches!(self, Self::Idle) {
            *self = Self::Loading;
            true
        } else {
            false
        }
    }

    /// Loading → Succeeded. Returns false if the state was not Loading.
    pub fn succeed(&mut self, listing: ProductListing) -> bool {
        if matches!(self, Self::Loading) {
            *self = Self::Succeeded(listing);
            true
        } else {
            false
        }
    }

    /// Loading → Failed. Returns false if the state was not Loading.
    pub fn fail(&mut self, kind: FailureKind) -> bool {
        if matches!(self, Self::Loading) {
            *self = Self::Failed(kind);
            true
        } else {
            false
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The listing, once the fetch has succeeded.
    pub fn listing(&self) -> Option<&ProductListing> {
        match self {
            Self::Succeeded(listing) => Some(listing),
            _ => None,
        }
    }

    /// Short label for logs and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}
