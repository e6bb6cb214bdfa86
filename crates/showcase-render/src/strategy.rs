//! Rendering strategies and their cache policies.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One year, the conventional lifetime for immutable static assets.
const IMMUTABLE_MAX_AGE: Duration = Duration::from_secs(31_536_000);

/// Cache scope determining who can cache the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Cacheable by CDN and browser (shared cache).
    Public,
    /// No caching.
    #[default]
    None,
}

impl CacheScope {
    /// Get the Cache-Control directive for this scope.
    pub fn cache_control_directive(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::None => "no-store",
        }
    }
}

/// Cache policy advertised for a page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Cache scope.
    pub scope: CacheScope,
    /// Browser and CDN lifetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<Duration>,
    /// CDN-only lifetime, i.e. the revalidation window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_max_age: Option<Duration>,
    /// Stale-while-revalidate window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_while_revalidate: Option<Duration>,
    /// Content never changes for this URL.
    pub immutable: bool,
}

impl CachePolicy {
    /// Always go to origin.
    pub fn no_store() -> Self {
        Self::default()
    }

    /// Shared caches serve the page and refresh it in the background once
    /// `window` has passed.
    pub fn revalidate(window: Duration) -> Self {
        Self {
            scope: CacheScope::Public,
            shared_max_age: Some(window),
            stale_while_revalidate: Some(window),
            ..Default::default()
        }
    }

    /// Cache forever.
    pub fn immutable() -> Self {
        Self {
            scope: CacheScope::Public,
            max_age: Some(IMMUTABLE_MAX_AGE),
            immutable: true,
            ..Default::default()
        }
    }

    /// Generate Cache-Control header value.
    pub fn cache_control_header(&self) -> String {
        if self.scope == CacheScope::None {
            return CacheScope::None.cache_control_directive().to_string();
        }

        let mut parts = vec![self.scope.cache_control_directive().to_string()];

        if let Some(max_age) = self.max_age {
            parts.push(format!("max-age={}", max_age.as_secs()));
        }

        if let Some(s_maxage) = self.shared_max_age {
            parts.push(format!("s-maxage={}", s_maxage.as_secs()));
        }

        if let Some(swr) = self.stale_while_revalidate {
            parts.push(format!("stale-while-revalidate={}", swr.as_secs()));
        }

        if self.immutable {
            parts.push("immutable".to_string());
        }

        parts.join(", ")
    }
}

/// The three page rendering strategies compared by the showcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Fetched in the client after the page loads.
    ClientFetched,
    /// Fetched once at build time and revalidated on a schedule.
    BuildTime,
    /// Fully static, no data fetch.
    Static,
}

impl RenderStrategy {
    /// All strategies, in presentation order.
    pub const ALL: [RenderStrategy; 3] = [Self::ClientFetched, Self::BuildTime, Self::Static];

    /// URL path segment and output file stem.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ClientFetched => "csr",
            Self::BuildTime => "ssg",
            Self::Static => "static",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ClientFetched => "Client-Side Rendering (CSR)",
            Self::BuildTime => "Static Site Generation (SSG)",
            Self::Static => "Static Only",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Self::ClientFetched => "Products load after JavaScript executes in the browser",
            Self::BuildTime => {
                "Products delivered instantly from cache - No API calls on page load"
            }
            Self::Static => "Fully static HTML with zero API calls",
        }
    }

    /// Bullet points shown on the index page.
    pub fn highlights(&self) -> [&'static str; 4] {
        match self {
            Self::ClientFetched => [
                "Renders in browser after page load",
                "Shows loading states",
                "Good for user-specific content",
                "SEO challenges",
            ],
            Self::BuildTime => [
                "Pre-built at build time",
                "Instant page loads",
                "CDN cacheable",
                "Best for SEO",
            ],
            Self::Static => [
                "Fully static HTML",
                "Zero API calls",
                "Maximum performance",
                "Perfect for CDNs",
            ],
        }
    }

    /// Cache policy for this strategy's page.
    pub fn cache_policy(&self, revalidate: Duration) -> CachePolicy {
        match self {
            Self::ClientFetched => CachePolicy::no_store(),
            Self::BuildTime => CachePolicy::revalidate(revalidate),
            Self::Static => CachePolicy::immutable(),
        }
    }
}

impl fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}
