//! Endpoint, fetch, and build configuration.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Listing endpoint queried by the client-fetched page.
pub const DEFAULT_LISTING_URL: &str = "https://dummyjson.com/products";

/// Listing endpoint queried once when the build-time page is generated.
pub const DEFAULT_BUILD_TIME_URL: &str = "https://fakestoreapi.com/products";

/// Number of products requested per listing fetch.
pub const DEFAULT_LIMIT: u32 = 50;

/// Revalidation window advertised by the build-time page.
pub const DEFAULT_REVALIDATE_SECS: u64 = 3600;

/// Errors raised when validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    EmptyUrl { field: &'static str },

    #[error("{field} is not a valid URL ({reason}): {url}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("{field} must use http or https: {url}")]
    UnsupportedScheme { field: &'static str, url: String },

    #[error("fetch.limit must be greater than zero")]
    ZeroLimit,

    #[error("fetch.timeout_ms must be greater than zero when set")]
    ZeroTimeout,
}

/// Top-level showcase configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Upstream endpoints.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Client-side fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Build-time page settings.
    #[serde(default)]
    pub build: BuildConfig,
}

impl ShowcaseConfig {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("endpoints.listing_url", &self.endpoints.listing_url)?;
        check_url("endpoints.build_time_url", &self.endpoints.build_time_url)?;

        if self.fetch.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.fetch.timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Endpoint handed to the client-fetched page's controller.
    ///
    /// `limit` replaces any `limit` already present in the configured URL.
    pub fn listing_endpoint(&self) -> Result<ListingEndpoint, ConfigError> {
        let mut url = parse_url("endpoints.listing_url", &self.endpoints.listing_url)?;
        set_query_param(&mut url, "limit", &self.fetch.limit.to_string());
        Ok(ListingEndpoint {
            url: url.into(),
            timeout: self.fetch.timeout(),
        })
    }

    /// Endpoint fetched once for the build-time page.
    pub fn build_time_endpoint(&self) -> ListingEndpoint {
        ListingEndpoint {
            url: self.endpoints.build_time_url.clone(),
            timeout: self.fetch.timeout(),
        }
    }
}

/// Upstream endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Listing endpoint for the client-fetched page. Its `limit` query
    /// parameter is overridden by `fetch.limit`.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Listing endpoint for the build-time page.
    #[serde(default = "default_build_time_url")]
    pub build_time_url: String,
}

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_build_time_url() -> String {
    DEFAULT_BUILD_TIME_URL.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            build_time_url: default_build_time_url(),
        }
    }
}

/// Client-side fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Products requested per fetch.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Optional deadline for the whole request. Unset means the transport
    /// default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl FetchConfig {
    /// Deadline as a duration, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            timeout_ms: None,
        }
    }
}

/// Build-time page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Revalidation window in seconds.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,

    /// Directory pages are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

fn default_revalidate_secs() -> u64 {
    DEFAULT_REVALIDATE_SECS
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl BuildConfig {
    /// Revalidation window as a duration.
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            revalidate_secs: default_revalidate_secs(),
            out_dir: default_out_dir(),
        }
    }
}

/// A fully resolved listing endpoint, passed to a fetch controller at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEndpoint {
    /// Complete request URL, query string included.
    pub url: String,
    /// Optional deadline for the request.
    pub timeout: Option<Duration>,
}

impl ListingEndpoint {
    /// Create an endpoint with no deadline.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    /// Set a deadline for the request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn check_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    parse_url(field, url).map(|_| ())
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::EmptyUrl { field });
    }

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme {
            field,
            url: raw.to_string(),
        }),
    }
}

/// Set `key` to `value`, dropping any existing occurrences of `key`.
fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(key, value);
}
