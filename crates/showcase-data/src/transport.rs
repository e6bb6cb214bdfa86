//! Transport seam between the fetch controller and the network.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue, CACHE_CONTROL, PRAGMA};
use http::StatusCode;

use crate::error::FetchError;
use crate::response::Response;

/// Transport-level caching directive for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Always go to origin.
    #[default]
    NoStore,
    /// Leave caching to the transport and intermediaries.
    Default,
}

impl CacheMode {
    /// Request headers implementing this mode.
    pub fn request_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        match self {
            Self::NoStore => vec![
                (CACHE_CONTROL, HeaderValue::from_static("no-store")),
                (PRAGMA, HeaderValue::from_static("no-cache")),
            ],
            Self::Default => Vec::new(),
        }
    }
}

/// Issues a single GET and buffers the response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, cache: CacheMode) -> Result<Response, FetchError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default client settings.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("showcase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, cache: CacheMode) -> Result<Response, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in cache.request_headers() {
            request = request.header(name, value);
        }

        let resp = request.send().await?;

        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        Ok(Response::new(status, body))
    }
}

#[derive(Debug)]
enum FixtureReply {
    Respond { status: StatusCode, body: Vec<u8> },
    Unreachable(String),
}

/// In-memory transport serving one canned reply, for offline runs and tests.
#[derive(Debug)]
pub struct FixtureTransport {
    reply: FixtureReply,
    delay: Option<Duration>,
    requests: AtomicUsize,
    last_cache_mode: Mutex<Option<CacheMode>>,
}

impl FixtureTransport {
    /// Answer 200 with the given JSON body.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::status(StatusCode::OK, body)
    }

    /// Answer with an arbitrary status and body.
    pub fn status(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::from_reply(FixtureReply::Respond {
            status,
            body: body.into(),
        })
    }

    /// Fail every request with a network error.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::from_reply(FixtureReply::Unreachable(reason.into()))
    }

    /// Serve the contents of a JSON file with status 200.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::json(std::fs::read(path)?))
    }

    fn from_reply(reply: FixtureReply) -> Self {
        Self {
            reply,
            delay: None,
            requests: AtomicUsize::new(0),
            last_cache_mode: Mutex::new(None),
        }
    }

    /// Wait this long before replying, simulating network latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Cache mode of the most recent request.
    pub fn last_cache_mode(&self) -> Option<CacheMode> {
        self.last_cache_mode.lock().ok().and_then(|mode| *mode)
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(&self, _url: &str, cache: CacheMode) -> Result<Response, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_cache_mode.lock() {
            *last = Some(cache);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            FixtureReply::Respond { status, body } => Ok(Response::new(*status, body.clone())),
            FixtureReply::Unreachable(reason) => Err(FetchError::Network(reason.clone())),
        }
    }
}
