//! Cancellable listing fetch.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use showcase_core::{ListingEndpoint, RequestId, TimingContext};
use tokio::sync::Notify;
use tracing::Instrument;

use crate::error::FetchError;
use crate::product::ProductListing;
use crate::transport::{CacheMode, Transport};

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

struct CancelState {
    phase: AtomicU8,
    notify: Notify,
}

/// Cancellation token shared between a mount and its in-flight fetch.
///
/// The phase moves out of pending exactly once: either the fetch completes
/// (and may run a callback) or the owner cancels (and no callback runs).
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

impl CancelHandle {
    /// Create a handle in the pending phase.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelState {
                phase: AtomicU8::new(PENDING),
                notify: Notify::new(),
            }),
        }
    }

    /// Cancel the fetch.
    ///
    /// Idempotent, and a no-op once the fetch has completed. Returns true
    /// only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        let won = self
            .inner
            .phase
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.inner.notify.notify_waiters();
        }
        won
    }

    /// Whether `cancel` won against completion.
    pub fn is_cancelled(&self) -> bool {
        self.inner.phase.load(Ordering::Acquire) == CANCELLED
    }

    /// Whether the fetch has completed (successfully or not).
    pub fn is_completed(&self) -> bool {
        self.inner.phase.load(Ordering::Acquire) == COMPLETED
    }

    /// Resolve once the handle is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Claim the right to report a result. False if already cancelled.
    fn try_complete(&self) -> bool {
        self.inner
            .phase
            .compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self.inner.phase.load(Ordering::Acquire) {
            PENDING => "pending",
            COMPLETED => "completed",
            _ => "cancelled",
        };
        f.debug_struct("CancelHandle").field("phase", &phase).finish()
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Decoded products.
    pub listing: ProductListing,
    /// Milliseconds from invocation to decoded body.
    pub elapsed_ms: u64,
    /// Raw response body, kept for size measurement.
    pub body: Vec<u8>,
}

impl FetchOutcome {
    /// Size of the response body in bytes.
    pub fn payload_bytes(&self) -> usize {
        self.body.len()
    }
}

/// Issues the listing request for one mount.
///
/// The endpoint is fixed at construction. `start_fetch` consumes the
/// controller, so a mount can have at most one request in flight.
pub struct FetchController {
    endpoint: ListingEndpoint,
    transport: Arc<dyn Transport>,
    cache: CacheMode,
    request_id: RequestId,
}

impl FetchController {
    /// Create a controller that always goes to origin.
    pub fn new(endpoint: ListingEndpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            cache: CacheMode::NoStore,
            request_id: RequestId::generate(),
        }
    }

    /// Override the transport cache mode.
    pub fn with_cache_mode(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Fetch and decode the listing, racing the request against `cancel`.
    ///
    /// Returns `FetchError::Cancelled` if the handle is cancelled before the
    /// response is decoded.
    pub async fn fetch(&self, cancel: &CancelHandle) -> Result<FetchOutcome, FetchError> {
        self.fetch_timed(cancel, TimingContext::new()).await
    }

    /// `fetch`, with elapsed time measured from `timing`'s start.
    async fn fetch_timed(
        &self,
        cancel: &CancelHandle,
        timing: TimingContext,
    ) -> Result<FetchOutcome, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        tracing::info!(url = %self.endpoint.url, cache = ?self.cache, "listing fetch started");

        let request = self.transport.get(&self.endpoint.url, self.cache);
        let deadline = self.endpoint.timeout;
        let bounded = async move {
            match deadline {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .map_err(|_| FetchError::Timeout(format!("no response after {:?}", limit)))?,
                None => request.await,
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = bounded => result?,
        };

        let response = response.error_for_status(&self.endpoint.url)?;
        let listing = ProductListing::from_json(response.bytes())?;
        let elapsed_ms = timing.elapsed_ms();

        tracing::info!(
            items = listing.len(),
            elapsed_ms,
            payload_bytes = response.body.len(),
            "listing fetch succeeded"
        );

        Ok(FetchOutcome {
            listing,
            elapsed_ms,
            body: response.body,
        })
    }

    /// Start the fetch on the current tokio runtime.
    ///
    /// Exactly one of the callbacks runs, at most once, and neither runs if
    /// the returned handle is cancelled before the result is claimed.
    /// `on_success` receives the listing, elapsed milliseconds, and payload
    /// size in bytes.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_fetch<S, F>(self, on_success: S, on_failure: F) -> CancelHandle
    where
        S: FnOnce(ProductListing, u64, usize) + Send + 'static,
        F: FnOnce(FetchError) + Send + 'static,
    {
        let timing = TimingContext::new();
        let handle = CancelHandle::new();
        let task_handle = handle.clone();
        let span = tracing::info_span!("listing_fetch", request_id = %self.request_id);

        tokio::spawn(
            async move {
                let result = self.fetch_timed(&task_handle, timing).await;

                if matches!(result, Err(FetchError::Cancelled)) {
                    tracing::debug!("listing fetch cancelled before completion");
                    return;
                }
                if !task_handle.try_complete() {
                    tracing::debug!("listing result discarded after cancellation");
                    return;
                }

                match result {
                    Ok(outcome) => {
                        let payload_bytes = outcome.payload_bytes();
                        on_success(outcome.listing, outcome.elapsed_ms, payload_bytes);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "listing fetch failed");
                        on_failure(error);
                    }
                }
            }
            .instrument(span),
        );

        handle
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use http::StatusCode;
    use tokio::sync::oneshot;

    use super::*;
    use crate::transport::FixtureTransport;

    const THREE_PRODUCTS: &str = r#"{"products": [
        {"id": 1, "title": "A", "price": 1.0, "description": "a", "thumbnail": "t1"},
        {"id": 2, "title": "B", "price": 2.0, "description": "b", "thumbnail": "t2"},
        {"id": 3, "title": "C", "price": 3.0, "description": "c", "thumbnail": "t3"}
    ]}"#;

    fn controller(transport: Arc<FixtureTransport>) -> FetchController {
        FetchController::new(ListingEndpoint::new("http://fixture/products?limit=50"), transport)
    }

    #[tokio::test]
    async fn test_fetch_success_reports_listing_and_size() {
        let transport = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let outcome = controller(transport.clone())
            .fetch(&CancelHandle::new())
            .await
            .unwrap();

        assert_eq!(outcome.listing.len(), 3);
        assert_eq!(outcome.payload_bytes(), THREE_PRODUCTS.len());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.last_cache_mode(), Some(CacheMode::NoStore));
    }

    #[tokio::test]
    async fn test_fetch_maps_status_failure() {
        let transport = Arc::new(FixtureTransport::status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "oops",
        ));
        let err = controller(transport).fetch(&CancelHandle::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_respects_deadline() {
        let transport =
            Arc::new(FixtureTransport::json(THREE_PRODUCTS).with_delay(Duration::from_secs(5)));
        let endpoint =
            ListingEndpoint::new("http://fixture/products").with_timeout(Duration::from_millis(20));
        let err = FetchController::new(endpoint, transport)
            .fetch(&CancelHandle::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_with_cancelled_handle_skips_request() {
        let transport = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let handle = CancelHandle::new();
        handle.cancel();

        let err = controller(transport.clone()).fetch(&handle).await.unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_start_fetch_invokes_success_once() {
        let transport = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let (tx, rx) = oneshot::channel();

        let handle = controller(transport).start_fetch(
            move |listing, elapsed_ms, payload_bytes| {
                let _ = tx.send((listing.len(), elapsed_ms, payload_bytes));
            },
            |error| panic!("unexpected failure: {error}"),
        );

        let (items, _elapsed, bytes) = rx.await.unwrap();
        assert_eq!(items, 3);
        assert_eq!(bytes, THREE_PRODUCTS.len());
        assert!(handle.is_completed());
    }

    #[tokio::test]
    async fn test_elapsed_counts_from_start_fetch_call() {
        let transport = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let (tx, rx) = oneshot::channel();

        controller(transport).start_fetch(
            move |_, elapsed_ms, _| {
                let _ = tx.send(elapsed_ms);
            },
            |error| panic!("unexpected failure: {error}"),
        );

        // Blocks the single-threaded runtime, so the spawned task cannot
        // start until this returns.
        std::thread::sleep(Duration::from_millis(40));

        assert!(rx.await.unwrap() >= 40);
    }

    #[tokio::test]
    async fn test_start_fetch_reports_network_failure() {
        let transport = Arc::new(FixtureTransport::unreachable("dns lookup failed"));
        let (tx, rx) = oneshot::channel();

        controller(transport).start_fetch(
            |_, _, _| panic!("unexpected success"),
            move |error| {
                let _ = tx.send(error);
            },
        );

        assert!(matches!(rx.await.unwrap(), FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_cancel_in_flight_suppresses_callbacks() {
        let transport =
            Arc::new(FixtureTransport::json(THREE_PRODUCTS).with_delay(Duration::from_millis(200)));
        let calls = Arc::new(AtomicUsize::new(0));
        let on_success = calls.clone();
        let on_failure = calls.clone();

        let handle = controller(transport.clone()).start_fetch(
            move |_, _, _| {
                on_success.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                on_failure.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.cancel());
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_twice_and_after_completion_is_noop() {
        let transport = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let (tx, rx) = oneshot::channel();

        let handle = controller(transport).start_fetch(
            move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(());
            },
            |_| {},
        );
        rx.await.unwrap();

        assert!(!handle.cancel());
        assert!(!handle.cancel());
        assert!(!handle.is_cancelled());
        assert!(handle.is_completed());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_while_pending() {
        let handle = CancelHandle::new();
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(handle.is_cancelled());
        assert!(!handle.try_complete());
        handle.cancelled().await;
    }

    #[tokio::test]
    async fn test_independent_mounts_do_not_share_handles() {
        let slow =
            Arc::new(FixtureTransport::json(THREE_PRODUCTS).with_delay(Duration::from_millis(200)));
        let fast = Arc::new(FixtureTransport::json(THREE_PRODUCTS));
        let (tx, rx) = oneshot::channel();

        let first = controller(slow).start_fetch(|_, _, _| {}, |_| {});
        first.cancel();

        let second = controller(fast).start_fetch(
            move |listing, _, _| {
                let _ = tx.send(listing.len());
            },
            |_| {},
        );

        assert_eq!(rx.await.unwrap(), 3);
        assert!(first.is_cancelled());
        assert!(second.is_completed());
    }
}
