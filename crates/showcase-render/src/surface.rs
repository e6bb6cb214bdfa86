//! Render surface for the client-fetched page.

use std::time::Duration;

use showcase_core::RequestId;
use showcase_data::{CancelHandle, FetchController, FetchError, FetchState, ProductListing};
use showcase_observability::Metrics;
use tokio::sync::mpsc;

use crate::html;

/// Result delivered from the fetch task back to the surface.
#[derive(Debug)]
enum Completion {
    Loaded {
        listing: ProductListing,
        elapsed_ms: u64,
        payload_bytes: usize,
    },
    Failed(FetchError),
}

/// What the surface currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    /// Loading indicator.
    Loading,
    /// Product card grid.
    Grid(&'a ProductListing),
    /// Fetch succeeded with zero products.
    Empty,
    /// Fetch failed; static fallback message.
    Fallback,
}

/// Owns the fetch state and metrics of one mount.
///
/// The fetch task never touches this state directly. It sends a single
/// completion event, which `settle` applies. After `teardown` (or drop) the
/// in-flight request is cancelled and no event is applied.
#[derive(Debug, Default)]
pub struct RenderSurface {
    request_id: Option<RequestId>,
    state: FetchState,
    metrics: Option<Metrics>,
    cancel: Option<CancelHandle>,
    completion: Option<mpsc::UnboundedReceiver<Completion>>,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the surface and start its fetch.
    ///
    /// Returns false, leaving the controller unused, if this surface has
    /// already been mounted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn mount(&mut self, controller: FetchController) -> bool {
        if !self.state.begin() {
            return false;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let failure_tx = tx.clone();
        self.request_id = Some(controller.request_id().clone());

        let handle = controller.start_fetch(
            move |listing, elapsed_ms, payload_bytes| {
                let _ = tx.send(Completion::Loaded {
                    listing,
                    elapsed_ms,
                    payload_bytes,
                });
            },
            move |error| {
                let _ = failure_tx.send(Completion::Failed(error));
            },
        );

        self.cancel = Some(handle);
        self.completion = Some(rx);
        true
    }

    /// Wait for the fetch to finish and apply its result.
    ///
    /// If the fetch was cancelled the state stays `Loading`.
    pub async fn settle(&mut self) -> &FetchState {
        if let Some(mut rx) = self.completion.take() {
            let event = rx.recv().await;
            self.apply(event);
        }
        &self.state
    }

    /// Like `settle`, but tears the surface down if no result arrives
    /// within `budget`.
    pub async fn settle_or_teardown(&mut self, budget: Duration) -> &FetchState {
        if let Some(mut rx) = self.completion.take() {
            match tokio::time::timeout(budget, rx.recv()).await {
                Ok(event) => self.apply(event),
                Err(_) => {
                    tracing::info!(?budget, "tearing down before the fetch settled");
                    self.teardown();
                }
            }
        }
        &self.state
    }

    /// Cancel any in-flight request and stop accepting its result.
    pub fn teardown(&mut self) {
        if let Some(handle) = &self.cancel {
            if handle.cancel() {
                tracing::debug!(
                    request_id = ?self.request_id,
                    "in-flight fetch cancelled on teardown"
                );
            }
        }
        self.completion = None;
    }

    fn apply(&mut self, event: Option<Completion>) {
        match event {
            Some(Completion::Loaded {
                listing,
                elapsed_ms,
                payload_bytes,
            }) => {
                let metrics = Metrics::from_payload_size(payload_bytes as u64, elapsed_ms);
                if self.state.succeed(listing) {
                    self.metrics = Some(metrics);
                }
            }
            Some(Completion::Failed(error)) => {
                if let Some(kind) = error.failure_kind() {
                    self.state.fail(kind);
                }
            }
            None => {
                tracing::debug!("fetch ended without a result");
            }
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Metrics of the successful fetch, if any.
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Handle for cancelling the in-flight fetch from elsewhere, e.g. a
    /// signal handler. `None` before mount.
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.cancel.clone()
    }

    /// Classify the current state for rendering.
    pub fn view(&self) -> View<'_> {
        match &self.state {
            FetchState::Idle | FetchState::Loading => View::Loading,
            FetchState::Succeeded(listing) if listing.is_empty() => View::Empty,
            FetchState::Succeeded(listing) => View::Grid(listing),
            FetchState::Failed(_) => View::Fallback,
        }
    }

    /// Render the listing area for the current state.
    pub fn render_html(&self) -> String {
        match self.view() {
            View::Loading => html::render_loading(),
            View::Grid(listing) => html::render_grid(listing, html::CardStyle::ClientFetched),
            View::Empty => html::render_notice(html::EMPTY_MESSAGE),
            View::Fallback => html::render_notice(html::FALLBACK_MESSAGE),
        }
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::StatusCode;
    use showcase_core::ListingEndpoint;
    use showcase_data::{FailureKind, FixtureTransport};

    use super::*;

    fn body_with(n: usize) -> String {
        let products: Vec<String> = (1..=n)
            .map(|id| {
                format!(
                    r#"{{"id": {id}, "title": "Item {id}", "price": 12.5, "description": "d", "thumbnail": "https://cdn/{id}.png"}}"#
                )
            })
            .collect();
        format!(r#"{{"products": [{}]}}"#, products.join(","))
    }

    fn mount(surface: &mut RenderSurface, transport: FixtureTransport) -> Arc<FixtureTransport> {
        let transport = Arc::new(transport);
        let endpoint = ListingEndpoint::new("http://fixture/products");
        let controller = FetchController::new(endpoint, transport.clone());
        assert!(surface.mount(controller));
        transport
    }

    #[tokio::test]
    async fn test_success_moves_to_grid_with_metrics() {
        let body = body_with(50);
        let mut surface = RenderSurface::new();
        assert_eq!(surface.view(), View::Loading);

        mount(&mut surface, FixtureTransport::json(body.clone()));
        assert!(surface.state().is_loading());

        surface.settle().await;
        assert_eq!(surface.state().listing().map(|l| l.len()), Some(50));
        assert!(matches!(surface.view(), View::Grid(l) if l.len() == 50));

        let metrics = surface.metrics().unwrap();
        assert_eq!(metrics.payload_bytes, body.len() as u64);
        assert_eq!(metrics.request_count, 1);

        let html = surface.render_html();
        assert!(html.contains("Item 50"));
        assert!(!html.contains(html::FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_zero_items_is_empty_not_fallback() {
        let mut surface = RenderSurface::new();
        mount(&mut surface, FixtureTransport::json(r#"{"products": []}"#));

        surface.settle().await;
        assert_eq!(surface.view(), View::Empty);

        let html = surface.render_html();
        assert!(html.contains(html::EMPTY_MESSAGE));
        assert!(!html.contains(html::FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_status_failure_renders_fallback() {
        let mut surface = RenderSurface::new();
        mount(
            &mut surface,
            FixtureTransport::status(StatusCode::NOT_FOUND, "missing"),
        );

        surface.settle().await;
        assert_eq!(surface.state(), &FetchState::Failed(FailureKind::HttpStatus(404)));
        assert_eq!(surface.view(), View::Fallback);
        assert!(surface.metrics().is_none());
        assert!(surface.render_html().contains(html::FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_decode_failure_renders_fallback() {
        let mut surface = RenderSurface::new();
        mount(&mut surface, FixtureTransport::json("<!doctype html>"));

        surface.settle().await;
        assert_eq!(surface.state(), &FetchState::Failed(FailureKind::Decode));
        assert_eq!(surface.view(), View::Fallback);
    }

    #[tokio::test]
    async fn test_teardown_before_response_keeps_loading() {
        let mut surface = RenderSurface::new();
        let transport = mount(
            &mut surface,
            FixtureTransport::json(body_with(3)).with_delay(Duration::from_millis(200)),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        surface.teardown();
        surface.settle().await;

        assert!(surface.state().is_loading());
        assert!(surface.metrics().is_none());
        assert_eq!(transport.request_count(), 1);

        // A second teardown after the fact is a no-op.
        tokio::time::sleep(Duration::from_millis(300)).await;
        surface.teardown();
        assert!(surface.state().is_loading());
    }

    #[tokio::test]
    async fn test_settle_or_teardown_gives_up_on_slow_fetch() {
        let mut surface = RenderSurface::new();
        mount(
            &mut surface,
            FixtureTransport::json(body_with(3)).with_delay(Duration::from_secs(5)),
        );

        let state = surface.settle_or_teardown(Duration::from_millis(30)).await;
        assert!(state.is_loading());
        assert_eq!(surface.view(), View::Loading);
    }

    #[tokio::test]
    async fn test_teardown_after_success_changes_nothing() {
        let mut surface = RenderSurface::new();
        mount(&mut surface, FixtureTransport::json(body_with(2)));

        surface.settle().await;
        surface.teardown();
        surface.teardown();

        assert_eq!(surface.state().listing().map(|l| l.len()), Some(2));
        assert!(surface.metrics().is_some());
    }

    #[tokio::test]
    async fn test_mount_only_once() {
        let mut surface = RenderSurface::new();
        let transport = mount(&mut surface, FixtureTransport::json(body_with(1)));

        let again = FetchController::new(ListingEndpoint::new("http://fixture"), transport.clone());
        assert!(!surface.mount(again));

        surface.settle().await;
        assert_eq!(transport.request_count(), 1);
    }
}
