use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use showcase_core::ListingEndpoint;
use showcase_data::{CancelHandle, FetchController, FetchError, HttpTransport, Transport};
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/products", get(products))
            .route("/empty", get(|| async { axum::Json(json!({ "total": 0 })) }))
            .route(
                "/broken",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route("/slow", get(slow));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn controller(&self, path: &str) -> FetchController {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new().unwrap());
        FetchController::new(
            ListingEndpoint::new(format!("{}{}", self.base_url, path)),
            transport,
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: usize,
}

/// Serves `limit` products, but only to requests that bypass caches.
async fn products(Query(query): Query<LimitQuery>, headers: HeaderMap) -> impl IntoResponse {
    let no_store = headers
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == "no-store");
    if !no_store {
        return (StatusCode::BAD_REQUEST, "expected cache-control: no-store").into_response();
    }

    let products: Vec<_> = (1..=query.limit)
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Product {}", id),
                "price": 9.5,
                "description": "From the test server",
                "thumbnail": format!("https://cdn.test/{}.png", id),
            })
        })
        .collect();
    axum::Json(json!({ "products": products, "total": query.limit })).into_response()
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    axum::Json(json!({ "products": [] }))
}

#[tokio::test]
async fn fetch_decodes_listing_with_no_store() {
    let srv = TestServer::spawn().await;

    let outcome = srv
        .controller("/products?limit=50")
        .fetch(&CancelHandle::new())
        .await
        .unwrap();

    assert_eq!(outcome.listing.len(), 50);
    assert!(outcome.payload_bytes() > 0);
    assert_eq!(outcome.listing.as_slice()[49].id, 50);
}

#[tokio::test]
async fn missing_products_field_is_an_empty_listing() {
    let srv = TestServer::spawn().await;

    let outcome = srv.controller("/empty").fetch(&CancelHandle::new()).await.unwrap();
    assert!(outcome.listing.is_empty());
}

#[tokio::test]
async fn non_success_status_is_reported_to_on_failure() {
    let srv = TestServer::spawn().await;
    let (tx, rx) = oneshot::channel();

    srv.controller("/broken").start_fetch(
        |_, _, _| panic!("unexpected success"),
        move |error| {
            let _ = tx.send(error);
        },
    );

    match rx.await.unwrap() {
        FetchError::HttpStatus { status, url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/broken"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new().unwrap());
    let err = FetchController::new(
        ListingEndpoint::new(format!("http://{}/products", addr)),
        transport,
    )
    .fetch(&CancelHandle::new())
    .await
    .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn cancelling_a_slow_request_returns_promptly() {
    let srv = TestServer::spawn().await;
    let controller = srv.controller("/slow");
    let handle = CancelHandle::new();

    let canceller = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = controller.fetch(&handle).await.unwrap_err();

    assert!(err.is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn deadline_turns_slow_response_into_timeout() {
    let srv = TestServer::spawn().await;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new().unwrap());
    let endpoint = ListingEndpoint::new(format!("{}/slow", srv.base_url))
        .with_timeout(Duration::from_millis(100));

    let err = FetchController::new(endpoint, transport)
        .fetch(&CancelHandle::new())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)));
}
