//! Mount the client-fetched page and report what it shows.

use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Serialize;
use showcase_data::{FailureKind, FetchController};
use showcase_observability::Metrics;
use showcase_render::{client_fetched_page, RenderSurface, View};

use super::CsrArgs;
use crate::context::Context;
use crate::output::state_badge;

#[derive(Serialize)]
struct CsrReport<'a> {
    request_id: Option<&'a str>,
    url: &'a str,
    state: &'static str,
    items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<&'a Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_to_interactive_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
}

/// Run the csr command.
pub async fn run(args: CsrArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(limit) = args.limit {
        config.fetch.limit = limit;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.fetch.timeout_ms = Some(timeout_ms);
    }
    config.validate().context("Invalid configuration")?;

    let endpoint = config.listing_endpoint().context("Invalid configuration")?;
    let url = endpoint.url.clone();
    let transport = ctx.transport(args.fixture.as_deref())?;

    ctx.output.header("Client-fetched page");
    ctx.output.kv("Endpoint", &url);

    let mut surface = RenderSurface::new();
    surface.mount(FetchController::new(endpoint, transport));

    if let Some(handle) = surface.cancel_handle() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && handle.cancel() {
                tracing::info!("fetch cancelled by interrupt");
            }
        });
    }

    let spinner = ctx.output.spinner("Fetching products from API...");
    match args.cancel_after_ms {
        Some(ms) => {
            surface.settle_or_teardown(Duration::from_millis(ms)).await;
        }
        None => {
            surface.settle().await;
        }
    }
    spinner.finish_and_clear();

    let written_to = match &args.out {
        Some(out) => {
            let path = ctx.resolve_path(out);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let page = client_fetched_page(&surface);
            std::fs::write(&path, &page.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let state = surface.state();
    let items = state.listing().map_or(0, |l| l.len());
    let failure = match state {
        showcase_data::FetchState::Failed(kind) => Some(*kind),
        _ => None,
    };

    if ctx.output.is_json() {
        ctx.output.json(&CsrReport {
            request_id: surface.request_id().map(|id| id.as_str()),
            url: &url,
            state: state.label(),
            items,
            failure,
            metrics: surface.metrics(),
            time_to_interactive_ms: surface.metrics().map(|m| m.time_to_interactive_ms()),
            written_to,
        });
        return Ok(());
    }

    ctx.output.kv("State", &state_badge(state.label()));
    match surface.view() {
        View::Loading => ctx.output.warn("Page torn down before the listing arrived"),
        View::Grid(listing) => {
            ctx.output.success(&format!("Rendered {} products", listing.len()));
            for product in listing.iter().take(5) {
                ctx.output
                    .list_item(&format!("#{} {} (${})", product.id, product.title, product.price));
            }
            if listing.len() > 5 {
                ctx.output.list_item(&format!("... and {} more", listing.len() - 5));
            }
        }
        View::Empty => ctx.output.info(showcase_render::EMPTY_MESSAGE),
        View::Fallback => {
            if let Some(kind) = failure {
                ctx.output.warn(&format!("Fetch failed ({})", kind));
            }
            ctx.output.info(showcase_render::FALLBACK_MESSAGE);
        }
    }

    if let Some(metrics) = surface.metrics() {
        ctx.output.header("Metrics");
        ctx.output.kv("Total Load Time", &format!("{}ms", metrics.elapsed_ms));
        ctx.output.kv("Time to interactive", &format!("~{}ms", metrics.time_to_interactive_ms()));
        ctx.output.kv("Data Transfer", &metrics.payload_size_kb);
        ctx.output.kv("API Requests", &metrics.request_count.to_string());
    }

    if let Some(path) = written_to {
        ctx.output.success(&format!("Wrote {}", path));
    }

    Ok(())
}
