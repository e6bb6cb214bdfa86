//! Generate the build-time and static pages.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Serialize;
use showcase_data::{CacheMode, CancelHandle, FetchController};
use showcase_observability::derive_metrics;
use showcase_render::{build_time_page, index_page, static_page, Page};

use super::BuildArgs;
use crate::context::Context;

#[derive(Serialize)]
struct BuiltPage {
    file: String,
    cache_control: String,
    bytes: usize,
}

#[derive(Serialize)]
struct BuildReport {
    out_dir: String,
    built_at: String,
    items: usize,
    source_elapsed_ms: u64,
    source_size: String,
    pages: Vec<BuiltPage>,
}

/// Run the build command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(secs) = args.revalidate_secs {
        config.build.revalidate_secs = secs;
    }
    config.validate().context("Invalid configuration")?;

    let out_dir = ctx.resolve_path(args.out.as_deref().unwrap_or(&config.build.out_dir));
    let revalidate = config.build.revalidate();
    let endpoint = config.build_time_endpoint();

    ctx.output.header("Building pages");
    ctx.output.step(1, 3, &format!("Fetching {}", endpoint.url));

    let transport = ctx.transport(args.fixture.as_deref())?;
    let controller = FetchController::new(endpoint, transport).with_cache_mode(CacheMode::Default);

    let cancel = CancelHandle::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let spinner = ctx.output.spinner("Fetching build-time listing...");
    let result = controller.fetch(&cancel).await;
    spinner.finish_and_clear();
    let outcome = result.context("Build-time fetch failed")?;

    let metrics = derive_metrics(&outcome.body, outcome.elapsed_ms);
    ctx.output.debug(&format!(
        "{} products, {} in {}ms",
        outcome.listing.len(),
        metrics.payload_size_kb,
        metrics.elapsed_ms
    ));

    ctx.output.step(2, 3, "Rendering pages");
    let built_at = chrono::Local::now();
    let pages = [
        index_page(),
        build_time_page(&outcome.listing, &built_at, revalidate),
        static_page(),
    ];

    ctx.output.step(3, 3, &format!("Writing {}", out_dir.display()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut built = Vec::with_capacity(pages.len());
    for page in &pages {
        let path = out_dir.join(page.file_name());
        std::fs::write(&path, &page.html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        ctx.output.debug(&format!("Wrote {}", path.display()));
        built.push(BuiltPage {
            file: page.file_name(),
            cache_control: page.cache_control.clone(),
            bytes: page.html.len(),
        });
    }
    write_headers(&out_dir, &pages, revalidate)?;

    if ctx.output.is_json() {
        ctx.output.json(&BuildReport {
            out_dir: out_dir.display().to_string(),
            built_at: built_at.to_rfc3339(),
            items: outcome.listing.len(),
            source_elapsed_ms: metrics.elapsed_ms,
            source_size: metrics.payload_size_kb,
            pages: built,
        });
        return Ok(());
    }

    ctx.output.success(&format!(
        "Built {} pages from {} products",
        built.len(),
        outcome.listing.len()
    ));
    for page in &built {
        ctx.output.kv(&page.file, &page.cache_control);
    }

    Ok(())
}

/// Write a `_headers` file mapping each page route to its Cache-Control.
fn write_headers(out_dir: &Path, pages: &[Page], revalidate: Duration) -> Result<()> {
    let path = out_dir.join("_headers");
    std::fs::write(&path, headers_file(pages, revalidate))
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn headers_file(pages: &[Page], revalidate: Duration) -> String {
    let client = showcase_render::RenderStrategy::ClientFetched.cache_policy(revalidate);
    let mut rules = vec![format!(
        "/csr\n  Cache-Control: {}\n",
        client.cache_control_header()
    )];

    for page in pages {
        let route = match page.strategy {
            Some(strategy) => format!("/{}", strategy.slug()),
            None => "/".to_string(),
        };
        rules.push(format!("{}\n  Cache-Control: {}\n", route, page.cache_control));
    }

    rules.join("\n")
}
