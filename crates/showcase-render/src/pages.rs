//! Full pages for each rendering strategy.

use chrono::{DateTime, TimeZone};
use showcase_data::ProductListing;

use crate::html::{self, html_escape, CardStyle};
use crate::strategy::RenderStrategy;
use crate::surface::RenderSurface;

/// A rendered page plus the Cache-Control value it should be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub strategy: Option<RenderStrategy>,
    pub cache_control: String,
    pub html: String,
}

impl Page {
    /// Output file name, e.g. `csr.html`.
    pub fn file_name(&self) -> String {
        match self.strategy {
            Some(strategy) => format!("{}.html", strategy.slug()),
            None => "index.html".to_string(),
        }
    }
}

fn document(title: &str, body: &str) -> String {
    let nav: String = RenderStrategy::ALL
        .iter()
        .map(|s| format!(r#"<a href="/{}">{}</a>"#, s.slug(), s.slug().to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
</head>
<body>
<nav class="navbar"><a href="/">Rendering Showcase</a> {}</nav>
<main>
{}
</main>
</body>
</html>
"#,
        html_escape(title),
        nav,
        body
    )
}

fn page_header(strategy: RenderStrategy) -> String {
    format!(
        r#"<header class="page-header"><h1>{}</h1><p>{}</p></header>"#,
        strategy.title(),
        strategy.tagline()
    )
}

/// Landing page linking to each strategy.
pub fn index_page() -> Page {
    let cards: String = RenderStrategy::ALL
        .iter()
        .map(|s| {
            let points: String = s
                .highlights()
                .iter()
                .map(|p| format!("<li>{}</li>", p))
                .collect();
            format!(
                r#"<article class="strategy-card"><h2>{}</h2><ul>{}</ul><a href="/{}">Explore</a></article>
"#,
                s.title(),
                points,
                s.slug()
            )
        })
        .collect();

    Page {
        strategy: None,
        cache_control: RenderStrategy::Static
            .cache_policy(std::time::Duration::ZERO)
            .cache_control_header(),
        html: document(
            "Rendering Strategies",
            &format!(r#"<section class="strategies">
{}</section>"#, cards),
        ),
    }
}

/// Client-fetched page in whatever state the surface is in.
pub fn client_fetched_page(surface: &RenderSurface) -> Page {
    let strategy = RenderStrategy::ClientFetched;
    let metrics = surface.metrics();
    let load_time = metrics.map_or(0, |m| m.elapsed_ms);
    let tti = metrics.map_or(0, |m| m.time_to_interactive_ms());
    let size = metrics.map_or("0 KB", |m| m.payload_size_kb.as_str());

    let body = format!(
        r#"{}
{}
{}
<section class="impact">
    <p>Blank page → loading spinner → products appear after {}ms</p>
    <p>Time to interactive: ~{}ms (JS execution + fetch)</p>
    <p>{} downloaded for every visit</p>
</section>"#,
        page_header(strategy),
        surface.render_html(),
        html::render_client_metrics(metrics),
        load_time,
        tti,
        size
    );

    Page {
        strategy: Some(strategy),
        cache_control: strategy
            .cache_policy(std::time::Duration::ZERO)
            .cache_control_header(),
        html: document(strategy.title(), &body),
    }
}

/// Page whose listing was fetched once at build time.
pub fn build_time_page<Tz>(
    listing: &ProductListing,
    built_at: &DateTime<Tz>,
    revalidate: std::time::Duration,
) -> Page
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let strategy = RenderStrategy::BuildTime;
    let body = format!(
        r#"{}
{}
{}
<section class="impact">
    <p>Products appear instantly - No loading spinner, no wait time</p>
    <p>Built at {}, revalidated every {}s</p>
</section>"#,
        page_header(strategy),
        html::render_grid(listing, CardStyle::BuildTime),
        html::render_cached_metrics(),
        built_at.format("%H:%M:%S"),
        revalidate.as_secs()
    );

    Page {
        strategy: Some(strategy),
        cache_control: strategy.cache_policy(revalidate).cache_control_header(),
        html: document(strategy.title(), &body),
    }
}

/// Fully static page with no data.
pub fn static_page() -> Page {
    let strategy = RenderStrategy::Static;
    let points: String = strategy
        .highlights()
        .iter()
        .map(|p| format!("<li>{}</li>", p))
        .collect();
    let body = format!(
        r#"{}
<ul class="highlights">{}</ul>
{}"#,
        page_header(strategy),
        points,
        html::render_cached_metrics()
    );

    Page {
        strategy: Some(strategy),
        cache_control: strategy
            .cache_policy(std::time::Duration::ZERO)
            .cache_control_header(),
        html: document(strategy.title(), &body),
    }
}
