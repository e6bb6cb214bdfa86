//! HTML fragments shared by the pages.

use showcase_data::{Product, ProductListing};
use showcase_observability::{Metrics, CACHE_HITS, REQUEST_COUNT};

/// Shown when the fetch failed for any reason.
pub const FALLBACK_MESSAGE: &str = "Failed to load products. Please refresh.";

/// Shown when the fetch succeeded with zero products.
pub const EMPTY_MESSAGE: &str = "No products found.";

/// Badges a product card carries, by how its data arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStyle {
    ClientFetched,
    BuildTime,
}

impl CardStyle {
    fn status_label(&self) -> &'static str {
        match self {
            Self::ClientFetched => "Live Data",
            Self::BuildTime => "Pre-rendered",
        }
    }

    fn source_label(&self) -> &'static str {
        match self {
            Self::ClientFetched => "Client Fetched",
            Self::BuildTime => "CDN Delivered",
        }
    }

    fn class(&self) -> &'static str {
        match self {
            Self::ClientFetched => "card-live",
            Self::BuildTime => "card-cached",
        }
    }
}

pub(crate) fn render_loading() -> String {
    r#"<div class="listing-loading" role="status">
    <div class="spinner"></div>
    <p class="loading-title">Fetching products from API...</p>
    <p class="loading-note">This happens every time you visit or refresh this page</p>
</div>"#
        .to_string()
}

pub(crate) fn render_notice(message: &str) -> String {
    format!(
        r#"<div class="listing-notice">{}</div>"#,
        html_escape(message)
    )
}

/// Render the product card grid.
pub(crate) fn render_grid(listing: &ProductListing, style: CardStyle) -> String {
    let cards: String = listing
        .iter()
        .map(|p| render_product_card(p, style))
        .collect();

    format!(
        r#"<section class="product-grid" data-count="{}">
{}</section>"#,
        listing.len(),
        cards
    )
}

fn render_product_card(product: &Product, style: CardStyle) -> String {
    let ribbon = match style {
        CardStyle::BuildTime => r#"<span class="ribbon">CACHED</span>"#,
        CardStyle::ClientFetched => "",
    };

    format!(
        r#"<article class="product-card {}" data-product-id="{}">
    <div class="product-image">{}<img src="{}" alt="{}" loading="lazy"></div>
    <div class="product-info">
        <h3 class="product-title">{}</h3>
        <div class="product-price">${}</div>
        <p class="product-description">{}</p>
        <div class="product-badges">
            <span class="status">{}</span>
            <span class="source">{}</span>
        </div>
    </div>
</article>
"#,
        style.class(),
        product.id,
        ribbon,
        html_escape(&product.thumbnail),
        html_escape(&product.title),
        html_escape(&product.title),
        product.price,
        html_escape(&product.description),
        style.status_label(),
        style.source_label(),
    )
}

/// Metrics panel for the client-fetched page.
pub(crate) fn render_client_metrics(metrics: Option<&Metrics>) -> String {
    let load_time = metrics.map_or(0, |m| m.elapsed_ms);
    let size = metrics.map_or("0 KB", |m| m.payload_size_kb.as_str());

    render_metric_tiles(&[
        (format!("{}ms", load_time), "Total Load Time"),
        (CACHE_HITS.to_string(), "Cache Hits"),
        (REQUEST_COUNT.to_string(), "API Requests"),
        (size.to_string(), "Data Transfer"),
    ])
}

/// Metrics panel for pages served from cache.
pub(crate) fn render_cached_metrics() -> String {
    render_metric_tiles(&[
        ("Instant".to_string(), "Load Time"),
        ("100%".to_string(), "Cache Hit Rate"),
        ("0".to_string(), "API Calls"),
        ("100/100".to_string(), "Core Web Vitals"),
    ])
}

fn render_metric_tiles(tiles: &[(String, &str)]) -> String {
    let tiles: String = tiles
        .iter()
        .map(|(value, label)| {
            format!(
                r#"    <div class="metric"><div class="metric-value">{}</div><div class="metric-label">{}</div></div>
"#,
                html_escape(value),
                label
            )
        })
        .collect();

    format!(
        r#"<section class="metrics">
{}</section>"#,
        tiles
    )
}

/// Escape text for HTML bodies and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str) -> Product {
        Product {
            id: 9,
            title: title.to_string(),
            price: 19.99,
            description: "Soft & warm".to_string(),
            thumbnail: "https://cdn/9.png".to_string(),
        }
    }

    #[test]
    fn test_card_escapes_text() {
        let html = render_product_card(&product("<Scarf>"), CardStyle::ClientFetched);
        assert!(html.contains("&lt;Scarf&gt;"));
        assert!(html.contains("Soft &amp; warm"));
        assert!(html.contains("$19.99"));
        assert!(html.contains("Client Fetched"));
        assert!(!html.contains("CACHED"));
    }

    #[test]
    fn test_build_time_card_has_ribbon() {
        let html = render_product_card(&product("Scarf"), CardStyle::BuildTime);
        assert!(html.contains("CACHED"));
        assert!(html.contains("CDN Delivered"));
    }

    #[test]
    fn test_whole_prices_have_no_decimals() {
        let mut p = product("Lamp");
        p.price = 10.0;
        assert!(render_product_card(&p, CardStyle::BuildTime).contains("$10<"));
    }

    #[test]
    fn test_grid_counts_cards() {
        let listing = ProductListing::new(vec![product("A"), product("B")]);
        let html = render_grid(&listing, CardStyle::ClientFetched);
        assert!(html.contains(r#"data-count="2""#));
        assert_eq!(html.matches("<article").count(), 2);
    }

    #[test]
    fn test_client_metrics_before_and_after_data() {
        let before = render_client_metrics(None);
        assert!(before.contains("0ms"));
        assert!(before.contains("0 KB"));

        let metrics = Metrics::from_payload_size(102_400, 842);
        let after = render_client_metrics(Some(&metrics));
        assert!(after.contains("842ms"));
        assert!(after.contains("100.0 KB"));
        assert!(after.contains("API Requests"));
    }
}
