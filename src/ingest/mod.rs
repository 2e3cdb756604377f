pub mod cars_com;
pub mod config;
pub mod fetch;
pub mod html;
pub mod registry;

pub use config::{validate_ingest, IngestConfig};
pub use fetch::{PageCache, PageFetcher, PageSource};
pub use registry::{normalize_domain, GenericParser, Page, PageParser, ParserRegistry};

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Url;

use crate::listing::Listing;

/// Parse a URL worth fetching: http(s) with a host.
pub fn parse_listing_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(url)
}

pub fn is_valid_url(raw: &str) -> bool {
    parse_listing_url(raw).is_some()
}

/// An ingested listing is only kept when it has a usable price.
pub fn is_valid_listing(listing: &Listing) -> bool {
    !listing.id.trim().is_empty() && listing.price.is_some_and(|p| p > 0)
}

/// Ingest one page. Every failure is logged and yields no listings.
pub async fn ingest_url<S: PageSource>(raw: &str, registry: &ParserRegistry, source: &S) -> Vec<Listing> {
    let Some(url) = parse_listing_url(raw) else {
        tracing::warn!(url = raw, "skipping invalid URL");
        return Vec::new();
    };
    let host = url.host_str().map(normalize_domain).unwrap_or_default();
    let parser = registry.for_host(&host);
    if !registry.domains().contains(&host.as_str()) {
        tracing::debug!(
            %url,
            known = ?registry.domains(),
            "no parser registered for host"
        );
    }

    let body = match source.fetch(&url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(%url, "{:#}", e);
            return Vec::new();
        }
    };

    let page = Page { url, body };
    let parsed = parser.parse(&page);
    let found = parsed.len();

    let fetched_at = Utc::now();
    let listings: Vec<Listing> = parsed
        .into_iter()
        .map(|mut listing| {
            if listing.id.trim().is_empty() {
                listing.id = page.url.to_string();
            }
            listing.age_category.get_or_insert_with(|| "used".to_string());
            listing.title_condition.get_or_insert_with(|| "clean".to_string());
            listing.url.get_or_insert_with(|| page.url.to_string());
            listing.source = Some(host.clone());
            listing.fetched_at = Some(fetched_at);
            listing
        })
        .filter(is_valid_listing)
        .collect();

    tracing::debug!(
        url = %page.url,
        parser = parser.name(),
        found,
        kept = listings.len(),
        "parsed page"
    );
    if listings.is_empty() {
        tracing::warn!(url = %page.url, "no listings found");
    }

    listings
}

/// Ingest many pages, at most `max_concurrent` at a time. Listings come
/// back grouped in the order the URLs were given.
pub async fn ingest_urls<S: PageSource>(
    urls: &[String],
    registry: &ParserRegistry,
    source: &S,
    max_concurrent: usize,
) -> Vec<Listing> {
    let mut pending = urls.iter().enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut results: Vec<(usize, Vec<Listing>)> = Vec::with_capacity(urls.len());

    for (i, url) in pending.by_ref().take(max_concurrent.max(1)) {
        in_flight.push(ingest_indexed(i, url, registry, source));
    }

    while let Some(done) = in_flight.next().await {
        results.push(done);
        if let Some((i, url)) = pending.next() {
            in_flight.push(ingest_indexed(i, url, registry, source));
        }
    }

    results.sort_by_key(|(i, _)| *i);
    results.into_iter().flat_map(|(_, listings)| listings).collect()
}

async fn ingest_indexed<S: PageSource>(
    index: usize,
    url: &str,
    registry: &ParserRegistry,
    source: &S,
) -> (usize, Vec<Listing>) {
    (index, ingest_url(url, registry, source).await)
}
