//! Source fetcher trait for product-page enrichment.

use async_trait::async_trait;

use crate::error::ScrapeResult;
use crate::types::product::ScrapedProduct;

/// Fetches a product page and extracts structured fields from it.
///
/// Any failure (network, timeout, status, parse) is a single
/// [`ScrapeError`](crate::ScrapeError); callers treat it as non-fatal.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_product(&self, url: &str) -> ScrapeResult<ScrapedProduct>;

    /// Fetcher name for logs.
    fn name(&self) -> &str;
}
