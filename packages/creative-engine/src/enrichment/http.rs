//! HTTP product-page fetcher.
//!
//! Fetches one page with a browser-like user agent and a short timeout, then
//! extracts product fields from social metadata and a fixed, ordered list of
//! CSS selectors. No JavaScript rendering.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::traits::fetcher::SourceFetcher;
use crate::types::product::ScrapedProduct;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// At most this many product images are kept.
pub const MAX_IMAGES: usize = 5;

/// Inspected in order; only the first element of each selector counts.
const PRICE_SELECTORS: &[&str] = &[
    r#"[itemprop="price"]"#,
    ".price",
    ".product-price",
    r#"[class*="price"]"#,
    r#"meta[property="product:price:amount"]"#,
];

/// Every element of every selector contributes, in this order.
const IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"[itemprop="image"]"#,
    ".product-image img",
    ".main-image img",
    r#"img[class*="product"]"#,
];

const BREADCRUMB_SELECTOR: &str = r#".breadcrumb, [class*="breadcrumb"]"#;

const CATEGORY_KEYWORDS: &[&str] = &[
    "food", "beverage", "tech", "fashion", "health", "beauty", "home",
];

pub const DEFAULT_CATEGORY: &str = "general";

/// Palette assigned to products that have imagery.
pub const BRAND_PALETTE: &[&str] = &["#2C5F2D", "#97BC62", "#FFFFFF", "#000000"];

lazy_static! {
    static ref PRICE_REGEX: Regex = Regex::new(r"\d[\d,]*(?:\.\d+)?|\.\d+").unwrap();
}

/// Product-page fetcher backed by `reqwest` and `scraper`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher with the default user agent and 10 second timeout.
    pub fn new() -> ScrapeResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ScrapeError::Http)?;
        Ok(Self { client })
    }

    /// Use a preconfigured HTTP client (user agent and timeout are the caller's).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch raw HTML, returning it with the final URL after redirects.
    async fn fetch_html(&self, url: &Url) -> ScrapeResult<(String, Url)> {
        debug!(url = %url, "Fetching product page");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Product page request failed");
            classify(e, url)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| classify(e, url))?;

        Ok((html, final_url))
    }
}

fn classify(err: reqwest::Error, url: &Url) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http(err)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch_product(&self, url: &str) -> ScrapeResult<ScrapedProduct> {
        let parsed = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ScrapeError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let (html, final_url) = self.fetch_html(&parsed).await?;
        if html.trim().is_empty() {
            return Err(ScrapeError::Parse(format!("empty body from {}", url)));
        }

        if final_url != parsed {
            debug!(url = %url, final_url = %final_url, "Product page redirected");
        }

        // Images resolve against the redirect target; the brand fallback uses
        // the address the caller gave.
        let mut product = parse_page(&html, &final_url, &parsed);
        product.url = url.to_string();

        info!(
            url = %url,
            has_title = product.title.is_some(),
            has_price = product.price.is_some(),
            images = product.images.len(),
            category = %product.category,
            "Product page enriched"
        );

        Ok(product)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Extract product fields from a page.
///
/// `page_url` is the base for resolving relative image URLs and the fallback
/// source of the brand.
pub fn parse_product_page(html: &str, page_url: &Url) -> ScrapedProduct {
    parse_page(html, page_url, page_url)
}

fn parse_page(html: &str, page_url: &Url, brand_url: &Url) -> ScrapedProduct {
    let document = Html::parse_document(html);

    let title = meta_content(&document, r#"meta[property="og:title"]"#)
        .or_else(|| first_text(&document, "title"))
        .or_else(|| first_text(&document, "h1"));

    let description = meta_content(&document, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&document, r#"meta[name="description"]"#))
        .or_else(|| first_text(&document, "p"));

    let brand = meta_content(&document, r#"meta[property="og:site_name"]"#)
        .or_else(|| brand_from_url(brand_url));

    let category = meta_content(&document, r#"meta[property="product:category"]"#)
        .unwrap_or_else(|| category_from_breadcrumbs(&document));

    ScrapedProduct {
        title,
        description,
        price: extract_price(&document),
        images: extract_images(&document, page_url),
        brand,
        category,
        url: page_url.to_string(),
    }
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => {
            warn!(selector = css, "Invalid CSS selector");
            Vec::new()
        }
    }
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    select_all(document, css)
        .into_iter()
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    select_all(document, css)
        .into_iter()
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_price(document: &Html) -> Option<f64> {
    PRICE_SELECTORS.iter().find_map(|css| {
        let el = select_all(document, css).into_iter().next()?;
        let text = el
            .value()
            .attr("content")
            .map(|c| c.to_string())
            .unwrap_or_else(|| el.text().collect());
        parse_price(&text)
    })
}

/// First number in the text, thousands separators removed.
pub fn parse_price(text: &str) -> Option<f64> {
    let found = PRICE_REGEX.find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

fn extract_images(document: &Html, base: &Url) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();

    for css in IMAGE_SELECTORS {
        for el in select_all(document, css) {
            let src = el
                .value()
                .attr("content")
                .or_else(|| el.value().attr("src"))
                .map(str::trim)
                .filter(|s| !s.is_empty());

            if let Some(src) = src {
                let absolute = make_absolute_url(src, base);
                if !images.contains(&absolute) {
                    images.push(absolute);
                }
            }
        }
    }

    images.truncate(MAX_IMAGES);
    images
}

/// Resolve an image reference against the page URL.
///
/// Absolute http(s) URLs pass through, protocol-relative ones get `https:`,
/// anything else is joined onto `base`.
pub fn make_absolute_url(src: &str, base: &Url) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }
    if src.starts_with("//") {
        return format!("https:{}", src);
    }
    base.join(src)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// Second-to-last DNS label of the host ("amazon" for www.amazon.com).
pub fn brand_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }
    Some(labels[labels.len() - 2].to_string())
}

fn category_from_breadcrumbs(document: &Html) -> String {
    let breadcrumbs: String = select_all(document, BREADCRUMB_SELECTOR)
        .into_iter()
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|cat| breadcrumbs.contains(*cat))
        .map(|cat| cat.to_string())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Palette for a product's imagery; empty when there are no images.
pub fn extract_color_palette(images: &[String]) -> Vec<String> {
    if images.is_empty() {
        return Vec::new();
    }
    BRAND_PALETTE.iter().map(|c| c.to_string()).collect()
}
