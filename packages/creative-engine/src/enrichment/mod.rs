//! Source enrichment: product pages into structured product fields.
//!
//! - `HttpFetcher` - plain HTTP fetch plus CSS-selector extraction
//! - `MockFetcher` (in [`crate::testing`]) - canned pages for tests

mod http;

pub use http::{
    brand_from_url, extract_color_palette, make_absolute_url, parse_price, parse_product_page,
    HttpFetcher, BRAND_PALETTE, DEFAULT_CATEGORY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, MAX_IMAGES,
};
