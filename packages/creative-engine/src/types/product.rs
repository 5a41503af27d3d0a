//! Product input and per-request generation options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the caller supplied the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Product page URL, enriched by scraping
    Url,
    /// Manual name and description only
    #[default]
    Text,
}

/// Voice of the generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Playful,
    Formal,
    Friendly,
    Bold,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Playful => "playful",
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Bold => "bold",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "casual" => Ok(Self::Casual),
            "playful" => Ok(Self::Playful),
            "formal" => Ok(Self::Formal),
            "friendly" => Ok(Self::Friendly),
            "bold" => Ok(Self::Bold),
            other => Err(format!("unknown tone: {}", other)),
        }
    }
}

/// Caller overrides applied on top of the pipeline defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    /// Variations per platform
    pub variations: Option<usize>,
    pub tone: Option<Tone>,
    /// Benefit the copy should lead with
    pub focus_benefit: Option<String>,
    /// Render an image for every creative
    pub generate_images: Option<bool>,
}

/// A generation request as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRequest {
    #[serde(default)]
    pub input_type: InputType,
    pub url: Option<String>,
    pub product_name: Option<String>,
    pub product_description: Option<String>,
    #[serde(default)]
    pub target_audience: String,
    /// Platform identifiers in the order results should be grouped
    #[serde(default)]
    pub platforms: Vec<String>,
    pub tone: Option<Tone>,
    #[serde(default)]
    pub customization: Customization,
}

impl AdRequest {
    /// Manual-entry request for a single product.
    pub fn text(
        product_name: impl Into<String>,
        description: impl Into<String>,
        target_audience: impl Into<String>,
    ) -> Self {
        Self {
            input_type: InputType::Text,
            product_name: Some(product_name.into()),
            product_description: Some(description.into()),
            target_audience: target_audience.into(),
            ..Default::default()
        }
    }

    /// URL request; name and description may still be supplied manually.
    pub fn from_url(url: impl Into<String>, target_audience: impl Into<String>) -> Self {
        Self {
            input_type: InputType::Url,
            url: Some(url.into()),
            target_audience: target_audience.into(),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platforms.push(platform.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.product_description = Some(description.into());
        self
    }

    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customization = customization;
        self
    }

    /// URL to enrich from, if this request should be enriched at all.
    pub fn enrichment_url(&self) -> Option<&str> {
        match self.input_type {
            InputType::Url => self.url.as_deref().filter(|u| !u.trim().is_empty()),
            InputType::Text => None,
        }
    }
}

/// Product data handed to the prompt builder.
///
/// Built once per request (manual fields, then scraped fields, then text
/// analysis) and not modified after generation starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub product_name: String,
    pub description: String,
    pub target_audience: String,
    pub tone: Tone,
    pub price: Option<f64>,
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Palette derived from product imagery
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub category: Option<String>,
    pub source_url: Option<String>,
}

/// Data extracted from a product page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    /// Absolute URLs, deduplicated, at most five
    #[serde(default)]
    pub images: Vec<String>,
    pub brand: Option<String>,
    pub category: String,
    pub url: String,
}

/// Effective options for one run after defaults and overrides are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub tone: Tone,
    pub variation_count: usize,
    pub focus_benefit: Option<String>,
    pub generate_images: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            tone: Tone::Professional,
            variation_count: 3,
            focus_benefit: None,
            generate_images: false,
        }
    }
}
