//! Platform specification table.
//!
//! Every platform identifier the pipeline accepts must resolve to a
//! [`PlatformSpec`] in the [`PlatformCatalog`]; an unknown identifier fails
//! that platform's unit of work and nothing else.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt-shape family. Each family gets its own response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFamily {
    /// Multi-slide vertical sequence
    Story,
    /// Multi-card horizontal sequence
    Carousel,
    /// Same creative rendered in several banner sizes
    MultiSize,
    /// One flat creative per variation
    Single,
}

/// A pixel size, optionally named ("Leaderboard").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            name: None,
        }
    }

    pub fn named(width: u32, height: u32, name: impl Into<String>) -> Self {
        Self {
            width,
            height,
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}x{} ({})", self.width, self.height, name),
            None => write!(f, "{}x{}", self.width, self.height),
        }
    }
}

/// Target dimensions: one size or a set of sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimensions {
    Fixed(PixelSize),
    Sizes(Vec<PixelSize>),
}

impl Dimensions {
    /// Primary size (the fixed size, or the first of a size set).
    pub fn primary(&self) -> Option<&PixelSize> {
        match self {
            Self::Fixed(size) => Some(size),
            Self::Sizes(sizes) => sizes.first(),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => write!(f, "{}", size),
            Self::Sizes(sizes) => {
                let parts: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Platform clause used when enriching image prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFormat {
    /// Format description; `{dimensions}` is replaced with the render size
    pub format: String,
    pub requirements: String,
    pub style: String,
}

/// Static per-platform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpec {
    pub id: String,
    pub family: PlatformFamily,
    pub dimensions: Dimensions,
    pub aspect_ratio: Option<String>,
    /// Character budget for body copy; 0 means text overlay only
    pub max_text_length: Option<u32>,
    /// Maximum share of the creative covered by text
    pub max_text_ratio: Option<f32>,
    /// Slide or card count for sequence families
    pub sequence_length: Option<u32>,
    pub recommended: String,
    /// Provider image size string
    pub image_size: String,
    pub image_format: ImageFormat,
}

impl PlatformSpec {
    /// Length constraints in the exact wording the prompt builder embeds.
    pub fn length_hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        match self.max_text_length {
            Some(0) => hints.push("Max text length: 0 characters (text overlay only)".to_string()),
            Some(n) => hints.push(format!("Max text length: {} characters", n)),
            None => {}
        }
        if let Some(ratio) = self.max_text_ratio {
            hints.push(format!("Max text-to-image ratio: {}", ratio));
        }
        hints
    }

    /// Body-copy budget enforced by the normalizer, if any.
    pub fn body_limit(&self) -> Option<usize> {
        self.max_text_length.filter(|n| *n > 0).map(|n| n as usize)
    }
}

/// Lookup table of platform specifications, in declaration order.
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    specs: IndexMap<String, PlatformSpec>,
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformCatalog {
    /// Empty catalog; every platform is unsupported.
    pub fn empty() -> Self {
        Self {
            specs: IndexMap::new(),
        }
    }

    /// The five built-in ad placements.
    pub fn builtin() -> Self {
        Self::empty()
            .with_spec(PlatformSpec {
                id: "instagram_feed".into(),
                family: PlatformFamily::Single,
                dimensions: Dimensions::Fixed(PixelSize::new(1080, 1080)),
                aspect_ratio: Some("1:1".into()),
                max_text_length: Some(2200),
                max_text_ratio: None,
                sequence_length: None,
                recommended: "Product-focused visuals work best".into(),
                image_size: "1024x1024".into(),
                image_format: ImageFormat {
                    format: "square {dimensions} Instagram feed post".into(),
                    requirements: "mobile-optimized, high contrast, eye-catching, social media ready".into(),
                    style: "trendy, modern, Instagram-worthy aesthetic".into(),
                },
            })
            .with_spec(PlatformSpec {
                id: "instagram_story".into(),
                family: PlatformFamily::Story,
                dimensions: Dimensions::Fixed(PixelSize::new(1080, 1920)),
                aspect_ratio: Some("9:16".into()),
                max_text_length: Some(0),
                max_text_ratio: None,
                sequence_length: Some(5),
                recommended: "Interactive elements, swipe-up CTAs".into(),
                image_size: "1024x1792".into(),
                image_format: ImageFormat {
                    format: "vertical {dimensions} Instagram story".into(),
                    requirements: "full-screen impact, vertical composition, story-optimized".into(),
                    style: "dynamic, engaging, story-appropriate".into(),
                },
            })
            .with_spec(PlatformSpec {
                id: "facebook_carousel".into(),
                family: PlatformFamily::Carousel,
                dimensions: Dimensions::Fixed(PixelSize::new(1080, 1080)),
                aspect_ratio: Some("1:1".into()),
                max_text_length: Some(125),
                max_text_ratio: None,
                sequence_length: Some(5),
                recommended: "Story-driven sequence".into(),
                image_size: "1024x1024".into(),
                image_format: ImageFormat {
                    format: "square {dimensions} Facebook carousel card".into(),
                    requirements: "professional, business-appropriate, clean design".into(),
                    style: "corporate, trustworthy, conversion-focused".into(),
                },
            })
            .with_spec(PlatformSpec {
                id: "google_display".into(),
                family: PlatformFamily::MultiSize,
                dimensions: Dimensions::Sizes(vec![
                    PixelSize::named(300, 250, "Medium Rectangle"),
                    PixelSize::named(728, 90, "Leaderboard"),
                    PixelSize::named(160, 600, "Wide Skyscraper"),
                    PixelSize::named(320, 50, "Mobile Banner"),
                    PixelSize::named(300, 600, "Half Page"),
                ]),
                aspect_ratio: None,
                max_text_length: None,
                max_text_ratio: Some(0.2),
                sequence_length: None,
                recommended: "Clear CTA, minimal text".into(),
                image_size: "1024x1024".into(),
                image_format: ImageFormat {
                    format: "{dimensions} Google Display banner".into(),
                    requirements: "web-optimized, clear text, high visibility".into(),
                    style: "clean, readable, conversion-optimized".into(),
                },
            })
            .with_spec(PlatformSpec {
                id: "linkedin".into(),
                family: PlatformFamily::Single,
                dimensions: Dimensions::Fixed(PixelSize::new(1200, 627)),
                aspect_ratio: Some("1.91:1".into()),
                max_text_length: Some(150),
                max_text_ratio: None,
                sequence_length: None,
                recommended: "Professional tone, value proposition".into(),
                image_size: "1024x1024".into(),
                image_format: ImageFormat {
                    format: "professional {dimensions} LinkedIn ad".into(),
                    requirements: "business-focused, professional, B2B appropriate".into(),
                    style: "corporate, sophisticated, professional".into(),
                },
            })
    }

    /// Add or replace a spec.
    pub fn with_spec(mut self, spec: PlatformSpec) -> Self {
        self.specs.insert(spec.id.clone(), spec);
        self
    }

    pub fn get(&self, platform: &str) -> Option<&PlatformSpec> {
        self.specs.get(platform)
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.specs.contains_key(platform)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_order_and_families() {
        let catalog = PlatformCatalog::builtin();
        let ids: Vec<&str> = catalog.ids().collect();
        assert_eq!(
            ids,
            vec![
                "instagram_feed",
                "instagram_story",
                "facebook_carousel",
                "google_display",
                "linkedin"
            ]
        );

        assert_eq!(catalog.get("instagram_story").unwrap().family, PlatformFamily::Story);
        assert_eq!(catalog.get("facebook_carousel").unwrap().family, PlatformFamily::Carousel);
        assert_eq!(catalog.get("google_display").unwrap().family, PlatformFamily::MultiSize);
        assert_eq!(catalog.get("linkedin").unwrap().family, PlatformFamily::Single);
        assert!(catalog.get("tiktok").is_none());
    }

    #[test]
    fn test_length_hints() {
        let catalog = PlatformCatalog::builtin();

        assert_eq!(
            catalog.get("facebook_carousel").unwrap().length_hints(),
            vec!["Max text length: 125 characters"]
        );
        assert_eq!(
            catalog.get("google_display").unwrap().length_hints(),
            vec!["Max text-to-image ratio: 0.2"]
        );
        assert!(catalog.get("instagram_story").unwrap().length_hints()[0].contains("overlay"));
    }

    #[test]
    fn test_body_limit_ignores_overlay_only() {
        let catalog = PlatformCatalog::builtin();
        assert_eq!(catalog.get("instagram_story").unwrap().body_limit(), None);
        assert_eq!(catalog.get("linkedin").unwrap().body_limit(), Some(150));
        assert_eq!(catalog.get("google_display").unwrap().body_limit(), None);
    }

    #[test]
    fn test_dimension_display() {
        let catalog = PlatformCatalog::builtin();
        assert_eq!(catalog.get("linkedin").unwrap().dimensions.to_string(), "1200x627");

        let display = catalog.get("google_display").unwrap().dimensions.to_string();
        assert!(display.starts_with("300x250 (Medium Rectangle), 728x90 (Leaderboard)"));
    }
}
