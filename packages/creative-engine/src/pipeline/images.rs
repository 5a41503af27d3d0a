//! Professional image prompts.
//!
//! A base visual description is wrapped in a platform format clause, a style
//! clause, a layout composition clause and fixed quality and avoidance
//! directives before it is sent to the image provider.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::prompts::render;
use crate::types::platform::{PixelSize, PlatformCatalog, PlatformSpec};

/// Image size used when a platform has no entry.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "hd";
pub const IMAGE_RENDER_STYLE: &str = "vivid";

const FALLBACK_PLATFORM: &str = "instagram_feed";

pub const QUALITY_TERMS: &[&str] = &[
    "professional photography",
    "high-end commercial photography",
    "studio quality lighting",
    "crisp, sharp details",
    "perfect composition",
    "award-winning design",
    "magazine-quality",
    "editorial photography style",
];

const PROFESSIONAL_PROMPT: &str = r#"Create a {format} for a professional advertising campaign.

{prompt}

REQUIREMENTS:
- {requirements}
- {style_clause}
- {layout_clause}
- {quality}

TECHNICAL SPECIFICATIONS:
- Platform: {platform}
- Style: {style}
- Layout: {layout}
- Dimensions: {dimensions}

DESIGN PRINCIPLES:
- Professional commercial photography quality
- Perfect lighting and composition
- High visual impact and engagement
- Brand-appropriate aesthetic
- Conversion-optimized design
- Mobile-friendly (if applicable)

AVOID:
- Generic stock photo look
- Low quality or blurry images
- Unprofessional composition
- Poor lighting
- Cluttered design
- Outdated aesthetics

Create a stunning, professional ad creative that would be worthy of a top-tier advertising agency."#;

/// Visual style vocabulary. Unknown names resolve to `Modern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    #[default]
    Modern,
    Lifestyle,
    Bold,
    Elegant,
    Playful,
}

impl ImageStyle {
    pub const ALL: [ImageStyle; 5] = [
        Self::Modern,
        Self::Lifestyle,
        Self::Bold,
        Self::Elegant,
        Self::Playful,
    ];

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Lifestyle => "lifestyle",
            Self::Bold => "bold",
            Self::Elegant => "elegant",
            Self::Playful => "playful",
        }
    }

    /// Style clause of the professional prompt.
    pub fn enhancement(&self) -> &'static str {
        match self {
            Self::Modern => "contemporary design, clean lines, minimalist aesthetic, modern typography, sleek composition",
            Self::Lifestyle => "authentic lifestyle photography, natural lighting, real people, aspirational mood, candid moments",
            Self::Bold => "high contrast, vibrant colors, strong visual impact, attention-grabbing, dynamic composition",
            Self::Elegant => "sophisticated design, refined aesthetics, premium feel, luxury branding, polished finish",
            Self::Playful => "fun, energetic, colorful, engaging, creative composition, youthful energy",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Modern => "Modern Professional",
            Self::Lifestyle => "Lifestyle Authentic",
            Self::Bold => "Bold Impact",
            Self::Elegant => "Elegant Premium",
            Self::Playful => "Playful Creative",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Modern => "Contemporary, clean, sophisticated",
            Self::Lifestyle => "Real people, natural settings, aspirational",
            Self::Bold => "High contrast, vibrant, attention-grabbing",
            Self::Elegant => "Luxury feel, refined, high-end",
            Self::Playful => "Fun, energetic, creative composition",
        }
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout vocabulary. Unknown names resolve to `ProductCentered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    #[default]
    ProductCentered,
    Lifestyle,
    TextHeavy,
    SplitScreen,
    Minimalist,
}

impl LayoutType {
    pub const ALL: [LayoutType; 5] = [
        Self::ProductCentered,
        Self::Lifestyle,
        Self::TextHeavy,
        Self::SplitScreen,
        Self::Minimalist,
    ];

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductCentered => "product_centered",
            Self::Lifestyle => "lifestyle",
            Self::TextHeavy => "text_heavy",
            Self::SplitScreen => "split_screen",
            Self::Minimalist => "minimalist",
        }
    }

    /// Layout clause of the professional prompt.
    pub fn composition(&self) -> &'static str {
        match self {
            Self::ProductCentered => "product as hero element, centered composition, clean background, professional product photography",
            Self::Lifestyle => "lifestyle context, people using product, natural environment, aspirational setting",
            Self::TextHeavy => "typography-focused design, text hierarchy, readable fonts, high contrast text",
            Self::SplitScreen => "balanced composition, side-by-side elements, clear visual separation, structured layout",
            Self::Minimalist => "clean design, lots of white space, simple composition, focus on essentials",
        }
    }

    fn scene_template(&self) -> &'static str {
        match self {
            Self::ProductCentered => "Product-focused layout with {product} as the main subject, clean background, professional lighting",
            Self::Lifestyle => "Lifestyle scene featuring {product} in use, natural setting, aspirational mood",
            Self::TextHeavy => "Text-focused design with {product} as supporting element, bold typography, high contrast",
            Self::SplitScreen => "Split-screen layout with {product} on one side and benefits/features on the other",
            Self::Minimalist => "Minimalist design with {product}, lots of white space, clean lines, simple composition",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to render: a base visual description plus platform, style and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBrief {
    pub prompt: String,
    pub platform: String,
    #[serde(default)]
    pub style: ImageStyle,
    #[serde(default)]
    pub layout: LayoutType,
    /// Overrides the platform's primary size in the prompt text
    #[serde(default)]
    pub dimensions: Option<PixelSize>,
}

impl ImageBrief {
    pub fn new(prompt: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            platform: platform.into(),
            style: ImageStyle::default(),
            layout: LayoutType::default(),
            dimensions: None,
        }
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_layout(mut self, layout: LayoutType) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_dimensions(mut self, dimensions: PixelSize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

fn format_spec<'c>(catalog: &'c PlatformCatalog, platform: &str) -> Option<&'c PlatformSpec> {
    catalog
        .get(platform)
        .or_else(|| catalog.get(FALLBACK_PLATFORM))
}

/// Provider size string for a platform.
pub fn image_size_for(catalog: &PlatformCatalog, platform: &str) -> String {
    catalog
        .get(platform)
        .map(|spec| spec.image_size.clone())
        .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string())
}

/// Full image prompt for a brief.
///
/// Platforms without an entry borrow the feed-post format clause.
pub fn build_professional_prompt(brief: &ImageBrief, catalog: &PlatformCatalog) -> String {
    let spec = format_spec(catalog, &brief.platform);

    let dimensions = brief
        .dimensions
        .as_ref()
        .or_else(|| spec.and_then(|s| s.dimensions.primary()))
        .map(|d| format!("{}x{}", d.width, d.height))
        .unwrap_or_else(|| "1080x1080".to_string());

    let (format, requirements) = match spec {
        Some(spec) => (
            render(&spec.image_format.format, &[("dimensions", &dimensions)]),
            spec.image_format.requirements.clone(),
        ),
        None => (
            format!("{} social media ad", dimensions),
            "mobile-optimized, high contrast, eye-catching".to_string(),
        ),
    };
    let quality = QUALITY_TERMS.join(", ");

    render(
        PROFESSIONAL_PROMPT,
        &[
            ("format", &format),
            ("prompt", brief.prompt.trim()),
            ("requirements", &requirements),
            ("style_clause", brief.style.enhancement()),
            ("layout_clause", brief.layout.composition()),
            ("quality", &quality),
            ("platform", &brief.platform),
            ("style", brief.style.as_str()),
            ("layout", brief.layout.as_str()),
            ("dimensions", &dimensions),
        ],
    )
}

/// Short layout-specific scene description for a product.
pub fn layout_prompt(
    product_name: &str,
    description: &str,
    platform: &str,
    layout: LayoutType,
    style: ImageStyle,
) -> String {
    let scene = render(layout.scene_template(), &[("product", product_name)]);
    format!(
        "{}. {}. Style: {}. Platform: {}. High quality, professional photography style.",
        scene, description, style, platform
    )
}
