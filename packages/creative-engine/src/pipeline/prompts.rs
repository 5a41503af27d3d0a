//! LLM prompts for creative generation.
//!
//! One user prompt per platform. The response schema the provider is asked
//! for depends on the platform family (story slides, carousel cards, display
//! sizes or a flat creative); everything else is shared.

use crate::traits::provider::CompletionRequest;
use crate::types::creative::Creative;
use crate::types::platform::{PlatformFamily, PlatformSpec};
use crate::types::product::{GenerationOptions, ProductInput};

/// System instruction for per-platform generation.
pub const CREATIVE_SYSTEM_PROMPT: &str = "You are an expert creative director specializing in {platform} advertising. \
Generate high-converting ad creatives that follow platform best practices. \
Always respond with valid JSON.";

/// User prompt for per-platform generation.
pub const CREATIVE_PROMPT: &str = r#"Generate {platform} ad creatives for this product:

**Product Information:**
- Name: {name}
- Description: {description}
- Price: {price}
- Target Audience: {audience}
- Key Features: {features}
- Key Benefits: {benefits}
- Brand: {brand}

**Platform Requirements:**
- Dimensions: {dimensions}
{constraints}- {recommended}

**Tone:** {tone}
{focus}
Generate {count} unique creative variations optimized for {platform}. Each should include:

{schema}

Make the copy compelling, benefit-focused, and optimized for conversions. Include specific visual descriptions for image generation."#;

const STORY_SCHEMA: &str = r##"For Instagram Stories ({slides}-slide sequence):
{
  "variations": [
    {
      "id": 1,
      "name": "Story Sequence 1",
      "slides": [
        {
          "slideNumber": 1,
          "type": "hook",
          "headline": "Attention-grabbing headline",
          "subtext": "Supporting text",
          "visualDescription": "Detailed description for image generation",
          "interactiveElements": ["poll", "question"],
          "backgroundColor": "#hex",
          "textColor": "#hex"
        }
      ],
      "overallTheme": "Problem-solution narrative",
      "targetEmotion": "curiosity"
    }
  ]
}
Include {slides} slides per variation."##;

const CAROUSEL_SCHEMA: &str = r##"For Facebook Carousel ({cards} cards):
{
  "variations": [
    {
      "id": 1,
      "name": "Carousel Sequence 1",
      "cards": [
        {
          "cardNumber": 1,
          "headline": "Card headline (max 40 chars)",
          "bodyCopy": "Card description (max {body_limit} chars)",
          "visualDescription": "What should be shown",
          "layout": "product_centered|split_screen|text_heavy",
          "backgroundColor": "#hex",
          "ctaText": "Learn More"
        }
      ],
      "sequenceStrategy": "Hero → Features → Benefits → Social Proof → Offer",
      "targetEmotion": "desire"
    }
  ]
}
Include {cards} cards per variation."##;

const MULTI_SIZE_SCHEMA: &str = r##"For Google Display Ads (multiple sizes):
{
  "variations": [
    {
      "id": 1,
      "name": "Direct Response",
      "sizes": [
        {
          "width": {width},
          "height": {height},
          "headline": "Short headline",
          "subheadline": "Benefit statement",
          "ctaText": "Shop Now",
          "layout": {
            "productImagePosition": "left|right|center",
            "textAlignment": "left|center",
            "ctaPlacement": "bottom|right"
          },
          "colors": {
            "background": "#hex",
            "text": "#hex",
            "cta": "#hex"
          }
        }
      ],
      "adType": "direct_response|brand_awareness|retargeting",
      "targetEmotion": "urgency"
    }
  ]
}
Cover every size: {dimensions}."##;

const SINGLE_SCHEMA: &str = r##"For {platform}:
{
  "variations": [
    {
      "id": 1,
      "name": "Variation Name",
      "headline": "Compelling headline (max 40 chars)",
      "subheadline": "Supporting headline (max 60 chars)",
      "bodyCopy": "Main ad copy (2-3 sentences, engaging)",
      "callToAction": "Action text (max 20 chars)",
      "visualDescription": "Detailed description of the visual composition",
      "layout": {
        "style": "minimalist|lifestyle|text_heavy|product_focus",
        "composition": "How elements are arranged",
        "focal_point": "Where eye should be drawn"
      },
      "colors": {
        "primary": "#hex",
        "secondary": "#hex",
        "accent": "#hex",
        "background": "#hex"
      },
      "hashtags": ["#relevant", "#hashtags"],
      "targetEmotion": "excitement|trust|desire",
      "predictedScore": 85
    }
  ],
  "brandGuidelines": {
    "colorPalette": ["#hex1", "#hex2"],
    "fontSuggestions": ["Primary font", "Secondary font"],
    "voiceTone": "{tone}"
  }
}"##;

/// System instruction for rewriting an existing creative.
pub const VARIATIONS_SYSTEM_PROMPT: &str = "You are an expert copywriter. Respond with valid JSON.";

pub const VARIATIONS_PROMPT: &str = r#"Create {count} variations of this ad creative:
Headline: {headline}
Body: {body}
CTA: {cta}

Generate variations with different approaches:
1. Emotional appeal
2. Logical/benefit-focused
3. Urgency-driven

Respond in JSON format: {"variations": [{"headline": "...", "bodyCopy": "...", "callToAction": "..."}]}"#;

pub const IMPROVE_SYSTEM_PROMPT: &str =
    "You are an expert ad copywriter focused on conversions. Respond with valid JSON.";

pub const IMPROVE_PROMPT: &str = r#"Improve this ad copy to make it more compelling and conversion-focused:

Headline: {headline}
Body: {body}
CTA: {cta}

Provide an improved version with better hooks, clearer benefits, and stronger CTAs.
Respond in JSON format: {"headline": "...", "subheadline": "...", "bodyCopy": "...", "callToAction": "..."}"#;

type SchemaTemplate = fn(&PlatformSpec, &GenerationOptions) -> String;

/// Response schema for each platform family.
fn schema_template(family: PlatformFamily) -> SchemaTemplate {
    match family {
        PlatformFamily::Story => story_schema,
        PlatformFamily::Carousel => carousel_schema,
        PlatformFamily::MultiSize => multi_size_schema,
        PlatformFamily::Single => single_schema,
    }
}

fn story_schema(spec: &PlatformSpec, _options: &GenerationOptions) -> String {
    let slides = spec.sequence_length.unwrap_or(5).to_string();
    render(STORY_SCHEMA, &[("slides", &slides)])
}

fn carousel_schema(spec: &PlatformSpec, _options: &GenerationOptions) -> String {
    let cards = spec.sequence_length.unwrap_or(5).to_string();
    let body_limit = spec.body_limit().unwrap_or(125).to_string();
    render(
        CAROUSEL_SCHEMA,
        &[("cards", &cards), ("body_limit", &body_limit)],
    )
}

fn multi_size_schema(spec: &PlatformSpec, _options: &GenerationOptions) -> String {
    let (width, height) = spec
        .dimensions
        .primary()
        .map(|s| (s.width.to_string(), s.height.to_string()))
        .unwrap_or_else(|| ("300".to_string(), "250".to_string()));
    let dimensions = spec.dimensions.to_string();
    render(
        MULTI_SIZE_SCHEMA,
        &[
            ("width", &width),
            ("height", &height),
            ("dimensions", &dimensions),
        ],
    )
}

fn single_schema(spec: &PlatformSpec, options: &GenerationOptions) -> String {
    render(
        SINGLE_SCHEMA,
        &[("platform", &spec.id), ("tone", options.tone.as_str())],
    )
}

/// Build the per-platform user prompt.
///
/// Length hints from the platform spec are embedded verbatim; nothing here
/// enforces them.
pub fn build_prompt(product: &ProductInput, spec: &PlatformSpec, options: &GenerationOptions) -> String {
    let schema = schema_template(spec.family)(spec, options);

    let price = product
        .price
        .map(|p| format!("${}", p))
        .unwrap_or_else(|| "Not specified".to_string());
    let features = join_or(&product.features, "Not specified");
    let benefits = join_or(&product.benefits, "Not specified");
    let brand = product.brand.as_deref().unwrap_or("Unknown");
    let dimensions = spec.dimensions.to_string();
    let constraints: String = spec
        .length_hints()
        .iter()
        .map(|hint| format!("- {}\n", hint))
        .collect();
    let focus = options
        .focus_benefit
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .map(|b| format!("**Focus Benefit:** Lead with {}\n", b))
        .unwrap_or_default();
    let count = options.variation_count.to_string();

    render(
        CREATIVE_PROMPT,
        &[
            ("platform", &spec.id),
            ("name", &product.product_name),
            ("description", &product.description),
            ("price", &price),
            ("audience", &product.target_audience),
            ("features", &features),
            ("benefits", &benefits),
            ("brand", brand),
            ("dimensions", &dimensions),
            ("constraints", &constraints),
            ("recommended", &spec.recommended),
            ("tone", options.tone.as_str()),
            ("focus", &focus),
            ("count", &count),
            ("schema", &schema),
        ],
    )
}

/// Complete provider request for one platform (temperature 0.8, 2000 tokens).
pub fn build_creative_request(
    product: &ProductInput,
    spec: &PlatformSpec,
    options: &GenerationOptions,
) -> CompletionRequest {
    let system = render(CREATIVE_SYSTEM_PROMPT, &[("platform", &spec.id)]);
    CompletionRequest::new(system, build_prompt(product, spec, options))
        .temperature(0.8)
        .max_tokens(2000)
}

pub fn format_variations_prompt(creative: &Creative, count: usize) -> String {
    let count = count.to_string();
    render(
        VARIATIONS_PROMPT,
        &[
            ("count", &count),
            ("headline", &creative.headline),
            ("body", &creative.body_copy),
            ("cta", &creative.call_to_action),
        ],
    )
}

pub fn format_improve_prompt(creative: &Creative) -> String {
    render(
        IMPROVE_PROMPT,
        &[
            ("headline", &creative.headline),
            ("body", &creative.body_copy),
            ("cta", &creative.call_to_action),
        ],
    )
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Substitute `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so product text containing braces
/// comes through untouched. Unknown placeholders are left as-is.
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let hit = vars
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));

        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::platform::PlatformCatalog;
    use crate::types::product::Tone;

    fn tea() -> ProductInput {
        ProductInput {
            product_name: "Organic Tea".into(),
            description: "Premium organic green tea that boosts energy".into(),
            target_audience: "busy professionals".into(),
            tone: Tone::Professional,
            features: vec!["organic".into(), "premium".into()],
            benefits: vec!["energy".into(), "boost".into()],
            ..Default::default()
        }
    }

    fn prompt_for(platform: &str) -> String {
        let catalog = PlatformCatalog::builtin();
        build_prompt(&tea(), catalog.get(platform).unwrap(), &GenerationOptions::default())
    }

    #[test]
    fn test_prompt_embeds_product_fields() {
        let prompt = prompt_for("instagram_feed");

        assert!(prompt.contains("- Name: Organic Tea"));
        assert!(prompt.contains("- Description: Premium organic green tea that boosts energy"));
        assert!(prompt.contains("- Price: Not specified"));
        assert!(prompt.contains("- Target Audience: busy professionals"));
        assert!(prompt.contains("- Key Features: organic, premium"));
        assert!(prompt.contains("- Brand: Unknown"));
        assert!(prompt.contains("- Dimensions: 1080x1080"));
        assert!(prompt.contains("**Tone:** professional"));
        assert!(prompt.contains("Generate 3 unique creative variations optimized for instagram_feed"));
    }

    #[test]
    fn test_price_and_brand_when_known() {
        let mut product = tea();
        product.price = Some(12.5);
        product.brand = Some("TeaShop".into());

        let catalog = PlatformCatalog::builtin();
        let prompt = build_prompt(
            &product,
            catalog.get("linkedin").unwrap(),
            &GenerationOptions::default(),
        );
        assert!(prompt.contains("- Price: $12.5"));
        assert!(prompt.contains("- Brand: TeaShop"));
    }

    #[test]
    fn test_length_hints_verbatim() {
        assert!(prompt_for("facebook_carousel").contains("- Max text length: 125 characters\n"));
        assert!(prompt_for("linkedin").contains("- Max text length: 150 characters\n"));
        assert!(prompt_for("google_display").contains("- Max text-to-image ratio: 0.2\n"));
    }

    #[test]
    fn test_schema_varies_by_family() {
        assert!(prompt_for("instagram_story").contains("\"slides\""));
        assert!(prompt_for("facebook_carousel").contains("\"cards\""));
        assert!(prompt_for("google_display").contains("\"sizes\""));
        assert!(prompt_for("google_display").contains("728x90 (Leaderboard)"));

        let single = prompt_for("linkedin");
        assert!(single.contains("\"bodyCopy\""));
        assert!(single.contains("\"voiceTone\": \"professional\""));
        assert!(!single.contains("\"slides\""));
    }

    #[test]
    fn test_focus_benefit_and_count() {
        let catalog = PlatformCatalog::builtin();
        let options = GenerationOptions {
            variation_count: 2,
            focus_benefit: Some("all-day energy".into()),
            ..Default::default()
        };
        let prompt = build_prompt(&tea(), catalog.get("instagram_feed").unwrap(), &options);

        assert!(prompt.contains("**Focus Benefit:** Lead with all-day energy"));
        assert!(prompt.contains("Generate 2 unique creative variations"));
    }

    #[test]
    fn test_creative_request_settings() {
        let catalog = PlatformCatalog::builtin();
        let request = build_creative_request(
            &tea(),
            catalog.get("linkedin").unwrap(),
            &GenerationOptions::default(),
        );

        assert!(request.system.contains("specializing in linkedin advertising"));
        assert!(request.system.ends_with("Always respond with valid JSON."));
        assert_eq!(request.temperature, 0.8);
        assert_eq!(request.max_tokens, 2000);
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render("{a} and {b}", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "{b} and x");

        let out = render("{ \"json\": {unknown} }", &[("a", "1")]);
        assert_eq!(out, "{ \"json\": {unknown} }");
    }
}
