//! Generation client: provider calls plus response parsing.
//!
//! Built once per pipeline from an already-constructed provider. The
//! credential check happens here, at construction, and never per call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::images::{
    build_professional_prompt, image_size_for, ImageBrief, ImageStyle, LayoutType, IMAGE_QUALITY,
    IMAGE_RENDER_STYLE,
};
use super::normalize::{
    first_string, normalize_response, short_id, NormalizeContext, BODY_COPY, CALL_TO_ACTION,
    HEADLINE, SUBHEADLINE_PATHS,
};
use super::prompts::{
    build_creative_request, format_improve_prompt, format_variations_prompt,
    IMPROVE_SYSTEM_PROMPT, VARIATIONS_SYSTEM_PROMPT,
};
use super::score::predict_performance_score;
use crate::error::{GenerationError, GenerationResultOf, ProviderResult};
use crate::traits::provider::{CompletionRequest, GenerationProvider, ImageGenerationRequest};
use crate::types::creative::Creative;
use crate::types::platform::{PlatformCatalog, PlatformSpec};
use crate::types::product::{GenerationOptions, ProductInput};

/// Parsed provider output for one platform, before normalization.
#[derive(Debug, Clone)]
pub struct PlatformResponse {
    pub platform: String,
    pub body: Value,
    pub tokens_used: u32,
}

/// A rendered ad image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    pub image_url: String,
    pub revised_prompt: Option<String>,
    pub platform: String,
    pub size: String,
    pub style: ImageStyle,
    pub layout: LayoutType,
}

/// One image of a multi-style batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariation {
    pub id: String,
    #[serde(flatten)]
    pub image: RenderedImage,
    pub style_name: String,
    pub style_description: String,
}

pub struct GenerationClient<A: GenerationProvider> {
    provider: A,
    catalog: PlatformCatalog,
}

impl<A: GenerationProvider> GenerationClient<A> {
    /// Wrap a provider, failing with `ProviderError::Config` when it has no
    /// usable credential.
    pub fn new(provider: A) -> ProviderResult<Self> {
        provider.check_credentials()?;
        Ok(Self {
            provider,
            catalog: PlatformCatalog::builtin(),
        })
    }

    pub fn with_catalog(mut self, catalog: PlatformCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn provider(&self) -> &A {
        &self.provider
    }

    pub fn catalog(&self) -> &PlatformCatalog {
        &self.catalog
    }

    /// Look up a platform, failing the unit when it has no spec.
    pub fn spec(&self, platform: &str) -> GenerationResultOf<&PlatformSpec> {
        self.catalog
            .get(platform)
            .ok_or_else(|| GenerationError::UnsupportedPlatform {
                platform: platform.to_string(),
            })
    }

    /// One provider call for one platform.
    pub async fn request_platform(
        &self,
        product: &ProductInput,
        platform: &str,
        options: &GenerationOptions,
    ) -> GenerationResultOf<PlatformResponse> {
        let spec = self.spec(platform)?;
        let request = build_creative_request(product, spec, options);

        debug!(
            platform = %platform,
            family = ?spec.family,
            prompt_len = request.user.len(),
            "Requesting platform creatives"
        );

        let completion = self.provider.complete_json(&request).await?;
        let body = parse_json_content(&completion.content)?;

        info!(
            platform = %platform,
            tokens = completion.tokens_used,
            provider = self.provider.name(),
            "Platform creatives received"
        );

        Ok(PlatformResponse {
            platform: platform.to_string(),
            body,
            tokens_used: completion.tokens_used,
        })
    }

    /// Rewrite a creative in `count` different approaches.
    pub async fn generate_variations(
        &self,
        creative: &Creative,
        count: usize,
    ) -> GenerationResultOf<Vec<Creative>> {
        let count = count.max(1);
        let request =
            CompletionRequest::new(VARIATIONS_SYSTEM_PROMPT, format_variations_prompt(creative, count))
                .temperature(0.9)
                .max_tokens(1000);

        let completion = self.provider.complete_json(&request).await?;
        let body = parse_json_content(&completion.content)?;

        let body_limit = self.catalog.get(&creative.platform).and_then(|s| s.body_limit());
        let ctx = NormalizeContext::new(&creative.platform)
            .with_body_limit(body_limit)
            .with_colors(&creative.visual.color_scheme)
            .with_tokens(completion.tokens_used);

        let batch = normalize_response(&body, &ctx, count)?;
        for rejected in &batch.rejected {
            warn!(platform = %creative.platform, error = %rejected, "Variation skipped");
        }
        if batch.creatives.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(batch
            .creatives
            .into_iter()
            .map(|mut variation| {
                variation.visual.image_prompt = creative.visual.image_prompt.clone();
                variation.visual.style = creative.visual.style.clone();
                variation.visual.layout_type = creative.visual.layout_type.clone();
                variation.performance_score = predict_performance_score(&variation);
                variation
            })
            .collect())
    }

    /// Stronger hooks, clearer benefits and a stronger call to action.
    ///
    /// Fields the provider leaves out keep their current text.
    pub async fn improve_copy(&self, creative: &Creative) -> GenerationResultOf<Creative> {
        let request = CompletionRequest::new(IMPROVE_SYSTEM_PROMPT, format_improve_prompt(creative))
            .temperature(0.7)
            .max_tokens(500);

        let completion = self.provider.complete_json(&request).await?;
        let body = parse_json_content(&completion.content)?;
        let improved = match &body {
            Value::Object(_) => &body,
            _ => {
                return Err(GenerationError::MalformedResponse(
                    "improved copy is not a JSON object".into(),
                ))
            }
        };
        // some providers nest the answer under "improved"
        let improved = improved.get("improved").filter(|v| v.is_object()).unwrap_or(improved);

        let mut result = creative.clone();
        if let Some(headline) = first_string(improved, HEADLINE.paths) {
            result.headline = headline;
        }
        if let Some(sub) = first_string(improved, SUBHEADLINE_PATHS) {
            result.subheadline = Some(sub);
        }
        if let Some(body_copy) = first_string(improved, BODY_COPY.paths) {
            result.body_copy = match self.catalog.get(&creative.platform).and_then(|s| s.body_limit()) {
                Some(limit) => body_copy.chars().take(limit).collect(),
                None => body_copy,
            };
        }
        if let Some(cta) = first_string(improved, CALL_TO_ACTION.paths) {
            result.call_to_action = cta;
        }
        result.tokens_used = completion.tokens_used;
        result.performance_score = predict_performance_score(&result);

        Ok(result)
    }

    /// Render one image for a brief.
    pub async fn generate_image(&self, brief: &ImageBrief) -> GenerationResultOf<RenderedImage> {
        let size = image_size_for(&self.catalog, &brief.platform);
        let request = ImageGenerationRequest {
            prompt: build_professional_prompt(brief, &self.catalog),
            size: size.clone(),
            quality: IMAGE_QUALITY.to_string(),
            style: IMAGE_RENDER_STYLE.to_string(),
        };

        debug!(
            platform = %brief.platform,
            style = %brief.style,
            layout = %brief.layout,
            prompt_len = request.prompt.len(),
            "Requesting image"
        );

        let image = self.provider.generate_image(&request).await?;
        if image.url.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(RenderedImage {
            image_url: image.url,
            revised_prompt: image.revised_prompt,
            platform: brief.platform.clone(),
            size,
            style: brief.style,
            layout: brief.layout,
        })
    }

    /// One image per requested style, in style-vocabulary order.
    ///
    /// Stops at the first failed render.
    pub async fn generate_image_variations(
        &self,
        brief: &ImageBrief,
        styles: &[ImageStyle],
    ) -> GenerationResultOf<Vec<ImageVariation>> {
        let mut variations = Vec::new();

        for style in ImageStyle::ALL.into_iter().filter(|s| styles.contains(s)) {
            let styled = brief.clone().with_style(style);
            let image = self.generate_image(&styled).await?;
            variations.push(ImageVariation {
                id: short_id(),
                image,
                style_name: style.display_name().to_string(),
                style_description: style.description().to_string(),
            });
        }

        info!(platform = %brief.platform, count = variations.len(), "Image variations generated");
        Ok(variations)
    }
}

/// Parse provider text as JSON, tolerating a fenced code block around it.
pub fn parse_json_content(content: &str) -> GenerationResultOf<Value> {
    let stripped = strip_code_fence(content);
    if stripped.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    serde_json::from_str(stripped).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use serde_json::json;

    fn tea() -> ProductInput {
        ProductInput {
            product_name: "Organic Tea".into(),
            description: "Premium organic green tea".into(),
            target_audience: "busy professionals".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_credentials_fail_at_construction() {
        let err = GenerationClient::new(MockProvider::new().without_credentials())
            .err()
            .unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_parse_json_content() {
        assert_eq!(parse_json_content("{\"a\": 1}").unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_json_content("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert!(matches!(
            parse_json_content("not json"),
            Err(GenerationError::MalformedResponse(_))
        ));
        assert!(matches!(parse_json_content("   "), Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_unsupported_platform_never_calls_provider() {
        let client = GenerationClient::new(MockProvider::new()).unwrap();
        let err = client
            .request_platform(&tea(), "tiktok", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::UnsupportedPlatform { .. }));
        assert_eq!(client.provider().completion_calls(), 0);
    }

    #[tokio::test]
    async fn test_request_platform_returns_body_and_tokens() {
        let provider = MockProvider::new()
            .with_response("linkedin", json!({"variations": [{"headline": "Hi"}]}))
            .with_tokens(321);
        let client = GenerationClient::new(provider).unwrap();

        let response = client
            .request_platform(&tea(), "linkedin", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(response.platform, "linkedin");
        assert_eq!(response.tokens_used, 321);
        assert_eq!(response.body["variations"][0]["headline"], "Hi");

        let calls = client.provider().completions();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("linkedin"));
        assert_eq!(calls[0].temperature, 0.8);
    }

    #[tokio::test]
    async fn test_improve_copy_keeps_missing_fields() {
        let provider = MockProvider::new().with_default_response(json!({"headline": "Sharper Mornings!"}));
        let client = GenerationClient::new(provider).unwrap();

        let original = crate::testing::sample_creative("linkedin");
        let improved = client.improve_copy(&original).await.unwrap();

        assert_eq!(improved.headline, "Sharper Mornings!");
        assert_eq!(improved.body_copy, original.body_copy);
        assert_eq!(improved.call_to_action, original.call_to_action);

        let calls = client.provider().completions();
        assert_eq!(calls[0].temperature, 0.7);
        assert_eq!(calls[0].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_generate_variations() {
        let provider = MockProvider::new().with_default_response(json!({
            "variations": [
                {"headline": "Feel the calm", "bodyCopy": "Emotional", "callToAction": "Try It"},
                {"headline": "3x antioxidants", "bodyCopy": "Logical", "callToAction": "Learn Why"},
                {"headline": "Today only", "bodyCopy": "Urgent", "callToAction": "Buy Now"}
            ]
        }));
        let client = GenerationClient::new(provider).unwrap();
        let original = crate::testing::sample_creative("instagram_feed");

        let variations = client.generate_variations(&original, 2).await.unwrap();

        assert_eq!(variations.len(), 2);
        assert_eq!(variations[0].headline, "Feel the calm");
        assert_eq!(variations[1].platform, "instagram_feed");
        assert_eq!(variations[0].visual.image_prompt, original.visual.image_prompt);
        assert!(variations.iter().all(|v| v.performance_score >= 50));

        let calls = client.provider().completions();
        assert_eq!(calls[0].temperature, 0.9);
        assert_eq!(calls[0].max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_generate_image_uses_platform_size() {
        let client = GenerationClient::new(MockProvider::new()).unwrap();
        let brief = ImageBrief::new("Tea on a desk", "instagram_story");

        let image = client.generate_image(&brief).await.unwrap();
        assert_eq!(image.size, "1024x1792");
        assert_eq!(image.platform, "instagram_story");

        let requests = client.provider().image_requests();
        assert_eq!(requests[0].quality, "hd");
        assert_eq!(requests[0].style, "vivid");
        assert!(requests[0].prompt.contains("Tea on a desk"));
    }

    #[tokio::test]
    async fn test_image_variations_follow_vocabulary_order() {
        let client = GenerationClient::new(MockProvider::new()).unwrap();
        let brief = ImageBrief::new("Tea", "instagram_feed");

        let variations = client
            .generate_image_variations(&brief, &[ImageStyle::Bold, ImageStyle::Modern])
            .await
            .unwrap();

        let names: Vec<&str> = variations.iter().map(|v| v.style_name.as_str()).collect();
        assert_eq!(names, vec!["Modern Professional", "Bold Impact"]);
        assert_eq!(variations[0].id.len(), 9);
    }
}
