//! Testing utilities including mock implementations.
//!
//! Deterministic stand-ins for the generation provider and the product-page
//! fetcher, so pipelines can be exercised without network calls or keys.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult, ScrapeError, ScrapeResult};
use crate::traits::fetcher::SourceFetcher;
use crate::traits::provider::{
    CompletionRequest, GenerationProvider, ImageGenerationRequest, JsonCompletion, ProviderImage,
};
use crate::types::creative::{Creative, Visual};
use crate::types::product::ScrapedProduct;

/// Tokens reported per completion unless overridden.
pub const DEFAULT_MOCK_TOKENS: u32 = 150;

/// Scripted failure for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Connection-level failure
    Network,
    /// Provider answered with an error
    Api,
    /// Credential rejected by the provider
    Config,
    /// Provider answered with text that is not JSON
    Malformed,
}

/// A mock generation provider.
///
/// Responds with canned JSON per platform (matched on the system prompt),
/// falls back to a generic five-variation response, and records every call.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<RwLock<HashMap<String, Value>>>,
    default_response: Option<Value>,
    failures: Arc<RwLock<HashMap<String, MockFailure>>>,
    fail_images: bool,
    has_credentials: bool,
    tokens: u32,
    delay: Option<Duration>,
    completions: Arc<RwLock<Vec<CompletionRequest>>>,
    image_requests: Arc<RwLock<Vec<ImageGenerationRequest>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            default_response: None,
            failures: Arc::new(RwLock::new(HashMap::new())),
            fail_images: false,
            has_credentials: true,
            tokens: DEFAULT_MOCK_TOKENS,
            delay: None,
            completions: Arc::new(RwLock::new(Vec::new())),
            image_requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Canned response body for one platform.
    pub fn with_response(self, platform: impl Into<String>, body: Value) -> Self {
        self.responses.write().unwrap().insert(platform.into(), body);
        self
    }

    /// Response body for calls that match no platform.
    pub fn with_default_response(mut self, body: Value) -> Self {
        self.default_response = Some(body);
        self
    }

    /// Make every call for a platform fail.
    pub fn with_failure(self, platform: impl Into<String>, failure: MockFailure) -> Self {
        self.failures.write().unwrap().insert(platform.into(), failure);
        self
    }

    /// Make every image render fail.
    pub fn with_image_failures(mut self) -> Self {
        self.fail_images = true;
        self
    }

    /// Behave like a provider with no API key.
    pub fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sleep before answering each completion.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All completion requests received so far.
    pub fn completions(&self) -> Vec<CompletionRequest> {
        self.completions.read().unwrap().clone()
    }

    pub fn completion_calls(&self) -> usize {
        self.completions.read().unwrap().len()
    }

    pub fn image_requests(&self) -> Vec<ImageGenerationRequest> {
        self.image_requests.read().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.completions.write().unwrap().clear();
        self.image_requests.write().unwrap().clear();
    }

    /// Platform named in the system prompt, if any is configured.
    fn matching<T: Clone>(map: &RwLock<HashMap<String, T>>, system: &str) -> Option<T> {
        map.read()
            .unwrap()
            .iter()
            .find(|(platform, _)| system.contains(&format!("specializing in {} advertising", platform)))
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn check_credentials(&self) -> ProviderResult<()> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(ProviderError::Config("OpenAI API key not configured".into()))
        }
    }

    async fn complete_json(&self, request: &CompletionRequest) -> ProviderResult<JsonCompletion> {
        self.completions.write().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = Self::matching(&self.failures, &request.system) {
            return match failure {
                MockFailure::Network => Err(ProviderError::Network("connection reset".into())),
                MockFailure::Api => Err(ProviderError::Api("500 internal error".into())),
                MockFailure::Config => Err(ProviderError::Config("invalid API key".into())),
                MockFailure::Malformed => Ok(JsonCompletion {
                    content: "Sorry, I can't help with that.".into(),
                    tokens_used: self.tokens,
                }),
            };
        }

        let body = Self::matching(&self.responses, &request.system)
            .or_else(|| self.default_response.clone())
            .unwrap_or_else(|| sample_response(5));

        Ok(JsonCompletion {
            content: body.to_string(),
            tokens_used: self.tokens,
        })
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> ProviderResult<ProviderImage> {
        let index = {
            let mut requests = self.image_requests.write().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if self.fail_images {
            return Err(ProviderError::Api("content policy violation".into()));
        }

        Ok(ProviderImage {
            url: format!("https://images.example.com/generated/{}.png", index),
            revised_prompt: Some(format!("Revised: {}", request.prompt.lines().next().unwrap_or(""))),
        })
    }
}

/// Generic flat-schema response with `count` distinct variations.
pub fn sample_response(count: usize) -> Value {
    let variations: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Variation {}", i),
                "headline": format!("Fuel Your Day #{}", i),
                "subheadline": "Organic energy, naturally",
                "bodyCopy": "Premium organic green tea that keeps you sharp through every meeting.",
                "callToAction": "Shop Now",
                "visualDescription": "A steaming cup of green tea on a sunlit desk beside an open laptop",
                "layout": {"style": "minimalist", "composition": "product left, copy right"},
                "colors": {"primary": "#2C5F2D", "secondary": "#97BC62"},
                "hashtags": ["#greentea", "#organic"],
                "targetEmotion": "trust"
            })
        })
        .collect();

    json!({ "variations": variations })
}

/// A fully populated creative for tests.
pub fn sample_creative(platform: &str) -> Creative {
    Creative {
        platform: platform.to_string(),
        name: Some("Sample".to_string()),
        headline: "Fuel Your Day".to_string(),
        subheadline: Some("Organic energy, naturally".to_string()),
        body_copy: "Premium organic green tea that keeps you sharp through every meeting.".to_string(),
        call_to_action: "Shop Now".to_string(),
        hashtags: vec!["#greentea".to_string()],
        visual: Visual {
            style: "minimalist".to_string(),
            layout_type: "product left, copy right".to_string(),
            image_prompt: "A steaming cup of green tea on a sunlit desk beside an open laptop".to_string(),
            color_scheme: vec!["#2C5F2D".to_string(), "#97BC62".to_string()],
            image_url: None,
        },
        target_emotions: vec!["trust".to_string()],
        performance_score: 90,
        tokens_used: DEFAULT_MOCK_TOKENS,
        variation_id: "1".to_string(),
    }
}

/// A mock product-page fetcher.
///
/// Serves canned pages by URL; unknown URLs (or every URL, when failing)
/// produce a `ScrapeError`.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, ScrapedProduct>>>,
    always_fail: bool,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose every request times out.
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    pub fn with_page(self, url: impl Into<String>, product: ScrapedProduct) -> Self {
        self.pages.write().unwrap().insert(url.into(), product);
        self
    }

    /// URLs requested so far.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch_product(&self, url: &str) -> ScrapeResult<ScrapedProduct> {
        self.fetched.write().unwrap().push(url.to_string());

        if self.always_fail {
            return Err(ScrapeError::Timeout { url: url.to_string() });
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
