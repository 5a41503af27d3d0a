//! Generation provider trait.
//!
//! Abstracts the two calls the pipeline makes to a generative AI service:
//! JSON-only text completion and image rendering. Implementations hold their
//! own client and credential; the pipeline receives one already constructed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;

/// A JSON-only chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model override; `None` uses the provider's configured text model
    pub model: Option<String>,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: None,
            system: system.into(),
            user: user.into(),
            temperature: 0.8,
            max_tokens: 2000,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Raw JSON text returned by the provider with its token bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonCompletion {
    pub content: String,
    pub tokens_used: u32,
}

/// An image rendering request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    /// Provider size string, e.g. "1024x1024"
    pub size: String,
    pub quality: String,
    pub style: String,
}

/// A rendered image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderImage {
    pub url: String,
    /// Prompt as rewritten by the provider
    pub revised_prompt: Option<String>,
}

/// Generative AI provider.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fail fast when the provider cannot possibly succeed (missing key).
    ///
    /// Called once when the generation client is built, before any
    /// network call.
    fn check_credentials(&self) -> ProviderResult<()> {
        Ok(())
    }

    /// Chat completion constrained to a JSON object response.
    async fn complete_json(&self, request: &CompletionRequest) -> ProviderResult<JsonCompletion>;

    /// Render one image.
    async fn generate_image(&self, request: &ImageGenerationRequest) -> ProviderResult<ProviderImage>;
}
