//! Pure OpenAI REST API client
//!
//! A clean, minimal client for the OpenAI API with no domain-specific logic.
//! Supports JSON-mode chat completions (with token usage) and image generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! // JSON-mode chat completion
//! let response = client.chat_completion(
//!     ChatRequest::new("gpt-4-turbo-preview")
//!         .message(Message::system("Always respond with valid JSON."))
//!         .message(Message::user("Write a headline"))
//!         .json_mode()
//! ).await?;
//!
//! // Image generation
//! let image = client.generate_image(ImageRequest::new("dall-e-3", "A teapot")).await?;
//! ```

pub mod error;
pub mod images;
pub mod types;

pub use error::{OpenAIError, Result};
pub use images::{GeneratedImage, ImageRequest};
pub use types::*;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        if api_key.trim().is_empty() {
            return Err(OpenAIError::Config("OPENAI_API_KEY is empty".into()));
        }
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get the first choice's
    /// content back together with the token usage reported by the API.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let chat_response: types::ChatResponseRaw =
            self.post_json("chat/completions", &request).await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAIError::Api("No response from OpenAI".into()))?;

        debug!(
            model = %request.model,
            json_mode = request.response_format.is_some(),
            total_tokens = chat_response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }

    /// Image generation.
    ///
    /// Returns the first generated image's URL and the prompt as rewritten
    /// by the provider (if it rewrote it).
    pub async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage> {
        let start = std::time::Instant::now();

        let image_response: images::ImageResponseRaw =
            self.post_json("images/generations", &request).await?;

        let image = image_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| OpenAIError::Api("No image from OpenAI".into()))?;

        let url = image
            .url
            .ok_or_else(|| OpenAIError::Parse("Image response has no url".into()))?;

        debug!(
            model = %request.model,
            size = %request.size,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI image generation"
        );

        Ok(GeneratedImage {
            url,
            revised_prompt: image.revised_prompt,
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, path = path, "OpenAI request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, path = path, "OpenAI API error");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(OpenAIError::Config(format!(
                    "OpenAI rejected the API key: {}",
                    error_text
                )));
            }
            return Err(OpenAIError::Api(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))
    }
}
