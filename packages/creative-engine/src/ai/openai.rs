//! OpenAI implementation of [`GenerationProvider`].
//!
//! # Example
//!
//! ```rust,ignore
//! use creative_engine::ai::OpenAIProvider;
//! use creative_engine::config::ProviderCredentials;
//!
//! let provider = OpenAIProvider::new(ProviderCredentials::from_env()?);
//! let client = GenerationClient::new(provider)?;
//! ```

use async_trait::async_trait;
use openai_client::{ChatRequest, ImageRequest, Message, OpenAIClient, OpenAIError};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::config::ProviderCredentials;
use crate::error::{ProviderError, ProviderResult};
use crate::traits::provider::{
    CompletionRequest, GenerationProvider, ImageGenerationRequest, JsonCompletion, ProviderImage,
};

/// Generation provider backed by the OpenAI REST API.
pub struct OpenAIProvider {
    client: OpenAIClient,
    credentials: ProviderCredentials,
}

impl OpenAIProvider {
    pub fn new(credentials: ProviderCredentials) -> Self {
        let mut client = OpenAIClient::new(credentials.api_key.expose_secret());
        if let Some(url) = &credentials.base_url {
            client = client.with_base_url(url.clone());
        }
        Self {
            client,
            credentials,
        }
    }

    /// Provider configured from `OPENAI_*` environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Ok(Self::new(ProviderCredentials::from_env()?))
    }

    pub fn text_model(&self) -> &str {
        &self.credentials.text_model
    }

    pub fn image_model(&self) -> &str {
        &self.credentials.image_model
    }
}

impl From<OpenAIError> for ProviderError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Config(msg) => ProviderError::Config(msg),
            OpenAIError::Network(msg) => ProviderError::Network(msg),
            OpenAIError::Api(msg) => ProviderError::Api(msg),
            OpenAIError::Parse(msg) => ProviderError::Parse(msg),
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn check_credentials(&self) -> ProviderResult<()> {
        if self.credentials.has_key() {
            Ok(())
        } else {
            Err(ProviderError::Config("OpenAI API key not configured".into()))
        }
    }

    async fn complete_json(&self, request: &CompletionRequest) -> ProviderResult<JsonCompletion> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.credentials.text_model);

        debug!(model = %model, temperature = request.temperature, "OpenAI chat completion");

        let response = self
            .client
            .chat_completion(
                ChatRequest::new(model)
                    .message(Message::system(&request.system))
                    .message(Message::user(&request.user))
                    .temperature(request.temperature)
                    .max_tokens(request.max_tokens)
                    .json_mode(),
            )
            .await?;

        let tokens_used = response.total_tokens();
        Ok(JsonCompletion {
            content: response.content,
            tokens_used,
        })
    }

    async fn generate_image(&self, request: &ImageGenerationRequest) -> ProviderResult<ProviderImage> {
        let image = self
            .client
            .generate_image(
                ImageRequest::new(&self.credentials.image_model, &request.prompt)
                    .size(&request.size)
                    .quality(&request.quality)
                    .style(&request.style),
            )
            .await?;

        Ok(ProviderImage {
            url: image.url,
            revised_prompt: image.revised_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_fails_credential_check() {
        let provider = OpenAIProvider::new(ProviderCredentials::new(""));
        assert!(provider.check_credentials().unwrap_err().is_config());
    }

    #[test]
    fn test_models_from_credentials() {
        let provider = OpenAIProvider::new(
            ProviderCredentials::new("sk-test")
                .with_text_model("gpt-4o")
                .with_base_url("http://localhost:9999/v1"),
        );
        assert!(provider.check_credentials().is_ok());
        assert_eq!(provider.text_model(), "gpt-4o");
        assert_eq!(provider.image_model(), "dall-e-3");
    }

    /// Answers one request with a chat completion whose content is fenced JSON.
    async fn serve_fenced_completion() -> u16 {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // drain headers and body before answering
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .map(str::to_ascii_lowercase)
                        .find_map(|l| {
                            l.strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let body = serde_json::json!({
                "choices": [{"message": {"content": "```json\n{\"headline\": \"Fuel Your Day\"}\n```"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        port
    }

    #[tokio::test]
    async fn test_completion_content_is_passed_through_raw() {
        let port = serve_fenced_completion().await;
        let provider = OpenAIProvider::new(
            ProviderCredentials::new("sk-test").with_base_url(format!("http://127.0.0.1:{}/v1", port)),
        );

        let completion = provider
            .complete_json(&CompletionRequest::new("system", "user"))
            .await
            .unwrap();

        assert!(completion.content.starts_with("```json"));
        assert_eq!(completion.tokens_used, 15);

        let value = crate::pipeline::generate::parse_json_content(&completion.content).unwrap();
        assert_eq!(value["headline"], "Fuel Your Day");
    }

    #[test]
    fn test_error_mapping_keeps_config_fatal() {
        let err: ProviderError = OpenAIError::Config("401".into()).into();
        assert!(err.is_config());
        let err: ProviderError = OpenAIError::Network("reset".into()).into();
        assert!(!err.is_config());
    }
}
