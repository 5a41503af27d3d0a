//! Provider credentials and pipeline defaults.
//!
//! The API key is held in a [`SecretString`] so it never reaches logs or
//! debug output.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

pub const DEFAULT_TEXT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Credentials and model selection for the generation provider.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub api_key: SecretString,
    pub text_model: String,
    pub image_model: String,
    pub base_url: Option<String>,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: None,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_TEXT_MODEL`, `OPENAI_IMAGE_MODEL` and
    /// `OPENAI_BASE_URL`.
    ///
    /// A missing or blank key is a configuration error.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::Config("OpenAI API key not configured".into()))?;

        let mut creds = Self::new(api_key);
        if let Some(model) = non_empty_var("OPENAI_TEXT_MODEL") {
            creds.text_model = model;
        }
        if let Some(model) = non_empty_var("OPENAI_IMAGE_MODEL") {
            creds.image_model = model;
        }
        creds.base_url = non_empty_var("OPENAI_BASE_URL");

        Ok(creds)
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Whether a usable key is present.
    pub fn has_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"[REDACTED]")
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Pipeline-wide defaults applied when a request leaves them unset.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Platform used when a request names none
    pub default_platform: String,
    pub default_variation_count: usize,
    /// Upper bound on a caller's variation override
    pub max_variation_count: usize,
    pub scrape_timeout: Duration,
    /// Render images unless the request says otherwise
    pub generate_images: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_platform: "instagram_feed".to_string(),
            default_variation_count: 3,
            max_variation_count: 10,
            scrape_timeout: Duration::from_secs(10),
            generate_images: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_default_platform(mut self, platform: impl Into<String>) -> Self {
        self.default_platform = platform.into();
        self
    }

    pub fn with_variation_count(mut self, count: usize) -> Self {
        self.default_variation_count = count.max(1);
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.generate_images = enabled;
        self
    }

    /// Clamp a requested variation count into `1..=max_variation_count`.
    pub fn variation_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_variation_count)
            .clamp(1, self.max_variation_count.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = ProviderCredentials::new("sk-super-secret-key");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("sk-super"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains(DEFAULT_TEXT_MODEL));
    }

    #[test]
    fn test_blank_key_is_not_usable() {
        assert!(!ProviderCredentials::new("   ").has_key());
        assert!(ProviderCredentials::new("sk-1").has_key());
    }

    #[test]
    fn test_variation_count_clamped() {
        let config = PipelineConfig::default();
        assert_eq!(config.variation_count(None), 3);
        assert_eq!(config.variation_count(Some(0)), 1);
        assert_eq!(config.variation_count(Some(50)), 10);
        assert_eq!(config.variation_count(Some(4)), 4);
    }
}
