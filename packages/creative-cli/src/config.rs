use anyhow::{Context, Result};
use creative_engine::{PipelineConfig, ProviderCredentials};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: ProviderCredentials,
    /// Credits granted to the local account on every invocation
    pub default_credits: u32,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let credentials =
            ProviderCredentials::from_env().context("OPENAI_API_KEY must be set")?;

        let default_credits = env::var("ADGEN_DEFAULT_CREDITS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("ADGEN_DEFAULT_CREDITS must be a valid number")?;

        let mut pipeline = PipelineConfig::default();
        if let Ok(platform) = env::var("ADGEN_DEFAULT_PLATFORM") {
            pipeline = pipeline.with_default_platform(platform);
        }
        if let Ok(count) = env::var("ADGEN_VARIATIONS") {
            pipeline = pipeline.with_variation_count(
                count
                    .parse()
                    .context("ADGEN_VARIATIONS must be a valid number")?,
            );
        }
        if let Ok(secs) = env::var("ADGEN_SCRAPE_TIMEOUT_SECS") {
            pipeline.scrape_timeout = Duration::from_secs(
                secs.parse()
                    .context("ADGEN_SCRAPE_TIMEOUT_SECS must be a valid number")?,
            );
        }

        Ok(Self {
            credentials,
            default_credits,
            pipeline,
        })
    }
}
