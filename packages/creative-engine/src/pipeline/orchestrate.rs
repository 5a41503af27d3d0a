//! Pipeline orchestrator.
//!
//! Sequences one generation run:
//!
//! ```text
//! Idle → CheckingQuota → (Enriching) → Analyzing → GeneratingPerPlatform
//!      → Normalizing → Scoring → CommittingQuota → Done
//! ```
//!
//! Insufficient credits and provider configuration errors end in `Error`
//! with no side effects. Per-platform failures are recorded and the run
//! continues; a run that produced nothing also ends in `Error` and costs
//! nothing. Everything before `CommittingQuota` races the caller's
//! cancellation token; the commit itself does not.

use chrono::Utc;
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::generate::{GenerationClient, PlatformResponse};
use super::images::{ImageBrief, ImageStyle, LayoutType};
use super::normalize::{normalize_response, NormalizeContext};
use super::score::predict_performance_score;
use crate::analyzer::{analyze_product_text, TextAnalysis};
use crate::config::PipelineConfig;
use crate::enrichment::extract_color_palette;
use crate::error::{GenerationResultOf, PipelineError, Result, ScrapeError, ScrapeResult};
use crate::quota::{QuotaLedger, Reservation};
use crate::traits::fetcher::SourceFetcher;
use crate::traits::provider::GenerationProvider;
use crate::traits::store::QuotaStore;
use crate::types::creative::Creative;
use crate::types::platform::PlatformCatalog;
use crate::types::product::{AdRequest, GenerationOptions, ProductInput, ScrapedProduct};
use crate::types::result::{FailureKind, GenerationMetadata, GenerationResult, UnitFailure};

/// Stage of a generation run, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    CheckingQuota,
    Enriching,
    Analyzing,
    GeneratingPerPlatform,
    Normalizing,
    Scoring,
    CommittingQuota,
    Done,
    Error,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::CheckingQuota => "checking_quota",
            Self::Enriching => "enriching",
            Self::Analyzing => "analyzing",
            Self::GeneratingPerPlatform => "generating_per_platform",
            Self::Normalizing => "normalizing",
            Self::Scoring => "scoring",
            Self::CommittingQuota => "committing_quota",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

struct StageTracker<'a> {
    user_id: &'a str,
    stage: PipelineStage,
}

impl<'a> StageTracker<'a> {
    fn new(user_id: &'a str) -> Self {
        Self {
            user_id,
            stage: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(user_id = %self.user_id, from = %self.stage, to = %next, "Pipeline stage");
        self.stage = next;
    }
}

/// Scrape and analysis of a product URL, without generating anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPreview {
    pub product: ScrapedProduct,
    pub analysis: TextAnalysis,
    pub colors: Vec<String>,
}

/// Everything a run produced before its quota commit.
struct PreparedRun {
    reservation: Reservation,
    product: ProductInput,
    analysis: TextAnalysis,
    options: GenerationOptions,
    platforms: Vec<String>,
    creatives: IndexMap<String, Vec<Creative>>,
    failures: Vec<UnitFailure>,
    total_tokens: u64,
}

/// The ad-creative generation pipeline.
///
/// Generic over the provider, the account store and the page fetcher.
/// Invocations share nothing mutable except the account store.
pub struct Pipeline<A, Q, F>
where
    A: GenerationProvider,
    Q: QuotaStore,
    F: SourceFetcher,
{
    client: GenerationClient<A>,
    ledger: QuotaLedger<Q>,
    fetcher: F,
    config: PipelineConfig,
}

impl<A, Q, F> Pipeline<A, Q, F>
where
    A: GenerationProvider,
    Q: QuotaStore,
    F: SourceFetcher,
{
    /// Build a pipeline. A provider without a usable credential is a
    /// configuration error here, before any request is accepted.
    pub fn new(provider: A, quota: Arc<Q>, fetcher: F) -> Result<Self> {
        let client = GenerationClient::new(provider)
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            ledger: QuotaLedger::new(quota),
            fetcher,
            config: PipelineConfig::default(),
        })
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_catalog(mut self, catalog: PlatformCatalog) -> Self {
        self.client = self.client.with_catalog(catalog);
        self
    }

    pub fn client(&self) -> &GenerationClient<A> {
        &self.client
    }

    pub fn ledger(&self) -> &QuotaLedger<Q> {
        &self.ledger
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one generation request for `user_id`.
    ///
    /// Costs exactly one credit when at least one creative is returned and
    /// nothing otherwise.
    pub async fn generate(
        &self,
        user_id: &str,
        request: &AdRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        let mut tracker = StageTracker::new(user_id);

        let prepared = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            result = self.prepare(user_id, request, &mut tracker) => result,
        };

        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(user_id = %user_id, stage = %tracker.stage, error = %e, "Generation run failed");
                tracker.advance(PipelineStage::Error);
                return Err(e);
            }
        };

        tracker.advance(PipelineStage::CommittingQuota);
        let credits_remaining = match self.ledger.commit(prepared.reservation).await {
            Ok(remaining) => remaining,
            Err(e) => {
                tracker.advance(PipelineStage::Error);
                return Err(e.into());
            }
        };

        let produced: usize = prepared.creatives.values().map(Vec::len).sum();
        let metadata = GenerationMetadata {
            total_tokens_used: prepared.total_tokens,
            platforms_generated: prepared.creatives.keys().cloned().collect(),
            generated_at: Utc::now(),
            variations_per_platform: prepared.options.variation_count,
            requested: prepared.platforms.len() * prepared.options.variation_count,
            produced,
        };

        tracker.advance(PipelineStage::Done);
        info!(
            user_id = %user_id,
            produced,
            requested = metadata.requested,
            failures = prepared.failures.len(),
            tokens = prepared.total_tokens,
            credits_remaining,
            "Generation run complete"
        );

        Ok(GenerationResult {
            creatives: prepared.creatives,
            failures: prepared.failures,
            metadata,
            product: prepared.product,
            analysis: prepared.analysis,
            credits_remaining,
        })
    }

    async fn prepare(
        &self,
        user_id: &str,
        request: &AdRequest,
        tracker: &mut StageTracker<'_>,
    ) -> Result<PreparedRun> {
        tracker.advance(PipelineStage::CheckingQuota);
        let reservation = self.ledger.check_and_reserve(user_id).await?;

        let scraped = match request.enrichment_url() {
            Some(url) => {
                tracker.advance(PipelineStage::Enriching);
                match self.fetch(url).await {
                    Ok(product) => Some(product),
                    Err(e) => {
                        warn!(url = %url, fetcher = self.fetcher.name(), error = %e, "Enrichment failed, using manual fields");
                        None
                    }
                }
            }
            None => None,
        };

        let mut product = merge_product(request, scraped)?;

        tracker.advance(PipelineStage::Analyzing);
        let analysis = analyze_product_text(&product.description);
        product.features = analysis.features.clone();
        product.benefits = analysis.benefits.clone();

        let custom = &request.customization;
        let options = GenerationOptions {
            tone: custom.tone.or(request.tone).unwrap_or(analysis.tone),
            variation_count: self.config.variation_count(custom.variations),
            focus_benefit: custom.focus_benefit.clone(),
            generate_images: custom.generate_images.unwrap_or(self.config.generate_images),
        };
        product.tone = options.tone;

        let platforms = self.requested_platforms(request);

        tracker.advance(PipelineStage::GeneratingPerPlatform);
        let (product_ref, options_ref) = (&product, &options);
        let responses = join_all(platforms.iter().map(|platform| async move {
            (
                platform.clone(),
                self.client.request_platform(product_ref, platform, options_ref).await,
            )
        }))
        .await;

        let mut failures = Vec::new();
        let mut ok_responses: Vec<PlatformResponse> = Vec::new();
        for (platform, outcome) in responses {
            match outcome {
                Ok(response) => ok_responses.push(response),
                Err(e) if e.is_fatal() => {
                    return Err(PipelineError::Configuration(e.to_string()));
                }
                Err(e) => {
                    warn!(platform = %platform, error = %e, "Platform generation failed");
                    failures.push(UnitFailure::new(platform, FailureKind::Generation, e.to_string()));
                }
            }
        }

        tracker.advance(PipelineStage::Normalizing);
        let mut creatives: IndexMap<String, Vec<Creative>> = IndexMap::new();
        let mut total_tokens: u64 = 0;
        for response in &ok_responses {
            total_tokens += u64::from(response.tokens_used);
            match self.normalize(response, &product, options.variation_count) {
                Ok((batch, rejected)) => {
                    failures.extend(rejected);
                    if !batch.is_empty() {
                        creatives.insert(response.platform.clone(), batch);
                    }
                }
                Err(e) => {
                    warn!(platform = %response.platform, error = %e, "Platform response unusable");
                    failures.push(UnitFailure::new(
                        response.platform.clone(),
                        FailureKind::Generation,
                        e.to_string(),
                    ));
                }
            }
        }

        tracker.advance(PipelineStage::Scoring);
        for creative in creatives.values_mut().flatten() {
            creative.performance_score = predict_performance_score(creative);
        }

        if creatives.is_empty() {
            return Err(PipelineError::AllUnitsFailed { failures });
        }

        if options.generate_images {
            self.render_images(&mut creatives, &mut failures).await;
        }

        Ok(PreparedRun {
            reservation,
            product,
            analysis,
            options,
            platforms,
            creatives,
            failures,
            total_tokens,
        })
    }

    /// Requested platforms, deduplicated in request order.
    fn requested_platforms(&self, request: &AdRequest) -> Vec<String> {
        let mut platforms: Vec<String> = Vec::new();
        for platform in &request.platforms {
            let platform = platform.trim();
            if !platform.is_empty() && !platforms.iter().any(|p| p == platform) {
                platforms.push(platform.to_string());
            }
        }
        if platforms.is_empty() {
            platforms.push(self.config.default_platform.clone());
        }
        platforms
    }

    fn normalize(
        &self,
        response: &PlatformResponse,
        product: &ProductInput,
        max: usize,
    ) -> GenerationResultOf<(Vec<Creative>, Vec<UnitFailure>)> {
        let spec = self.client.spec(&response.platform)?;
        let ctx = NormalizeContext::for_spec(spec)
            .with_colors(&product.colors)
            .with_tokens(response.tokens_used);

        let batch = normalize_response(&response.body, &ctx, max)?;
        let rejected = batch
            .rejected
            .iter()
            .map(|e| UnitFailure::new(response.platform.clone(), FailureKind::Normalization, e.to_string()))
            .collect();

        Ok((batch.creatives, rejected))
    }

    async fn render_images(
        &self,
        creatives: &mut IndexMap<String, Vec<Creative>>,
        failures: &mut Vec<UnitFailure>,
    ) {
        let targets: Vec<&mut Creative> = creatives.values_mut().flatten().collect();
        debug!(count = targets.len(), "Rendering creative images");

        let rendered = join_all(targets.into_iter().map(|creative| async move {
            let brief = ImageBrief::new(creative.visual.image_prompt.clone(), creative.platform.clone())
                .with_style(ImageStyle::from_name(&creative.visual.style))
                .with_layout(LayoutType::from_name(&creative.visual.layout_type));

            match self.client.generate_image(&brief).await {
                Ok(image) => {
                    creative.visual.image_url = Some(image.image_url);
                    None
                }
                Err(e) => {
                    warn!(platform = %creative.platform, variation = %creative.variation_id, error = %e, "Image generation failed");
                    Some(UnitFailure::new(
                        creative.platform.clone(),
                        FailureKind::Image,
                        format!("{}: {}", creative.variation_id, e),
                    ))
                }
            }
        }))
        .await;

        failures.extend(rendered.into_iter().flatten());
    }

    async fn fetch(&self, url: &str) -> ScrapeResult<ScrapedProduct> {
        match tokio::time::timeout(self.config.scrape_timeout, self.fetcher.fetch_product(url)).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Scrape and analyze a product page. Touches no quota.
    pub async fn preview_url(&self, url: &str) -> ScrapeResult<UrlPreview> {
        let product = self.fetch(url).await?;
        let analysis = analyze_product_text(product.description.as_deref().unwrap_or(""));
        let colors = extract_color_palette(&product.images);

        Ok(UrlPreview {
            product,
            analysis,
            colors,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Manual fields win; scraped fields fill the gaps.
fn merge_product(request: &AdRequest, scraped: Option<ScrapedProduct>) -> Result<ProductInput> {
    let scraped = scraped.unwrap_or_default();

    let product_name = non_blank(request.product_name.as_deref())
        .or_else(|| non_blank(scraped.title.as_deref()))
        .ok_or_else(|| PipelineError::InvalidRequest {
            reason: "product name is required when no product page could be read".into(),
        })?;
    let description = non_blank(request.product_description.as_deref())
        .or_else(|| non_blank(scraped.description.as_deref()))
        .ok_or_else(|| PipelineError::InvalidRequest {
            reason: "product description is required when no product page could be read".into(),
        })?;

    let colors = extract_color_palette(&scraped.images);
    let category = (!scraped.category.is_empty()).then_some(scraped.category);

    Ok(ProductInput {
        product_name,
        description,
        target_audience: request.target_audience.trim().to_string(),
        tone: request.tone.unwrap_or_default(),
        price: scraped.price,
        brand: scraped.brand,
        images: scraped.images,
        colors,
        features: Vec::new(),
        benefits: Vec::new(),
        category,
        source_url: request.enrichment_url().map(str::to_string),
    })
}
