//! Multi-Platform Ad Creative Generation
//!
//! Turns a product (typed in, or scraped from its page) into ready-to-use
//! ad creatives for several social and display platforms at once.
//!
//! # Flow
//!
//! ```text
//! AdRequest → quota check → enrichment → text analysis
//!           → one provider call per platform (concurrent)
//!           → normalize → score → (images) → quota commit → GenerationResult
//! ```
//!
//! A run costs one credit when it returns at least one creative and nothing
//! otherwise. A failing platform never takes the others down with it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use creative_engine::{AdRequest, MemoryQuotaStore, Pipeline};
//! use creative_engine::testing::{MockFetcher, MockProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! let quota = Arc::new(MemoryQuotaStore::new().with_account("user-1", 5));
//! let pipeline = Pipeline::new(MockProvider::new(), quota, MockFetcher::new())?;
//!
//! let request = AdRequest::text("Organic Tea", "Premium organic green tea", "busy professionals")
//!     .with_platform("instagram_feed")
//!     .with_platform("linkedin");
//! let result = pipeline.generate("user-1", &request, &CancellationToken::new()).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Provider, fetcher and store abstractions
//! - [`types`] - Requests, creatives, platform catalog, records
//! - [`enrichment`] - Product-page scraping
//! - [`analyzer`] - Keyword and tone detection
//! - [`pipeline`] - Prompts, generation, normalization, scoring, orchestration
//! - [`quota`] - Per-user credit ledger
//! - [`stores`] - In-memory store implementations
//! - [`library`] - Persisting generated creatives
//! - [`testing`] - Mock implementations for testing

pub mod analyzer;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod quota;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    GenerationError, NormalizationError, PipelineError, ProviderError, QuotaError, ScrapeError,
    StoreError,
};
pub use traits::{
    fetcher::SourceFetcher,
    provider::{
        CompletionRequest, GenerationProvider, ImageGenerationRequest, JsonCompletion,
        ProviderImage,
    },
    store::{CreativeStore, QuotaStore},
};
pub use types::{
    creative::{Creative, Visual},
    platform::{Dimensions, ImageFormat, PixelSize, PlatformCatalog, PlatformFamily, PlatformSpec},
    product::{
        AdRequest, Customization, GenerationOptions, InputType, ProductInput, ScrapedProduct, Tone,
    },
    record::{
        CreativeFilter, CreativePage, CreativeRecord, CreativeStats, CreativeStatus,
        CreativeUpdate, GroupCount, NewCreativeRecord,
    },
    result::{FailureKind, GenerationMetadata, GenerationResult, UnitFailure},
};

pub use analyzer::{analyze_product_text, detect_tone, TextAnalysis};
pub use config::{PipelineConfig, ProviderCredentials};
pub use enrichment::HttpFetcher;
pub use library::record_generation;
pub use pipeline::{
    predict_performance_score, GenerationClient, ImageBrief, ImageStyle, LayoutType, Pipeline,
    PipelineStage, UrlPreview,
};
pub use quota::{QuotaLedger, Reservation};
pub use stores::{MemoryCreativeStore, MemoryQuotaStore};

#[cfg(feature = "openai")]
pub use ai::OpenAIProvider;
