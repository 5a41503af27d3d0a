//! Typed errors for the creative pipeline.
//!
//! Each stage owns its error type. `PipelineError` is what callers of
//! [`Pipeline::generate`](crate::Pipeline::generate) see; everything else is
//! either recovered inside the pipeline or folded into it.

use thiserror::Error;

use crate::types::result::UnitFailure;

/// Errors raised while enriching a product from its web page.
///
/// Never fatal to a generation run: the orchestrator logs it and continues
/// with the manually supplied fields.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// URL could not be parsed or has no host
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request exceeded the enrichment timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection or body read failed
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Page could not be interpreted
    #[error("failed to parse page: {0}")]
    Parse(String),
}

/// Errors from a generation provider (text or image).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or rejected credential
    #[error("provider configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("provider network error: {0}")]
    Network(String),

    /// Provider answered with an error
    #[error("provider API error: {0}")]
    Api(String),

    /// Provider answered with something we could not read
    #[error("provider response parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// A provider variation that cannot be mapped onto a [`Creative`](crate::Creative).
///
/// Only raised for payloads that are not JSON objects; sparse objects are
/// always normalized with defaults.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("variation is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },
}

/// Failure of one unit of work (one platform, or one image).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No PlatformSpec entry for the requested identifier
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// Provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Provider returned content that is not JSON
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Provider returned JSON with no usable variation
    #[error("provider returned no variations")]
    EmptyResponse,

    /// Variation could not be normalized
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl GenerationError {
    /// Fatal errors abort the whole invocation instead of one unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_config())
    }
}

/// Errors from the record and account stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {id}")]
    NotFound { id: String },

    #[error("not authorized")]
    NotAuthorized,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors from the quota ledger.
#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Insufficient credits. Please upgrade your plan.")]
    InsufficientCredits { user_id: String },

    #[error("account not found: {user_id}")]
    AccountNotFound { user_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Caller-facing errors of a generation run.
///
/// Every variant is returned before the quota is committed, so an `Err`
/// never costs the user a credit.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing provider credential or similar; nothing was attempted
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient credits. Please upgrade your plan.")]
    InsufficientCredits { user_id: String },

    #[error("account not found: {user_id}")]
    AccountNotFound { user_id: String },

    /// Request cannot be turned into product data
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Every platform unit failed
    #[error("all {} generation unit(s) failed", failures.len())]
    AllUnitsFailed { failures: Vec<UnitFailure> },

    /// Caller went away before the run finished
    #[error("generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QuotaError> for PipelineError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::InsufficientCredits { user_id } => Self::InsufficientCredits { user_id },
            QuotaError::AccountNotFound { user_id } => Self::AccountNotFound { user_id },
            QuotaError::Store(e) => Self::Store(e),
        }
    }
}

/// Result type alias for enrichment.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Result type alias for a unit of generation work.
pub type GenerationResultOf<T> = std::result::Result<T, GenerationError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for quota operations.
pub type QuotaResult<T> = std::result::Result<T, QuotaError>;

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;
