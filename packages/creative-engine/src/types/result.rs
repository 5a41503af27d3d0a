//! Aggregate output of one pipeline run.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzer::TextAnalysis;
use crate::types::creative::Creative;
use crate::types::product::ProductInput;

/// Which part of a unit of work failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The platform's provider call (or its spec lookup) failed
    Generation,
    /// One variation could not be normalized
    Normalization,
    /// Image rendering for one creative failed; the creative was kept
    Image,
}

/// A recorded, non-fatal failure surfaced alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitFailure {
    pub platform: String,
    pub kind: FailureKind,
    pub message: String,
}

impl UnitFailure {
    pub fn new(platform: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Sum over provider calls (not over creatives)
    pub total_tokens_used: u64,
    /// Platforms with at least one creative, in request order
    pub platforms_generated: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub variations_per_platform: usize,
    /// Creatives asked for: platforms × variations
    pub requested: usize,
    /// Creatives actually returned
    pub produced: usize,
}

/// Creatives grouped by platform in request order, plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub creatives: IndexMap<String, Vec<Creative>>,
    #[serde(default)]
    pub failures: Vec<UnitFailure>,
    pub metadata: GenerationMetadata,
    pub product: ProductInput,
    pub analysis: TextAnalysis,
    pub credits_remaining: u32,
}

impl GenerationResult {
    /// Creatives for one platform, empty if the platform failed.
    pub fn creatives_for(&self, platform: &str) -> &[Creative] {
        self.creatives
            .get(platform)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// All creatives, platform by platform.
    pub fn iter(&self) -> impl Iterator<Item = &Creative> {
        self.creatives.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.creatives.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable outcome line ("Generated 6 creatives across 2 platform(s)").
    pub fn summary(&self) -> String {
        format!(
            "Generated {} creatives across {} platform(s)",
            self.len(),
            self.metadata.platforms_generated.len()
        )
    }
}
