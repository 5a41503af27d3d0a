//! Canonical creative schema (post-normalization).

use serde::{Deserialize, Serialize};

/// Visual direction for a creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visual {
    pub style: String,
    pub layout_type: String,
    pub image_prompt: String,
    pub color_scheme: Vec<String>,
    /// Rendered image, when image generation ran for this creative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One ad creative for one platform.
///
/// `headline`, `body_copy` and `call_to_action` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    pub platform: String,
    /// Provider's label for the variation ("Story Sequence 1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    pub body_copy: String,
    pub call_to_action: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub visual: Visual,
    pub target_emotions: Vec<String>,
    /// Heuristic score in 0..=100
    pub performance_score: u32,
    /// Tokens billed for the provider call that produced this creative
    pub tokens_used: u32,
    pub variation_id: String,
}

impl Creative {
    /// Label used in record titles: name, then variation id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.variation_id)
    }
}
