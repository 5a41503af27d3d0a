//! Stored creative records and library queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::creative::Creative;
use crate::types::product::Tone;

/// Lifecycle of a stored creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeStatus {
    Draft,
    #[default]
    Generated,
    Edited,
    Published,
}

impl fmt::Display for CreativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Generated => "generated",
            Self::Edited => "edited",
            Self::Published => "published",
        };
        f.write_str(s)
    }
}

/// A creative plus the ownership and product context it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub tone: Tone,
    pub platform: String,
    pub creative: Creative,
    pub status: CreativeStatus,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record fields supplied by the caller; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreativeRecord {
    pub title: String,
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub tone: Tone,
    pub creative: Creative,
    pub status: CreativeStatus,
}

/// Filter and pagination for listing a user's creatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeFilter {
    pub status: Option<CreativeStatus>,
    pub platform: Option<String>,
    pub limit: usize,
    /// 1-based
    pub page: usize,
}

impl Default for CreativeFilter {
    fn default() -> Self {
        Self {
            status: None,
            platform: None,
            limit: 20,
            page: 1,
        }
    }
}

impl CreativeFilter {
    pub fn with_status(mut self, status: CreativeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }

    /// Whether a record passes the status/platform filter (ignores paging).
    pub fn matches(&self, record: &CreativeRecord) -> bool {
        self.status.map_or(true, |s| record.status == s)
            && self
                .platform
                .as_deref()
                .map_or(true, |p| record.platform == p)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativePage {
    pub records: Vec<CreativeRecord>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Fields a caller may edit. Any edit moves the record to `Edited`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeUpdate {
    pub title: Option<String>,
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub body_copy: Option<String>,
    pub call_to_action: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub color_scheme: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_favorite: Option<bool>,
}

/// Count of records sharing one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// Library statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeStats {
    pub total: usize,
    pub by_platform: Vec<GroupCount>,
    pub by_status: Vec<GroupCount>,
    pub favorites: usize,
    /// 0.0 when the user has no records
    pub average_performance_score: f64,
}
