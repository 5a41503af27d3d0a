//! In-memory stores for testing and development.
//!
//! Not suitable for production as data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{CreativeStore, QuotaStore};
use crate::types::record::{
    CreativeFilter, CreativePage, CreativeRecord, CreativeStats, CreativeStatus, CreativeUpdate,
    GroupCount, NewCreativeRecord,
};

/// Credit balances keyed by user id.
#[derive(Default)]
pub struct MemoryQuotaStore {
    accounts: RwLock<HashMap<String, u32>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account.
    pub fn with_account(mut self, user_id: impl Into<String>, credits: u32) -> Self {
        self.accounts.get_mut().insert(user_id.into(), credits);
        self
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn get_credits(&self, user_id: &str) -> StoreResult<Option<u32>> {
        Ok(self.accounts.read().await.get(user_id).copied())
    }

    async fn set_credits(&self, user_id: &str, credits: u32) -> StoreResult<()> {
        self.accounts
            .write()
            .await
            .insert(user_id.to_string(), credits);
        Ok(())
    }

    async fn debit_one(&self, user_id: &str) -> StoreResult<Option<u32>> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(user_id).map(|credits| {
            *credits = credits.saturating_sub(1);
            *credits
        }))
    }
}

/// Creative records in insertion order.
#[derive(Default)]
pub struct MemoryCreativeStore {
    records: RwLock<Vec<CreativeRecord>>,
}

impl MemoryCreativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records across all users.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn owned<'r>(
    records: &'r mut [CreativeRecord],
    user_id: &str,
    id: Uuid,
) -> StoreResult<&'r mut CreativeRecord> {
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
    if record.user_id != user_id {
        return Err(StoreError::NotAuthorized);
    }
    Ok(record)
}

fn group_counts(keys: impl Iterator<Item = String>) -> Vec<GroupCount> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

#[async_trait]
impl CreativeStore for MemoryCreativeStore {
    async fn save(&self, user_id: &str, record: NewCreativeRecord) -> StoreResult<Uuid> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        self.records.write().await.push(CreativeRecord {
            id,
            user_id: user_id.to_string(),
            title: record.title,
            product_name: record.product_name,
            product_description: record.product_description,
            target_audience: record.target_audience,
            tone: record.tone,
            platform: record.creative.platform.clone(),
            creative: record.creative,
            status: record.status,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        });

        Ok(id)
    }

    async fn get(&self, user_id: &str, id: Uuid) -> StoreResult<CreativeRecord> {
        let records = self.records.read().await;
        let record = records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if record.user_id != user_id {
            return Err(StoreError::NotAuthorized);
        }
        Ok(record.clone())
    }

    async fn list(&self, user_id: &str, filter: &CreativeFilter) -> StoreResult<CreativePage> {
        let records = self.records.read().await;
        let limit = filter.limit.max(1);
        let page = filter.page.max(1);

        // newest first
        let matching: Vec<&CreativeRecord> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .collect();
        let total = matching.len();

        Ok(CreativePage {
            records: matching
                .into_iter()
                .skip((page - 1) * limit)
                .take(limit)
                .cloned()
                .collect(),
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
        })
    }

    async fn count(&self, user_id: &str, filter: &CreativeFilter) -> StoreResult<usize> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id && filter.matches(r))
            .count())
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: CreativeUpdate,
    ) -> StoreResult<CreativeRecord> {
        let mut records = self.records.write().await;
        let record = owned(&mut records, user_id, id)?;

        if let Some(title) = update.title {
            record.title = title;
        }
        let creative = &mut record.creative;
        if let Some(headline) = update.headline {
            creative.headline = headline;
        }
        if let Some(subheadline) = update.subheadline {
            creative.subheadline = Some(subheadline);
        }
        if let Some(body_copy) = update.body_copy {
            creative.body_copy = body_copy;
        }
        if let Some(cta) = update.call_to_action {
            creative.call_to_action = cta;
        }
        if let Some(hashtags) = update.hashtags {
            creative.hashtags = hashtags;
        }
        if let Some(colors) = update.color_scheme {
            creative.visual.color_scheme = colors;
        }
        if let Some(url) = update.image_url {
            creative.visual.image_url = Some(url);
        }
        if let Some(favorite) = update.is_favorite {
            record.is_favorite = favorite;
        }

        record.status = CreativeStatus::Edited;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        let mut records = self.records.write().await;
        owned(&mut records, user_id, id)?;
        records.retain(|r| r.id != id);
        Ok(())
    }

    async fn stats(&self, user_id: &str) -> StoreResult<CreativeStats> {
        let records = self.records.read().await;
        let mine: Vec<&CreativeRecord> = records.iter().filter(|r| r.user_id == user_id).collect();

        let total = mine.len();
        let average_performance_score = if total == 0 {
            0.0
        } else {
            mine.iter()
                .map(|r| f64::from(r.creative.performance_score))
                .sum::<f64>()
                / total as f64
        };

        Ok(CreativeStats {
            total,
            by_platform: group_counts(mine.iter().map(|r| r.platform.clone())),
            by_status: group_counts(mine.iter().map(|r| r.status.to_string())),
            favorites: mine.iter().filter(|r| r.is_favorite).count(),
            average_performance_score,
        })
    }
}
