//! Storage traits for accounts and generated creatives.
//!
//! Both stores are external collaborators: the pipeline only reads and
//! writes through these interfaces. Atomicity of a credit write relative to
//! concurrent requests from the same user is the implementation's concern.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::record::{
    CreativeFilter, CreativePage, CreativeRecord, CreativeStats, CreativeUpdate, NewCreativeRecord,
};

/// Per-user credit balances.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Current balance, `None` for an unknown user.
    async fn get_credits(&self, user_id: &str) -> StoreResult<Option<u32>>;

    /// Overwrite the balance.
    async fn set_credits(&self, user_id: &str, credits: u32) -> StoreResult<()>;

    /// Take one credit, never going below zero. Returns the new balance, or
    /// `None` for an unknown user.
    ///
    /// The provided implementation is a read followed by a write; stores that
    /// can decrement atomically should override it.
    async fn debit_one(&self, user_id: &str) -> StoreResult<Option<u32>> {
        let Some(credits) = self.get_credits(user_id).await? else {
            return Ok(None);
        };
        let remaining = credits.saturating_sub(1);
        self.set_credits(user_id, remaining).await?;
        Ok(Some(remaining))
    }
}

/// Persistent record store for creatives.
///
/// Every read and write is scoped to the owning user; touching another
/// user's record is `StoreError::NotAuthorized`.
#[async_trait]
pub trait CreativeStore: Send + Sync {
    /// Store a record and return its identifier.
    async fn save(&self, user_id: &str, record: NewCreativeRecord) -> StoreResult<Uuid>;

    async fn get(&self, user_id: &str, id: Uuid) -> StoreResult<CreativeRecord>;

    /// Newest first, filtered and paginated.
    async fn list(&self, user_id: &str, filter: &CreativeFilter) -> StoreResult<CreativePage>;

    /// Records matching the filter's status/platform (paging ignored).
    async fn count(&self, user_id: &str, filter: &CreativeFilter) -> StoreResult<usize>;

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: CreativeUpdate,
    ) -> StoreResult<CreativeRecord>;

    async fn delete(&self, user_id: &str, id: Uuid) -> StoreResult<()>;

    /// Grouping by platform and status plus average performance score.
    async fn stats(&self, user_id: &str) -> StoreResult<CreativeStats>;
}
