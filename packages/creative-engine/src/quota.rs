//! Per-user credit ledger.
//!
//! A run checks the balance up front and commits exactly one debit after it
//! has produced at least one creative. Failed or cancelled runs drop their
//! [`Reservation`] without committing.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{QuotaError, QuotaResult};
use crate::traits::store::QuotaStore;

/// Proof that a user had credit when the run started.
///
/// Consumed by [`QuotaLedger::commit`], so one run can debit at most once.
#[derive(Debug)]
#[must_use = "a reservation does nothing unless committed"]
pub struct Reservation {
    user_id: String,
    credits_at_check: u32,
}

impl Reservation {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn credits_at_check(&self) -> u32 {
        self.credits_at_check
    }
}

pub struct QuotaLedger<Q: QuotaStore> {
    store: Arc<Q>,
}

impl<Q: QuotaStore> Clone for QuotaLedger<Q> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<Q: QuotaStore> QuotaLedger<Q> {
    pub fn new(store: Arc<Q>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Q> {
        &self.store
    }

    /// Current balance.
    pub async fn balance(&self, user_id: &str) -> QuotaResult<u32> {
        self.store
            .get_credits(user_id)
            .await?
            .ok_or_else(|| QuotaError::AccountNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Refuse the run when the balance is zero; otherwise reserve nothing and
    /// hand back a token for the eventual commit.
    pub async fn check_and_reserve(&self, user_id: &str) -> QuotaResult<Reservation> {
        let credits = self.balance(user_id).await?;
        if credits == 0 {
            info!(user_id = %user_id, "Generation refused, no credits left");
            return Err(QuotaError::InsufficientCredits {
                user_id: user_id.to_string(),
            });
        }

        debug!(user_id = %user_id, credits, "Quota reserved");
        Ok(Reservation {
            user_id: user_id.to_string(),
            credits_at_check: credits,
        })
    }

    /// Debit exactly one credit and return the remaining balance.
    pub async fn commit(&self, reservation: Reservation) -> QuotaResult<u32> {
        let remaining = self
            .store
            .debit_one(&reservation.user_id)
            .await?
            .ok_or_else(|| QuotaError::AccountNotFound {
                user_id: reservation.user_id.clone(),
            })?;

        info!(user_id = %reservation.user_id, remaining, "Quota committed");
        Ok(remaining)
    }
}
