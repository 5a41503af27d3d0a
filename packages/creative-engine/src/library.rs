//! Persisting generated creatives into the record store.

use tracing::info;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::traits::store::CreativeStore;
use crate::types::record::{CreativeStatus, NewCreativeRecord};
use crate::types::result::GenerationResult;

/// Record title: `"{product} - {platform} - {variation label}"`.
pub fn record_title(product_name: &str, platform: &str, label: &str) -> String {
    format!("{} - {} - {}", product_name, platform, label)
}

/// Store every creative of a result for `user_id`, platform order.
///
/// Returns the new record ids in the same order.
pub async fn record_generation<S: CreativeStore + ?Sized>(
    store: &S,
    user_id: &str,
    result: &GenerationResult,
) -> StoreResult<Vec<Uuid>> {
    let product = &result.product;
    let mut ids = Vec::with_capacity(result.len());

    for creative in result.iter() {
        let record = NewCreativeRecord {
            title: record_title(&product.product_name, &creative.platform, creative.label()),
            product_name: product.product_name.clone(),
            product_description: product.description.clone(),
            target_audience: product.target_audience.clone(),
            tone: product.tone,
            creative: creative.clone(),
            status: CreativeStatus::Generated,
        };
        ids.push(store.save(user_id, record).await?);
    }

    info!(user_id = %user_id, count = ids.len(), "Creatives recorded");
    Ok(ids)
}
