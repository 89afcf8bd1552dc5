//! Persist deduplicated listings. The only stage with a durable effect.

use crate::error::StoreResult;
use crate::listing::{ClassifiedListing, JobRecord};
use crate::store::JobStore;

#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub created: Vec<JobRecord>,
    /// Rows the store skipped because another run inserted the link first
    pub conflicts: usize,
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        self.created.len()
    }
}

/// Write the batch in one store call. All-or-nothing on failure.
pub async fn import(store: &dyn JobStore, listings: &[ClassifiedListing]) -> StoreResult<ImportOutcome> {
    if listings.is_empty() {
        tracing::info!("No new jobs to import");
        return Ok(ImportOutcome::default());
    }

    let created = store.insert_new(listings).await?;
    let conflicts = listings.len().saturating_sub(created.len());

    if conflicts > 0 {
        tracing::warn!(
            conflicts,
            "Skipped listings imported concurrently by another run"
        );
    }
    tracing::info!(count = created.len(), "Successfully imported new jobs");

    Ok(ImportOutcome { created, conflicts })
}
