//! Persistent store for imported jobs.
//!
//! `source_url` is unique in every implementation. `insert_new` skips rows
//! whose link already exists instead of failing, so two overlapping runs
//! cannot double-import even if both passed the dedup check.

mod memory;
mod postgres;

pub use memory::MemoryJobStore;
pub use postgres::PostgresJobStore;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::StoreResult;
use crate::listing::{ClassifiedListing, JobRecord};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// The subset of `source_urls` already present in the store.
    async fn find_existing_source_urls(&self, source_urls: &[String]) -> StoreResult<HashSet<String>>;

    /// Insert listings in one all-or-nothing write.
    ///
    /// Rows whose `source_url` already exists are skipped, not updated.
    /// Returns the rows actually created.
    async fn insert_new(&self, listings: &[ClassifiedListing]) -> StoreResult<Vec<JobRecord>>;
}
