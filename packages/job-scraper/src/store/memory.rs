//! In-memory job store for tests and local dry runs.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use super::JobStore;
use crate::error::{StoreError, StoreResult};
use crate::listing::{ClassifiedListing, JobRecord};

/// In-memory `jobs` table.
///
/// Not suitable for production as data is lost on restart. Queries and
/// writes can be made to fail on demand to exercise error paths.
#[derive(Default)]
pub struct MemoryJobStore {
    records: RwLock<Vec<JobRecord>>,
    fail_queries: AtomicBool,
    fail_writes: AtomicBool,
    query_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed existing rows, as if imported by an earlier run.
    pub fn with_records(records: Vec<JobRecord>) -> Self {
        let store = Self::new();
        *store.records.write().unwrap() = records;
        store
    }

    pub fn set_query_failure(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_write_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, source_url: &str) -> bool {
        self.records
            .read()
            .unwrap()
            .iter()
            .any(|r| r.source_url == source_url)
    }

    pub fn query_call_count(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn write_call_count(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find_existing_source_urls(&self, source_urls: &[String]) -> StoreResult<HashSet<String>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("query rejected".into()));
        }

        let wanted: HashSet<&str> = source_urls.iter().map(String::as_str).collect();
        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|r| wanted.contains(r.source_url.as_str()))
            .map(|r| r.source_url.clone())
            .collect())
    }

    async fn insert_new(&self, listings: &[ClassifiedListing]) -> StoreResult<Vec<JobRecord>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".into()));
        }

        let mut records = self.records.write().unwrap();
        let mut taken: HashSet<String> = records.iter().map(|r| r.source_url.clone()).collect();
        let mut created = Vec::new();

        for listing in listings {
            if taken.insert(listing.source_url().to_string()) {
                created.push(JobRecord::from_listing(Uuid::new_v4(), listing));
            }
        }

        records.extend(created.iter().cloned());
        Ok(created)
    }
}
