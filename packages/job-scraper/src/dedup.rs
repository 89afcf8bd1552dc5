//! Drop listings that were already imported.
//!
//! One existence query per batch. The store's unique constraint is what
//! guarantees no double import; this filter keeps writes and logs small.

use std::collections::HashSet;

use crate::error::StoreResult;
use crate::listing::ClassifiedListing;
use crate::store::JobStore;

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Listings whose link is not in the store, in input order
    pub fresh: Vec<ClassifiedListing>,
    /// Already imported, or repeated within this batch
    pub duplicates: usize,
    /// No link to key on
    pub unkeyed: usize,
}

pub async fn deduplicate(
    store: &dyn JobStore,
    listings: Vec<ClassifiedListing>,
) -> StoreResult<DedupOutcome> {
    let mut outcome = DedupOutcome::default();
    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(listings.len());

    for listing in listings {
        if !listing.listing.has_link() {
            outcome.unkeyed += 1;
            continue;
        }
        if !seen.insert(listing.source_url().to_string()) {
            outcome.duplicates += 1;
            continue;
        }
        candidates.push(listing);
    }

    if candidates.is_empty() {
        return Ok(outcome);
    }

    let links: Vec<String> = candidates
        .iter()
        .map(|l| l.source_url().to_string())
        .collect();
    let existing = store.find_existing_source_urls(&links).await?;

    for listing in candidates {
        if existing.contains(listing.source_url()) {
            outcome.duplicates += 1;
        } else {
            outcome.fresh.push(listing);
        }
    }

    tracing::debug!(
        fresh = outcome.fresh.len(),
        duplicates = outcome.duplicates,
        unkeyed = outcome.unkeyed,
        "Deduplicated batch"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::listing::RawListing;
    use crate::store::MemoryJobStore;
    use chrono::Utc;

    fn classified(url: &str, salary: &str) -> ClassifiedListing {
        Classifier::builtin().classify_listing(
            RawListing::new("Injector", url).with_salary(salary),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_drops_links_already_in_store() {
        let store = MemoryJobStore::new();
        store
            .insert_new(&[classified("https://a/1", "$100k")])
            .await
            .unwrap();

        let outcome = deduplicate(
            &store,
            vec![
                classified("https://a/1", "$120k"),
                classified("https://a/2", ""),
                classified("https://a/3", ""),
            ],
        )
        .await
        .unwrap();

        let links: Vec<_> = outcome.fresh.iter().map(|l| l.source_url()).collect();
        assert_eq!(links, vec!["https://a/2", "https://a/3"]);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(store.query_call_count(), 1);
    }

    #[tokio::test]
    async fn test_collapses_repeats_within_batch() {
        let store = MemoryJobStore::new();
        let outcome = deduplicate(
            &store,
            vec![classified("https://a/1", "first"), classified("https://a/1", "second")],
        )
        .await
        .unwrap();

        assert_eq!(outcome.fresh.len(), 1);
        assert_eq!(outcome.fresh[0].listing.salary, "first");
        assert_eq!(outcome.duplicates, 1);
    }

    #[tokio::test]
    async fn test_unkeyed_listings_skipped_without_query() {
        let store = MemoryJobStore::new();
        let outcome = deduplicate(&store, vec![classified("", "")]).await.unwrap();

        assert!(outcome.fresh.is_empty());
        assert_eq!(outcome.unkeyed, 1);
        assert_eq!(store.query_call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let store = MemoryJobStore::new();
        store.set_query_failure(true);

        let result = deduplicate(&store, vec![classified("https://a/1", "")]).await;
        assert!(result.is_err());
    }
}
