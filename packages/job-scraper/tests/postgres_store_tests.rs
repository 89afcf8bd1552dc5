//! PostgresJobStore against a real database.
//!
//! Needs Docker. Run with: cargo test -p job-scraper --test postgres_store_tests -- --ignored

use chrono::Utc;
use sqlx::PgPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use job_scraper::testing::raw_listing;
use job_scraper::{Classifier, ClassifiedListing, JobStore, PostgresJobStore};

async fn setup() -> (ContainerAsync<Postgres>, PostgresJobStore) {
    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("Failed to start Postgres container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    (container, PostgresJobStore::new(pool))
}

fn classified(url: &str, description: &str) -> ClassifiedListing {
    Classifier::builtin().classify_listing(raw_listing(url, description), Utc::now())
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_find_existing() {
    let (_container, store) = setup().await;

    let created = store
        .insert_new(&[
            classified("https://a.example/1", "PRN botox"),
            classified("https://a.example/2", ""),
        ])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    let existing = store
        .find_existing_source_urls(&["https://a.example/1".into(), "https://a.example/9".into()])
        .await
        .unwrap();
    assert_eq!(existing.len(), 1);
    assert!(existing.contains("https://a.example/1"));

    let record = store
        .find_by_source_url("https://a.example/1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.job_type, "prn");
    assert_eq!(record.treatments, vec!["Botox"]);
    assert!(record.imported);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_conflicting_link_is_skipped_not_updated() {
    let (_container, store) = setup().await;

    store
        .insert_new(&[classified("https://a.example/1", "first")])
        .await
        .unwrap();

    let mut changed = classified("https://a.example/1", "second");
    changed.listing.salary = "$200k".into();
    let created = store
        .insert_new(&[changed, classified("https://a.example/2", "")])
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].source_url, "https://a.example/2");
    assert_eq!(store.count().await.unwrap(), 2);

    let original = store
        .find_by_source_url("https://a.example/1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original.description, "first");
}
