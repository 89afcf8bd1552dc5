use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;

use super::JobStore;
use crate::error::StoreResult;
use crate::listing::{ClassifiedListing, JobRecord};

/// `jobs` table in Postgres.
#[derive(Clone)]
pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch a job by its source link.
    pub async fn find_by_source_url(&self, source_url: &str) -> StoreResult<Option<JobRecord>> {
        let record = sqlx::query_as::<_, JobRecord>("SELECT * FROM jobs WHERE source_url = $1")
            .bind(source_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl JobStore for PostgresJobStore {
    async fn find_existing_source_urls(&self, source_urls: &[String]) -> StoreResult<HashSet<String>> {
        if source_urls.is_empty() {
            return Ok(HashSet::new());
        }

        let existing = sqlx::query_scalar::<_, String>(
            "SELECT source_url FROM jobs WHERE source_url = ANY($1)",
        )
        .bind(source_urls)
        .fetch_all(&self.pool)
        .await?;

        Ok(existing.into_iter().collect())
    }

    async fn insert_new(&self, listings: &[ClassifiedListing]) -> StoreResult<Vec<JobRecord>> {
        if listings.is_empty() {
            return Ok(Vec::new());
        }

        // Dropping the transaction without commit rolls everything back.
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(listings.len());

        for listing in listings {
            let raw = &listing.listing;
            let record = sqlx::query_as::<_, JobRecord>(
                r#"
                INSERT INTO jobs (
                    title, company, location, salary, description, source_url,
                    company_logo, tags, job_type, treatments, imported, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (source_url) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(&raw.title)
            .bind(&raw.company)
            .bind(&raw.location)
            .bind(&raw.salary)
            .bind(&raw.description)
            .bind(&raw.source_url)
            .bind(&raw.company_logo)
            .bind(&raw.tags)
            .bind(listing.employment_type.as_str())
            .bind(&listing.treatments)
            .bind(listing.imported)
            .bind(listing.created_at)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(record) = record {
                created.push(record);
            }
        }

        tx.commit().await?;
        Ok(created)
    }
}
