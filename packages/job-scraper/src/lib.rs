// Job board import pipeline
//
// Pulls aesthetic-medicine job listings from external boards, classifies
// them, drops ones already imported, and writes the rest to the jobs table.
//
// Catalog → Extractor → Classifier → Deduplicator → Importer, one source at a
// time, orchestrated by `pipeline::Pipeline`.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod importer;
pub mod listing;
pub mod pipeline;
pub mod scheduled_tasks;
pub mod server;
pub mod startup;
pub mod store;
pub mod testing;

pub use catalog::{SelectorSet, SiteCatalog, SourceDefinition};
pub use classifier::{Classification, Classifier, ClassifierRules, EmploymentRule};
pub use config::{Config, FetchBackend};
pub use error::{ConfigError, FetchError, ScrapeError, StoreError};
pub use extractor::{HtmlFetcher, ListingFetcher, ScrapingBeeFetcher};
pub use listing::{ClassifiedListing, EmploymentType, JobRecord, RawListing};
pub use pipeline::{Pipeline, PipelineConfig, RunReport, SourceReport, SourceResult, SourceStatus, Stage};
pub use store::{JobStore, MemoryJobStore, PostgresJobStore};
