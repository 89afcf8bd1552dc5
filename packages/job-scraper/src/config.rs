use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scrapingbee_client::SecretString;

use crate::catalog::SiteCatalog;
use crate::classifier::{Classifier, ClassifierRules};
use crate::error::ConfigError;
use crate::pipeline::PipelineConfig;

/// How source pages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchBackend {
    /// Rendered through ScrapingBee (JS enabled)
    #[default]
    ScrapingBee,
    /// Plain HTTP GET with local selector extraction
    Html,
}

impl FromStr for FetchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scrapingbee" => Ok(Self::ScrapingBee),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown fetch backend {:?} (expected scrapingbee or html)", other)),
        }
    }
}

/// Scraper configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Carries credentials, so held as a secret
    pub database_url: SecretString,
    pub fetch_backend: FetchBackend,
    /// Required for the ScrapingBee backend, empty otherwise
    pub scrapingbee_api_key: SecretString,
    pub catalog_path: Option<PathBuf>,
    pub scrape_delay: Duration,
    pub fetch_timeout: Duration,
    pub fetch_retries: u32,
    pub port: u16,
    pub scrape_schedule: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let fetch_backend: FetchBackend = parse_or(&lookup, "FETCH_BACKEND", FetchBackend::default())?;
        let scrapingbee_api_key: SecretString = match fetch_backend {
            FetchBackend::ScrapingBee => required("SCRAPINGBEE_API_KEY")?.into(),
            FetchBackend::Html => lookup("SCRAPINGBEE_API_KEY").unwrap_or_default().into(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?.into(),
            fetch_backend,
            scrapingbee_api_key,
            catalog_path: lookup("SCRAPER_CATALOG_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            scrape_delay: Duration::from_millis(parse_or(&lookup, "SCRAPE_DELAY_MS", 2000)?),
            fetch_timeout: Duration::from_secs(parse_or(&lookup, "FETCH_TIMEOUT_SECS", 140)?),
            fetch_retries: parse_or(&lookup, "FETCH_RETRIES", 0)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            scrape_schedule: lookup("SCRAPE_SCHEDULE").filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            pacing_delay: self.scrape_delay,
            fetch_retries: self.fetch_retries,
        }
    }

    /// Catalog and classifier from `SCRAPER_CATALOG_PATH`, or the built-ins.
    pub fn load_catalog(&self) -> Result<(SiteCatalog, Classifier), ConfigError> {
        let (catalog, rules) = match &self.catalog_path {
            Some(path) => SiteCatalog::load(path)?,
            None => (SiteCatalog::builtin(), None),
        };
        let classifier = Classifier::new(rules.unwrap_or_else(ClassifierRules::default))?;
        Ok((catalog, classifier))
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
