//! Site catalog: the job boards a run visits, in order.
//!
//! The built-in catalog covers Indeed and ZipRecruiter. A JSON catalog file
//! can replace it (and the classifier ruleset) without a rebuild:
//!
//! ```json
//! {
//!   "sources": [
//!     {
//!       "name": "Indeed",
//!       "url": "https://www.indeed.com/jobs?q=aesthetic+nurse&l=",
//!       "selectors": { "container": ".job_seen_beacon", "title": ".jobTitle", "link": "h2.jobTitle a" }
//!     }
//!   ],
//!   "classifier": { "employment_types": [], "treatments": ["Botox"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::classifier::ClassifierRules;
use crate::error::ConfigError;

/// CSS selectors for one board. Empty strings extract empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    /// Matches one element per listing; all other selectors apply inside it
    #[serde(alias = "jobListing")]
    pub container: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    /// Anchor whose `href` becomes the listing's source URL
    #[serde(default)]
    pub link: String,
    /// Image whose `src` becomes the company logo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    /// Elements whose text becomes the tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Element whose text states the employment type; preferred over the description
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    /// Elements whose text names treatments offered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub name: String,
    pub url: String,
    pub selectors: SelectorSet,
}

impl SourceDefinition {
    pub fn new(name: impl Into<String>, url: impl Into<String>, selectors: SelectorSet) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            selectors,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Catalog("source with empty name".into()));
        }
        url::Url::parse(&self.url).map_err(|e| {
            ConfigError::Catalog(format!("source {}: invalid url {:?}: {}", self.name, self.url, e))
        })?;
        if self.selectors.container.trim().is_empty() {
            return Err(ConfigError::Catalog(format!(
                "source {}: container selector is required",
                self.name
            )));
        }
        Ok(())
    }
}

/// On-disk catalog format.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub sources: Vec<SourceDefinition>,
    #[serde(default)]
    pub classifier: Option<ClassifierRules>,
}

/// Ordered, validated list of sources. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCatalog {
    sources: Vec<SourceDefinition>,
}

impl SiteCatalog {
    pub fn new(sources: Vec<SourceDefinition>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for source in &sources {
            source.validate()?;
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::Catalog(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
        }
        Ok(Self { sources })
    }

    /// Aesthetic-nurse searches on Indeed and ZipRecruiter.
    pub fn builtin() -> Self {
        Self {
            sources: vec![
                SourceDefinition::new(
                    "Indeed",
                    "https://www.indeed.com/jobs?q=aesthetic+nurse&l=",
                    SelectorSet {
                        container: ".job_seen_beacon".into(),
                        title: ".jobTitle".into(),
                        company: ".companyName".into(),
                        location: ".companyLocation".into(),
                        salary: ".salary-snippet".into(),
                        description: ".job-snippet".into(),
                        link: "h2.jobTitle a".into(),
                        company_logo: None,
                        tags: None,
                        job_type: None,
                        treatments: None,
                    },
                ),
                SourceDefinition::new(
                    "ZipRecruiter",
                    "https://www.ziprecruiter.com/Jobs/Aesthetic-Nurse",
                    SelectorSet {
                        container: ".job_content".into(),
                        title: ".job_title".into(),
                        company: ".hiring_company".into(),
                        location: ".location".into(),
                        salary: ".salary".into(),
                        description: ".job_description".into(),
                        link: ".job_link".into(),
                        company_logo: None,
                        tags: None,
                        job_type: None,
                        treatments: None,
                    },
                ),
            ],
        }
    }

    /// Parse a catalog file body. Returns the catalog and any classifier override.
    pub fn from_json(body: &str) -> Result<(Self, Option<ClassifierRules>), ConfigError> {
        let file: CatalogFile =
            serde_json::from_str(body).map_err(|e| ConfigError::Catalog(e.to_string()))?;
        let catalog = Self::new(file.sources)?;
        Ok((catalog, file.classifier))
    }

    pub fn load(path: &Path) -> Result<(Self, Option<ClassifierRules>), ConfigError> {
        let body = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&body)
    }

    pub fn sources(&self) -> &[SourceDefinition] {
        &self.sources
    }

    pub fn get(&self, name: &str) -> Option<&SourceDefinition> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Sources named in `names`, in catalog order. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<SourceDefinition>, String> {
        if let Some(unknown) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(format!("Unknown source: {}", unknown));
        }
        Ok(self
            .sources
            .iter()
            .filter(|s| names.iter().any(|n| n == &s.name))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
