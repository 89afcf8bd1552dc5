use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One listing as extracted from a board page, before classification.
///
/// Fields the board did not provide are empty strings, never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub salary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Absolute URL of the listing on the board. Natural key across runs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_url: String,
    #[serde(default)]
    pub company_logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_list")]
    pub tags: Vec<String>,
    /// Employment type as printed on the board, if the source declares one
    #[serde(default, deserialize_with = "null_as_empty")]
    pub listed_type: String,
    /// Treatment labels as printed on the board
    #[serde(default, deserialize_with = "null_as_empty_list")]
    pub listed_treatments: Vec<String>,
}

impl RawListing {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = salary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_listed_type(mut self, listed_type: impl Into<String>) -> Self {
        self.listed_type = listed_type.into();
        self
    }

    pub fn with_listed_treatments(mut self, treatments: Vec<String>) -> Self {
        self.listed_treatments = treatments;
        self
    }

    /// Whether the listing carries a usable dedup key.
    pub fn has_link(&self) -> bool {
        !self.source_url.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalized employment type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Prn,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Prn => "prn",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(EmploymentType::FullTime),
            "part-time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            "prn" => Ok(EmploymentType::Prn),
            other => Err(format!("unknown employment type: {}", other)),
        }
    }
}

/// A raw listing plus the attributes inferred from its description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedListing {
    #[serde(flatten)]
    pub listing: RawListing,
    pub employment_type: EmploymentType,
    pub treatments: Vec<String>,
    pub imported: bool,
    pub created_at: DateTime<Utc>,
}

impl ClassifiedListing {
    pub fn source_url(&self) -> &str {
        &self.listing.source_url
    }
}

/// Durable job row. Only the importer creates these in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub source_url: String,
    pub company_logo: Option<String>,
    pub tags: Vec<String>,
    pub job_type: String,
    pub treatments: Vec<String>,
    pub imported: bool,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Build the row a store would write for `listing` under `id`.
    pub fn from_listing(id: Uuid, listing: &ClassifiedListing) -> Self {
        let raw = &listing.listing;
        Self {
            id,
            title: raw.title.clone(),
            company: raw.company.clone(),
            location: raw.location.clone(),
            salary: raw.salary.clone(),
            description: raw.description.clone(),
            source_url: raw.source_url.clone(),
            company_logo: raw.company_logo.clone(),
            tags: raw.tags.clone(),
            job_type: listing.employment_type.as_str().to_string(),
            treatments: listing.treatments.clone(),
            imported: listing.imported,
            created_at: listing.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_listing_null_and_missing_fields_become_empty() {
        let raw: RawListing = serde_json::from_str(
            r#"{"title":"Nurse Injector","company":null,"source_url":"https://example.com/1","tags":null}"#,
        )
        .unwrap();

        assert_eq!(raw.title, "Nurse Injector");
        assert_eq!(raw.company, "");
        assert_eq!(raw.salary, "");
        assert!(raw.tags.is_empty());
        assert!(raw.company_logo.is_none());
    }

    #[test]
    fn test_employment_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::PartTime).unwrap(),
            "\"part-time\""
        );
        assert_eq!("prn".parse::<EmploymentType>().unwrap(), EmploymentType::Prn);
        assert!("seasonal".parse::<EmploymentType>().is_err());
        assert_eq!(EmploymentType::default(), EmploymentType::FullTime);
    }

    #[test]
    fn test_has_link() {
        assert!(RawListing::new("a", "https://example.com/a").has_link());
        assert!(!RawListing::new("a", "  ").has_link());
    }
}
