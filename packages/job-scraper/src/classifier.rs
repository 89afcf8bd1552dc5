//! Keyword classification of job descriptions.
//!
//! Employment type: ordered `(pattern, type)` rules, case-insensitive, first
//! match wins, falling back to a default. Treatments: a flat vocabulary,
//! each name matched as a case-insensitive literal substring. Output order
//! is vocabulary order.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::listing::{ClassifiedListing, EmploymentType, RawListing};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRule {
    pub pattern: String,
    pub employment_type: EmploymentType,
}

impl EmploymentRule {
    pub fn new(pattern: impl Into<String>, employment_type: EmploymentType) -> Self {
        Self {
            pattern: pattern.into(),
            employment_type,
        }
    }
}

/// Data form of the classifier, loadable from the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRules {
    #[serde(default)]
    pub employment_types: Vec<EmploymentRule>,
    #[serde(default)]
    pub default_employment_type: EmploymentType,
    #[serde(default)]
    pub treatments: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            employment_types: vec![
                EmploymentRule::new(r"full[- ]time|full$", EmploymentType::FullTime),
                EmploymentRule::new(r"part[- ]time|part$", EmploymentType::PartTime),
                EmploymentRule::new(r"contract|temporary", EmploymentType::Contract),
                EmploymentRule::new(r"prn|as[- ]needed", EmploymentType::Prn),
            ],
            default_employment_type: EmploymentType::FullTime,
            treatments: [
                "Botox",
                "Neurotoxins",
                "Dermal Fillers",
                "PDO Threads",
                "Chemical Peels",
                "Laser Treatments",
                "Microneedling",
                "PRP",
                "PRF",
                "Body Contouring",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub employment_type: EmploymentType,
    pub treatments: Vec<String>,
}

/// Compiled ruleset. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct Classifier {
    employment_types: Vec<(Regex, EmploymentType)>,
    default_employment_type: EmploymentType,
    /// (display name, lowercased needle)
    treatments: Vec<(String, String)>,
}

impl Classifier {
    pub fn new(rules: ClassifierRules) -> Result<Self, ConfigError> {
        let employment_types = rules
            .employment_types
            .into_iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, rule.employment_type))
                    .map_err(|e| ConfigError::Pattern {
                        pattern: rule.pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let treatments = rules
            .treatments
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| {
                let needle = name.to_lowercase();
                (name, needle)
            })
            .collect();

        Ok(Self {
            employment_types,
            default_employment_type: rules.default_employment_type,
            treatments,
        })
    }

    /// Classifier over the built-in aesthetic-medicine ruleset.
    pub fn builtin() -> Self {
        Self::new(ClassifierRules::default()).expect("built-in classifier patterns are valid")
    }

    pub fn employment_type(&self, description: &str) -> EmploymentType {
        self.matching_type(description)
            .unwrap_or(self.default_employment_type)
    }

    fn matching_type(&self, text: &str) -> Option<EmploymentType> {
        self.employment_types
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, ty)| *ty)
    }

    pub fn treatments(&self, description: &str) -> Vec<String> {
        self.treatments_in(&[description])
    }

    /// Vocabulary entries found in any of `texts`, in vocabulary order.
    fn treatments_in(&self, texts: &[&str]) -> Vec<String> {
        let haystacks: Vec<String> = texts.iter().map(|t| t.to_lowercase()).collect();
        self.treatments
            .iter()
            .filter(|(_, needle)| haystacks.iter().any(|h| h.contains(needle.as_str())))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn classify(&self, description: &str) -> Classification {
        Classification {
            employment_type: self.employment_type(description),
            treatments: self.treatments(description),
        }
    }

    /// Attach inferred attributes and import metadata to a raw listing.
    ///
    /// A board-declared type wins when it matches a rule; otherwise the
    /// description decides. Board-declared treatment labels are searched
    /// alongside the description, so output stays within the vocabulary.
    pub fn classify_listing(&self, listing: RawListing, now: DateTime<Utc>) -> ClassifiedListing {
        let employment_type = self
            .matching_type(&listing.listed_type)
            .unwrap_or_else(|| self.employment_type(&listing.description));

        let mut texts = vec![listing.description.as_str()];
        texts.extend(listing.listed_treatments.iter().map(String::as_str));
        let treatments = self.treatments_in(&texts);

        ClassifiedListing {
            listing,
            employment_type,
            treatments,
            imported: true,
            created_at: now,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::builtin()
    }
}
