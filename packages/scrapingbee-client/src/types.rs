use std::collections::BTreeMap;

use serde::Serialize;

/// A single extraction rule in ScrapingBee's `extract_rules` language.
///
/// The short form is a bare CSS selector whose text content is returned.
/// The detailed form can pull an attribute (`@href`), return every match as
/// a list, or nest a map of further rules applied inside each match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractRule {
    Text(String),
    Detailed(DetailedRule),
}

impl ExtractRule {
    /// Text content of the first element matching `selector`.
    pub fn text(selector: impl Into<String>) -> Self {
        ExtractRule::Text(selector.into())
    }

    /// Value of `attribute` on the first element matching `selector`.
    pub fn attribute(selector: impl Into<String>, attribute: &str) -> Self {
        ExtractRule::Detailed(DetailedRule {
            selector: selector.into(),
            kind: None,
            output: Some(RuleOutput::Attribute(format!("@{}", attribute))),
        })
    }

    /// Text content of every element matching `selector`.
    pub fn text_list(selector: impl Into<String>) -> Self {
        ExtractRule::Detailed(DetailedRule {
            selector: selector.into(),
            kind: Some(RuleKind::List),
            output: None,
        })
    }

    /// One object per element matching `selector`, built from `fields`.
    pub fn object_list(selector: impl Into<String>, fields: BTreeMap<String, ExtractRule>) -> Self {
        ExtractRule::Detailed(DetailedRule {
            selector: selector.into(),
            kind: Some(RuleKind::List),
            output: Some(RuleOutput::Fields(fields)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedRule {
    pub selector: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RuleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<RuleOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Item,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleOutput {
    /// `@attr` form, e.g. `@href`
    Attribute(String),
    Fields(BTreeMap<String, ExtractRule>),
}

/// Parameters for one rendered-page extraction call.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub url: String,
    pub render_js: bool,
    pub block_resources: bool,
    pub rules: BTreeMap<String, ExtractRule>,
}

impl ExtractRequest {
    /// JS rendering on, resources not blocked.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            render_js: true,
            block_resources: false,
            rules: BTreeMap::new(),
        }
    }

    pub fn with_render_js(mut self, render_js: bool) -> Self {
        self.render_js = render_js;
        self
    }

    pub fn with_block_resources(mut self, block_resources: bool) -> Self {
        self.block_resources = block_resources;
        self
    }

    /// Add a top-level rule; its output appears under `key` in the response.
    pub fn with_rule(mut self, key: impl Into<String>, rule: ExtractRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    /// Query string pairs, with `extract_rules` JSON-encoded.
    pub(crate) fn query_pairs(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        let mut pairs = vec![
            ("url", self.url.clone()),
            ("render_js", self.render_js.to_string()),
            ("block_resources", self.block_resources.to_string()),
        ];
        if !self.rules.is_empty() {
            pairs.push(("extract_rules", serde_json::to_string(&self.rules)?));
        }
        Ok(pairs)
    }
}
