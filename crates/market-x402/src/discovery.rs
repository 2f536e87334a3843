//! Discovery metadata published alongside payment requirements.
//!
//! Catalog services crawl 402 responses and index whatever they find under
//! `extensions.bazaar`. None of it influences whether a request is paid.

use serde::{Deserialize, Serialize};

/// Free-form extension objects keyed by extension name.
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// Key under which discovery metadata is published.
pub const BAZAAR_EXTENSION: &str = "bazaar";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryMetadata {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Example query, e.g. `{"city": "London"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    /// JSON-schema fragment describing the query parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

impl DiscoveryMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn input(mut self, example: serde_json::Value, schema: serde_json::Value) -> Self {
        self.input = Some(example);
        self.input_schema = Some(schema);
        self
    }

    /// Render as the `extensions` object of a 402 body.
    pub fn to_extensions(&self) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(
            BAZAAR_EXTENSION.to_string(),
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        );
        extensions
    }
}
