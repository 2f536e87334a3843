//! Discovery catalog lookups.
//!
//! Catalogs index x402 resources they have crawled. The listing is either a
//! bare array or an object with an `items` array; entries are loosely typed,
//! so unknown fields are ignored and missing ones default.

use serde::Deserialize;

use crate::OpsError;

pub const DEFAULT_CATALOG_URL: &str =
    "https://api.cdp.coinbase.com/platform/v2/x402/discovery/resources?limit=1000";

/// API names this marketplace publishes.
pub const MARKET_API_NAMES: [&str; 2] = ["Weather API", "Exchange Rate API"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub resource: String,
    pub accepts: Vec<CatalogAccept>,
    pub metadata: Option<CatalogMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogAccept {
    pub network: Option<String>,
    pub amount: Option<String>,
    pub extra: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogMetadata {
    pub name: Option<String>,
}

impl CatalogEntry {
    pub fn network(&self) -> &str {
        self.accepts
            .first()
            .and_then(|a| a.network.as_deref())
            .unwrap_or("unknown")
    }

    /// e.g. `1000 USDC`
    pub fn payment(&self) -> String {
        let Some(accept) = self.accepts.first() else {
            return "unknown".to_string();
        };
        let token = accept
            .extra
            .as_ref()
            .and_then(|e| e.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("tokens");
        format!("{} {token}", accept.amount.as_deref().unwrap_or("?"))
    }
}

/// Accept either `[...]` or `{"items": [...]}`.
pub fn parse_listing(body: serde_json::Value) -> Result<Vec<CatalogEntry>, OpsError> {
    let items = match body {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("items") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(OpsError::UnexpectedResponse(
                    "catalog object has no items array".to_string(),
                ))
            }
        },
        other => {
            return Err(OpsError::UnexpectedResponse(format!(
                "catalog listing is neither array nor object: {other}"
            )))
        }
    };

    // Skip entries that don't deserialize rather than failing the whole listing.
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Entries whose URL contains `app_url`, or whose metadata name mentions one of `names`.
pub fn matching<'a>(
    entries: &'a [CatalogEntry],
    app_url: Option<&str>,
    names: &[&str],
) -> Vec<&'a CatalogEntry> {
    entries
        .iter()
        .filter(|entry| {
            let url_match = app_url.is_some_and(|url| entry.resource.contains(url));
            let name_match = entry
                .metadata
                .as_ref()
                .and_then(|m| m.name.as_deref())
                .is_some_and(|name| names.iter().any(|n| name.contains(n)));
            url_match || name_match
        })
        .collect()
}

pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<Vec<CatalogEntry>, OpsError> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(OpsError::UnexpectedResponse(format!(
            "catalog returned {status}"
        )));
    }
    parse_listing(resp.json().await?)
}
