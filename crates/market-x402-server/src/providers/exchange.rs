//! Currency conversion via ExchangeRate-API's `pair` endpoint.
//!
//! No fallback: provider failures surface as errors.

use serde::{Deserialize, Serialize};

use super::UpstreamClient;
use crate::error::ResourceError;

const PROVIDER: &str = "exchangerate";
const UNSUPPORTED_CODE: &str = "unsupported-code";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub from: Leg,
    pub to: Leg,
    pub rate: f64,
    pub last_updated: Option<String>,
    pub next_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize)]
struct PairResponse {
    #[serde(default)]
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rate: Option<f64>,
    conversion_result: Option<f64>,
    time_last_update_utc: Option<String>,
    time_next_update_utc: Option<String>,
}

/// Normalise a currency code: trimmed, upper-cased, three ASCII letters.
pub fn currency_code(raw: &str) -> Result<String, ResourceError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(ResourceError::BadRequest("Unsupported currency code".to_string()))
    }
}

/// Parse a strictly positive, finite amount.
pub fn parse_amount(raw: &str) -> Result<f64, ResourceError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(ResourceError::BadRequest(
            "Invalid amount. Must be a positive number.".to_string(),
        )),
    }
}

/// Convert `amount` of `from` into `to`. Codes must already be normalised.
pub async fn convert(
    client: &UpstreamClient,
    base_url: &str,
    api_key: &str,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<Conversion, ResourceError> {
    let amount_str = amount.to_string();
    let url = super::endpoint(base_url, &["v6", api_key, "pair", from, to, &amount_str])
        .map_err(|e| ResourceError::Internal(format!("exchange URL: {e}")))?;

    let resp = client
        .get(PROVIDER, url)
        .await
        .map_err(|e| ResourceError::Internal(format!("exchange rate request failed: {e}")))?;

    let status = resp.status();
    let body: PairResponse = if status.is_success() {
        resp.json()
            .await
            .map_err(|e| ResourceError::Internal(format!("exchange rate body: {}", e.without_url())))?
    } else {
        // Error bodies are best-effort; only `error-type` matters.
        resp.json().await.unwrap_or_default()
    };

    interpret(status.as_u16(), body, from, to, amount)
}

fn interpret(
    status: u16,
    body: PairResponse,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<Conversion, ResourceError> {
    if !(200..300).contains(&status) {
        if body.error_type.as_deref() == Some(UNSUPPORTED_CODE) {
            return Err(ResourceError::BadRequest(
                "Unsupported currency code".to_string(),
            ));
        }
        tracing::warn!(status, error_type = ?body.error_type, "exchange rate provider error");
        return Err(ResourceError::Upstream {
            status,
            message: "Failed to fetch exchange rate".to_string(),
        });
    }

    if body.result != "success" {
        tracing::warn!(result = %body.result, error_type = ?body.error_type, "exchange rate lookup failed");
        return Err(ResourceError::BadRequest(
            "Exchange rate lookup failed".to_string(),
        ));
    }

    let (Some(rate), Some(converted)) = (body.conversion_rate, body.conversion_result) else {
        return Err(ResourceError::Internal(
            "exchange rate response missing conversion fields".to_string(),
        ));
    };

    Ok(Conversion {
        from: Leg {
            currency: from.to_string(),
            amount,
        },
        to: Leg {
            currency: to.to_string(),
            amount: converted,
        },
        rate,
        last_updated: body.time_last_update_utc,
        next_update: body.time_next_update_utc,
    })
}
