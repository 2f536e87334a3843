//! HTTP client for a remote facilitator's `/verify`, `/settle` and `/supported`
//! endpoints.
//!
//! Facilitators report rejected payments with a 4xx status *and* a JSON body,
//! so bodies are parsed regardless of status. Only an unreadable body or a
//! transport failure is an error.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::constants::X402_VERSION;
use crate::error::X402Error;
use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, SupportedResponse, VerifyResponse};

/// Round-trip budget for a single facilitator call.
pub const FACILITATOR_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct FacilitatorClient {
    base_url: String,
    http: reqwest::Client,
}

impl FacilitatorClient {
    pub fn new(base_url: &str) -> Result<Self, X402Error> {
        let http = reqwest::Client::builder()
            .timeout(FACILITATOR_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| X402Error::HttpError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(base_url, http))
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the facilitator whether `payload` satisfies `requirements`.
    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.post("verify", payload, requirements).await
    }

    /// Ask the facilitator to broadcast the transfer and wait for inclusion.
    pub async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.post("settle", payload, requirements).await
    }

    pub async fn supported(&self) -> Result<SupportedResponse, X402Error> {
        let url = format!("{}/supported", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| X402Error::HttpError(format!("facilitator request failed: {e}")))?;
        read_json(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<T, X402Error> {
        let url = format!("{}/{endpoint}", self.base_url);
        let body = request_body(payload, requirements);

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| X402Error::HttpError(format!("facilitator request failed: {e}")))?;

        read_json(resp).await
    }
}

/// JSON body shared by `/verify` and `/settle`.
pub fn request_body(
    payload: &PaymentPayload,
    requirements: &PaymentRequirements,
) -> serde_json::Value {
    serde_json::json!({
        "x402Version": X402_VERSION,
        "paymentPayload": payload,
        "paymentRequirements": requirements,
    })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, X402Error> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| X402Error::HttpError(format!("failed to read facilitator response: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        tracing::debug!(status = %status, body = %text, "unparseable facilitator response");
        X402Error::Facilitator {
            status: status.as_u16(),
            message: format!("unexpected response: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = FacilitatorClient::new("https://x402.org/facilitator/").unwrap();
        assert_eq!(client.base_url(), "https://x402.org/facilitator");
    }

    #[test]
    fn test_request_body_shape() {
        let payload = PaymentPayload {
            x402_version: 2,
            scheme: "exact".to_string(),
            network: "eip155:84532".to_string(),
            payload: serde_json::json!({}),
        };
        let requirements = PaymentRequirements {
            scheme: "exact".to_string(),
            network: "eip155:84532".to_string(),
            price: "$0.001".to_string(),
            amount: "1000".to_string(),
            asset: Address::ZERO,
            pay_to: Address::ZERO,
            max_timeout_seconds: 60,
            extra: None,
        };
        let body = request_body(&payload, &requirements);
        assert_eq!(body["x402Version"], 2);
        assert_eq!(body["paymentPayload"]["scheme"], "exact");
        assert_eq!(body["paymentRequirements"]["amount"], "1000");
    }

    #[tokio::test]
    async fn test_unreachable_facilitator_is_http_error() {
        let client = FacilitatorClient::new("http://127.0.0.1:1").unwrap();
        let err = client.supported().await.unwrap_err();
        assert!(matches!(err, X402Error::HttpError(_)));
    }
}
