use alloy::primitives::Address;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::discovery::Extensions;
use crate::error::X402Error;

/// A single entry in the `accepts` array of a 402 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Human-readable price, e.g. `"$0.001"`.
    pub price: String,
    /// Same price in atomic token units.
    pub amount: String,
    pub asset: Address,
    pub pay_to: Address,
    pub max_timeout_seconds: u64,
    /// Token EIP-712 domain (`name`, `version`) the client signs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl PaymentRequirements {
    /// EIP-712 domain name advertised in `extra`, if any.
    pub fn domain_name(&self) -> Option<&str> {
        self.extra.as_ref()?.get("name")?.as_str()
    }

    /// EIP-712 domain version advertised in `extra`, if any.
    pub fn domain_version(&self) -> Option<&str> {
        self.extra.as_ref()?.get("version")?.as_str()
    }
}

/// The 402 response body returned by the resource server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub x402_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub accepts: Vec<PaymentRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// Wire-format payment payload (sent in the payment header, base64-encoded JSON).
///
/// The scheme-specific part is kept opaque: the resource server only checks
/// `scheme`/`network` and forwards everything to the facilitator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    pub payload: serde_json::Value,
}

/// EIP-3009 authorization fields as they travel inside an `exact` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmAuthorization {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub valid_after: String,
    pub valid_before: String,
    pub nonce: String,
}

/// Scheme-specific body of an `exact` EVM payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactEvmPayload {
    pub signature: String,
    pub authorization: ExactEvmAuthorization,
}

/// Base64-encode a payment payload for the payment header.
pub fn encode_payment(payload: &PaymentPayload) -> Result<String, X402Error> {
    let json = serde_json::to_vec(payload)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}

/// Decode a payment payload from the payment header.
pub fn decode_payment(encoded: &str) -> Result<PaymentPayload, X402Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| X402Error::InvalidPayment(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| X402Error::InvalidPayment(format!("invalid JSON payload: {e}")))
}
