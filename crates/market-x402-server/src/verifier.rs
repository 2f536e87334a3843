//! Payment verification: turns the payment header of one request into a
//! [`VerificationOutcome`].
//!
//! The production verifier delegates signature checks and on-chain settlement
//! to a remote facilitator. Any transport or parse failure talking to it is a
//! [`VerifierError`], never an outcome.

use async_trait::async_trait;
use x402::{decode_payment, FacilitatorClient, PaymentRequirements, SettleResponse, X402Error};

/// Proof of a settled payment, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// On-chain transaction hash
    pub transaction: String,
    pub payer: Option<String>,
    pub network: String,
}

/// Result of checking one request's payment evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No payment header was attached.
    Unpaid,
    /// Payment evidence present but invalid (wrong amount, recipient, expired...).
    Rejected(String),
    /// Evidence was valid but settlement could not be confirmed.
    SettlementFailed(String),
    /// Payment verified and settled.
    Verified(Receipt),
}

#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("facilitator unreachable: {0}")]
    Transport(String),

    #[error("malformed facilitator response: {0}")]
    MalformedResponse(String),
}

impl From<X402Error> for VerifierError {
    fn from(e: X402Error) -> Self {
        match e {
            X402Error::HttpError(msg) => VerifierError::Transport(msg),
            other => VerifierError::MalformedResponse(other.to_string()),
        }
    }
}

/// Checks the payment evidence of one request against one resource's requirements.
///
/// Implementations own their own timeout and retry behaviour; callers await
/// the result once.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(
        &self,
        header: Option<&str>,
        requirements: &PaymentRequirements,
    ) -> Result<VerificationOutcome, VerifierError>;
}

pub const REASON_INVALID_HEADER: &str = "invalid_payment_header";
pub const REASON_UNSUPPORTED_SCHEME: &str = "unsupported_scheme";
pub const REASON_NETWORK_MISMATCH: &str = "network_mismatch";
const REASON_UNKNOWN: &str = "unknown";

/// Verifier backed by a remote x402 facilitator (`/verify` then `/settle`).
pub struct FacilitatorVerifier {
    client: FacilitatorClient,
}

impl FacilitatorVerifier {
    pub fn new(client: FacilitatorClient) -> Self {
        Self { client }
    }

    pub fn facilitator_url(&self) -> &str {
        self.client.base_url()
    }
}

#[async_trait]
impl PaymentVerifier for FacilitatorVerifier {
    async fn verify(
        &self,
        header: Option<&str>,
        requirements: &PaymentRequirements,
    ) -> Result<VerificationOutcome, VerifierError> {
        let Some(header) = header else {
            return Ok(VerificationOutcome::Unpaid);
        };

        let payload = match decode_payment(header) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "invalid payment header");
                return Ok(VerificationOutcome::Rejected(REASON_INVALID_HEADER.into()));
            }
        };

        if payload.scheme != requirements.scheme {
            return Ok(VerificationOutcome::Rejected(
                REASON_UNSUPPORTED_SCHEME.into(),
            ));
        }
        if payload.network != requirements.network {
            return Ok(VerificationOutcome::Rejected(REASON_NETWORK_MISMATCH.into()));
        }

        let verified = self.client.verify(&payload, requirements).await?;
        if !verified.is_valid {
            let reason = verified
                .invalid_reason
                .unwrap_or_else(|| REASON_UNKNOWN.to_string());
            tracing::info!(payer = ?verified.payer, reason = %reason, "payment rejected by facilitator");
            return Ok(VerificationOutcome::Rejected(reason));
        }

        let settled = self.client.settle(&payload, requirements).await?;
        if !settled.success {
            let reason = settled
                .error_reason
                .unwrap_or_else(|| REASON_UNKNOWN.to_string());
            return Ok(VerificationOutcome::SettlementFailed(reason));
        }

        settled_receipt(settled, verified.payer, requirements).map(VerificationOutcome::Verified)
    }
}

/// Build the receipt for a successful settlement. A success without a
/// transaction hash carries no proof and is treated as malformed.
fn settled_receipt(
    settled: SettleResponse,
    verified_payer: Option<String>,
    requirements: &PaymentRequirements,
) -> Result<Receipt, VerifierError> {
    let transaction = settled
        .transaction
        .map(|tx| tx.trim().to_string())
        .filter(|tx| !tx.is_empty())
        .ok_or_else(|| {
            VerifierError::MalformedResponse("settlement succeeded without a transaction hash".into())
        })?;

    Ok(Receipt {
        transaction,
        payer: settled.payer.or(verified_payer),
        network: settled
            .network
            .unwrap_or_else(|| requirements.network.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use x402::{ChainConfig, ExactEvmSchemeServer, NetworkMode, PaymentPayload};

    fn requirements() -> PaymentRequirements {
        ExactEvmSchemeServer::new(ChainConfig::for_mode(NetworkMode::Testnet))
            .requirements("$0.001", alloy::primitives::Address::repeat_byte(0x22))
            .unwrap()
    }

    // Port 1 refuses connections, so any facilitator round trip fails fast.
    fn unreachable_verifier() -> FacilitatorVerifier {
        FacilitatorVerifier::new(FacilitatorClient::new("http://127.0.0.1:1").unwrap())
    }

    fn header(scheme: &str, network: &str) -> String {
        x402::encode_payment(&PaymentPayload {
            x402_version: 2,
            scheme: scheme.to_string(),
            network: network.to_string(),
            payload: serde_json::json!({}),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_is_unpaid() {
        let outcome = unreachable_verifier()
            .verify(None, &requirements())
            .await
            .unwrap();
        assert_eq!(outcome, VerificationOutcome::Unpaid);
    }

    #[tokio::test]
    async fn test_garbage_header_is_rejected() {
        let outcome = unreachable_verifier()
            .verify(Some("not-valid-base64!!!"), &requirements())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(REASON_INVALID_HEADER.into())
        );
    }

    #[tokio::test]
    async fn test_scheme_and_network_mismatch_rejected_locally() {
        let verifier = unreachable_verifier();
        let req = requirements();

        let outcome = verifier
            .verify(Some(&header("upto", "eip155:84532")), &req)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(REASON_UNSUPPORTED_SCHEME.into())
        );

        let outcome = verifier
            .verify(Some(&header("exact", "eip155:8453")), &req)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected(REASON_NETWORK_MISMATCH.into())
        );
    }

    #[tokio::test]
    async fn test_unreachable_facilitator_is_an_error() {
        let result = unreachable_verifier()
            .verify(Some(&header("exact", "eip155:84532")), &requirements())
            .await;
        assert!(matches!(result, Err(VerifierError::Transport(_))));
    }

    fn settled(transaction: Option<&str>) -> SettleResponse {
        SettleResponse {
            success: true,
            error_reason: None,
            payer: None,
            transaction: transaction.map(str::to_string),
            network: None,
        }
    }

    #[test]
    fn test_settled_receipt_requires_transaction_hash() {
        let req = requirements();

        let receipt = settled_receipt(settled(Some("0xfeed")), Some("0xbuyer".into()), &req).unwrap();
        assert_eq!(receipt.transaction, "0xfeed");
        assert_eq!(receipt.payer.as_deref(), Some("0xbuyer"));
        assert_eq!(receipt.network, req.network);

        for missing in [None, Some(""), Some("  ")] {
            assert!(matches!(
                settled_receipt(settled(missing), None, &req),
                Err(VerifierError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_error_mapping() {
        let e: VerifierError = X402Error::Facilitator {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(e, VerifierError::MalformedResponse(_)));
    }
}
