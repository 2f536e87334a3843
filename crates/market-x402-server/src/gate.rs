//! Request gate: decides per request whether a protected handler may run.
//!
//! The decision is a pure function of the verifier's [`VerificationOutcome`]
//! and the process-wide [`NetworkMode`] (see [`disposition`]). Everything else
//! here is plumbing: reading the payment header, rendering the 402 body,
//! logging and metrics.
//!
//! One exception to "no settlement, no content" exists: on testnet, a
//! settlement failure with reason code [`BYPASS_REASON_CODE`] is served anyway,
//! because the public testnet facilitator reports that code for transfers
//! that did land on-chain. Mainnet never bypasses.

use actix_web::http::header::HeaderValue;
use actix_web::{HttpRequest, HttpResponse};
use base64::Engine;
use std::future::Future;
use std::sync::Arc;
use x402::{NetworkMode, PaymentRequiredBody, LEGACY_PAYMENT_HEADER, PAYMENT_HEADER, X402_VERSION};

use crate::config::GateConfig;
use crate::metrics::{PAYMENT_OUTCOMES, REQUESTS};
use crate::verifier::{PaymentVerifier, Receipt, VerificationOutcome};

/// Settlement reason code that testnet treats as success.
pub const BYPASS_REASON_CODE: &str = "transaction_failed";

/// Header carrying the base64-encoded 402 body, for clients that ignore bodies.
pub const PAYMENT_REQUIRED_HEADER: &str = "payment-required";

/// Terminal state of one pass through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Verified,
    Rejected,
    SettlementBypassed,
    SettlementBlocked,
}

impl Disposition {
    /// Whether the protected handler runs.
    pub fn proceeds(self) -> bool {
        matches!(self, Disposition::Verified | Disposition::SettlementBypassed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Verified => "verified",
            Disposition::Rejected => "rejected",
            Disposition::SettlementBypassed => "settlement_bypassed",
            Disposition::SettlementBlocked => "settlement_blocked",
        }
    }
}

/// The gate's decision procedure.
pub fn disposition(outcome: &VerificationOutcome, mode: NetworkMode) -> Disposition {
    match outcome {
        VerificationOutcome::Verified(_) => Disposition::Verified,
        VerificationOutcome::Unpaid | VerificationOutcome::Rejected(_) => Disposition::Rejected,
        VerificationOutcome::SettlementFailed(code)
            if mode == NetworkMode::Testnet && code == BYPASS_REASON_CODE =>
        {
            Disposition::SettlementBypassed
        }
        VerificationOutcome::SettlementFailed(_) => Disposition::SettlementBlocked,
    }
}

/// Optional audit hook invoked with every verified receipt.
pub trait ReceiptSink: Send + Sync {
    fn record(&self, resource: &str, receipt: &Receipt);
}

/// Guards one resource. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct PaymentGate {
    config: Arc<GateConfig>,
    mode: NetworkMode,
    verifier: Arc<dyn PaymentVerifier>,
    receipts: Option<Arc<dyn ReceiptSink>>,
}

impl PaymentGate {
    pub fn new(config: GateConfig, mode: NetworkMode, verifier: Arc<dyn PaymentVerifier>) -> Self {
        tracing::info!(
            resource = %config.resource,
            network = %mode,
            scheme = %config.requirements.scheme,
            price = %config.price.amount,
            pay_to = %config.price.pay_to,
            "payment gate initialized"
        );
        Self {
            config: Arc::new(config),
            mode,
            verifier,
            receipts: None,
        }
    }

    pub fn with_receipt_sink(mut self, sink: Arc<dyn ReceiptSink>) -> Self {
        self.receipts = Some(sink);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn network_mode(&self) -> NetworkMode {
        self.mode
    }

    /// The negotiation body describing how to pay for this resource.
    pub fn payment_required_body(&self, error: Option<String>) -> PaymentRequiredBody {
        PaymentRequiredBody {
            x402_version: X402_VERSION,
            error,
            accepts: vec![self.config.requirements.clone()],
            description: Some(self.config.description.clone()),
            mime_type: Some(self.config.mime_type.clone()),
            extensions: self.config.discovery.as_ref().map(|d| d.to_extensions()),
        }
    }

    fn payment_required(&self, error: Option<String>) -> HttpResponse {
        let body = self.payment_required_body(error);
        let mut resp = HttpResponse::PaymentRequired();
        if let Ok(json) = serde_json::to_vec(&body) {
            let encoded = base64::engine::general_purpose::STANDARD.encode(json);
            if let Ok(value) = HeaderValue::from_str(&encoded) {
                resp.insert_header((PAYMENT_REQUIRED_HEADER, value));
            }
        }
        resp.json(body)
    }

    /// Run `handler` if the request is paid for, otherwise answer 402.
    ///
    /// The handler runs at most once and its response is returned untouched.
    /// A verifier failure answers 500 and never reaches the handler.
    pub async fn guard<F, Fut>(&self, req: &HttpRequest, handler: F) -> HttpResponse
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HttpResponse>,
    {
        let endpoint = req
            .match_pattern()
            .unwrap_or_else(|| self.config.resource.clone());

        let outcome = match self
            .verifier
            .verify(payment_header(req), &self.config.requirements)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(resource = %self.config.resource, error = %e, "payment verifier failed");
                PAYMENT_OUTCOMES
                    .with_label_values(&[endpoint.as_str(), "error"])
                    .inc();
                REQUESTS.with_label_values(&[endpoint.as_str(), "500"]).inc();
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "payment processing failed"
                }));
            }
        };

        let decision = disposition(&outcome, self.mode);
        PAYMENT_OUTCOMES
            .with_label_values(&[endpoint.as_str(), decision.as_str()])
            .inc();

        let resp = match outcome {
            VerificationOutcome::Verified(receipt) => {
                self.record(&receipt);
                handler().await
            }
            VerificationOutcome::SettlementFailed(reason) if decision.proceeds() => {
                tracing::warn!(
                    resource = %self.config.resource,
                    network = %self.mode,
                    reason = %reason,
                    "settlement failure bypassed on testnet, serving resource"
                );
                handler().await
            }
            VerificationOutcome::SettlementFailed(reason) => {
                tracing::warn!(
                    resource = %self.config.resource,
                    network = %self.mode,
                    reason = %reason,
                    "settlement failed"
                );
                self.payment_required(Some(reason))
            }
            VerificationOutcome::Rejected(reason) => {
                tracing::info!(resource = %self.config.resource, reason = %reason, "payment rejected");
                self.payment_required(Some(reason))
            }
            VerificationOutcome::Unpaid => self.payment_required(None),
        };

        REQUESTS
            .with_label_values(&[endpoint.as_str(), resp.status().as_str()])
            .inc();
        resp
    }

    fn record(&self, receipt: &Receipt) {
        tracing::info!(
            resource = %self.config.resource,
            transaction = %receipt.transaction,
            payer = receipt.payer.as_deref().unwrap_or("unknown"),
            network = %receipt.network,
            "payment settled"
        );
        if let Some(sink) = &self.receipts {
            sink.record(&self.config.resource, receipt);
        }
    }
}

/// `PAYMENT-SIGNATURE`, falling back to the older `X-PAYMENT` name.
fn payment_header(req: &HttpRequest) -> Option<&str> {
    let headers = req.headers();
    headers
        .get(PAYMENT_HEADER)
        .or_else(|| headers.get(LEGACY_PAYMENT_HEADER))
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn receipt() -> Receipt {
        Receipt {
            transaction: "0xabc".to_string(),
            payer: None,
            network: "eip155:84532".to_string(),
        }
    }

    #[test]
    fn test_bypass_only_on_testnet_transaction_failed() {
        let failed = VerificationOutcome::SettlementFailed(BYPASS_REASON_CODE.to_string());
        assert_eq!(
            disposition(&failed, NetworkMode::Testnet),
            Disposition::SettlementBypassed
        );
        assert_eq!(
            disposition(&failed, NetworkMode::Mainnet),
            Disposition::SettlementBlocked
        );

        for code in ["insufficient_funds", "unknown", "", "Transaction_Failed", "transaction_failed "] {
            let outcome = VerificationOutcome::SettlementFailed(code.to_string());
            for mode in [NetworkMode::Testnet, NetworkMode::Mainnet] {
                assert_eq!(disposition(&outcome, mode), Disposition::SettlementBlocked);
            }
        }
    }

    #[test]
    fn test_unpaid_and_rejected_never_proceed() {
        for mode in [NetworkMode::Testnet, NetworkMode::Mainnet] {
            assert_eq!(
                disposition(&VerificationOutcome::Unpaid, mode),
                Disposition::Rejected
            );
            // A rejection carrying the bypass code is still a rejection.
            let rejected = VerificationOutcome::Rejected(BYPASS_REASON_CODE.to_string());
            assert_eq!(disposition(&rejected, mode), Disposition::Rejected);
            assert!(!disposition(&rejected, mode).proceeds());
        }
    }

    #[test]
    fn test_verified_proceeds_everywhere() {
        for mode in [NetworkMode::Testnet, NetworkMode::Mainnet] {
            let d = disposition(&VerificationOutcome::Verified(receipt()), mode);
            assert_eq!(d, Disposition::Verified);
            assert!(d.proceeds());
        }
    }

    #[test]
    fn test_payment_header_fallback() {
        let req = TestRequest::default()
            .insert_header(("X-PAYMENT", "legacy"))
            .to_http_request();
        assert_eq!(payment_header(&req), Some("legacy"));

        let req = TestRequest::default()
            .insert_header(("PAYMENT-SIGNATURE", "primary"))
            .insert_header(("X-PAYMENT", "legacy"))
            .to_http_request();
        assert_eq!(payment_header(&req), Some("primary"));

        let req = TestRequest::default()
            .insert_header(("PAYMENT-SIGNATURE", "  "))
            .to_http_request();
        assert_eq!(payment_header(&req), None);
    }
}
