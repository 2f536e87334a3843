//! Core trait definitions for the buyer and seller sides of a payment.
//!
//! - [`SchemeClient`]: buyer-side: creates signed payment payloads
//! - [`SchemeServer`]: seller-side: parses prices into on-chain amounts
//!
//! Verification and settlement live with the facilitator and are reached
//! through [`crate::facilitator_client::FacilitatorClient`].

use crate::error::X402Error;
use crate::payment::{PaymentPayload, PaymentRequirements};
use alloy::primitives::Address;

/// Buyer-side scheme: creates signed payment payloads.
pub trait SchemeClient: Send + Sync {
    /// Create a signed payment payload for the given requirements.
    fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = Result<PaymentPayload, X402Error>> + Send;
}

/// Seller-side scheme: parses prices into on-chain amounts.
pub trait SchemeServer: Send + Sync {
    /// Parse a human-readable price string (e.g. "$0.001") into an amount and asset.
    fn parse_price(&self, price: &str) -> Result<(String, Address), X402Error>;
}
