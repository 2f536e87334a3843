//! x402 payment protocol for USDC on Base.
//!
//! Implements HTTP 402 pay-per-request using EIP-3009 `transferWithAuthorization`
//! signatures, verified and settled by an external facilitator.
//!
//! # Three-party model
//!
//! - **Buyer** ([`ExactEvmSchemeClient`], [`X402Client`]): signs payment authorizations
//! - **Seller** ([`ExactEvmSchemeServer`]): prices resources, answers 402 with requirements
//! - **Facilitator** ([`FacilitatorClient`]): verifies signatures and settles on-chain
//!
//! # Quick example (buyer)
//!
//! ```no_run
//! use alloy::signers::local::PrivateKeySigner;
//! use x402::{ExactEvmSchemeClient, X402Client};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let signer: PrivateKeySigner = "0xYOUR_KEY".parse().unwrap();
//! let client = X402Client::new(ExactEvmSchemeClient::new(signer)).unwrap();
//!
//! let paid = client
//!     .fetch("http://localhost:3000/api/weather?city=London")
//!     .await
//!     .unwrap();
//! println!("status {}", paid.response.status());
//! # }
//! ```

pub mod constants;
pub mod discovery;
pub mod error;
pub mod network;
pub mod payment;
pub mod response;
pub mod scheme;
pub mod security;

pub mod eip712;
pub mod facilitator_client;
pub mod http_client;
pub mod scheme_client;
pub mod scheme_server;
pub mod usdc;

use alloy::sol;

// EIP-3009 authorization, signed under the USDC contract's EIP-712 domain.
sol! {
    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}

pub use constants::ChainConfig;
pub use constants::*;
pub use discovery::DiscoveryMetadata;
pub use error::X402Error;
pub use network::NetworkMode;
pub use payment::*;
pub use response::*;
pub use scheme::*;

pub use facilitator_client::FacilitatorClient;
pub use http_client::{PaidResponse, X402Client};
pub use scheme_client::ExactEvmSchemeClient;
pub use scheme_server::ExactEvmSchemeServer;
