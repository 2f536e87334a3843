use alloy::primitives::{address, Address};

use crate::network::NetworkMode;

/// Protocol version written into 402 bodies and payment payloads.
pub const X402_VERSION: u32 = 2;

/// x402 scheme name for EIP-3009 transfers of an exact amount.
pub const SCHEME_NAME: &str = "exact";

/// CAIP-2 network identifier for Base Sepolia.
pub const BASE_SEPOLIA_NETWORK: &str = "eip155:84532";

/// CAIP-2 network identifier for Base mainnet.
pub const BASE_NETWORK: &str = "eip155:8453";

/// Base Sepolia chain ID.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Base mainnet chain ID.
pub const BASE_CHAIN_ID: u64 = 8453;

/// USDC on Base Sepolia.
pub const BASE_SEPOLIA_USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

/// USDC on Base mainnet.
pub const BASE_USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// USDC has 6 decimal places on every chain we target.
pub const TOKEN_DECIMALS: u32 = 6;

/// Public facilitator used when none is configured.
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Header carrying the base64 payment payload.
pub const PAYMENT_HEADER: &str = "PAYMENT-SIGNATURE";

/// Older header name still sent by v1 clients.
pub const LEGACY_PAYMENT_HEADER: &str = "X-PAYMENT";

/// Window the signed authorization stays valid for.
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 60;

/// Runtime chain configuration, derived from the [`NetworkMode`] once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub network: String,
    pub label: String,
    pub usdc: Address,
    pub token_decimals: u32,
    pub rpc_url: String,
    pub explorer_base: String,
    /// EIP-712 domain of the USDC contract, used for `transferWithAuthorization`.
    pub eip712_domain_name: String,
    pub eip712_domain_version: String,
}

impl ChainConfig {
    pub fn for_mode(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::Testnet => Self {
                chain_id: BASE_SEPOLIA_CHAIN_ID,
                network: BASE_SEPOLIA_NETWORK.to_string(),
                label: "base-sepolia".to_string(),
                usdc: BASE_SEPOLIA_USDC,
                token_decimals: TOKEN_DECIMALS,
                rpc_url: "https://sepolia.base.org".to_string(),
                explorer_base: "https://sepolia.basescan.org".to_string(),
                eip712_domain_name: "USDC".to_string(),
                eip712_domain_version: "2".to_string(),
            },
            NetworkMode::Mainnet => Self {
                chain_id: BASE_CHAIN_ID,
                network: BASE_NETWORK.to_string(),
                label: "base".to_string(),
                usdc: BASE_USDC,
                token_decimals: TOKEN_DECIMALS,
                rpc_url: "https://mainnet.base.org".to_string(),
                explorer_base: "https://basescan.org".to_string(),
                eip712_domain_name: "USD Coin".to_string(),
                eip712_domain_version: "2".to_string(),
            },
        }
    }

    /// Look up the chain by its CAIP-2 identifier.
    pub fn for_network(network: &str) -> Option<Self> {
        NetworkMode::from_network_id(network).map(Self::for_mode)
    }

    /// Explorer URL for an address page.
    pub fn address_url(&self, address: Address) -> String {
        format!("{}/address/{address}", self.explorer_base)
    }
}

impl Default for ChainConfig {
    /// Defaults to Base Sepolia.
    fn default() -> Self {
        Self::for_mode(NetworkMode::Testnet)
    }
}
