//! Environment handling common to every binary.

use alloy::primitives::Address;
use x402::{ChainConfig, NetworkMode};

use crate::OpsError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Load `.env.local`, then `.env`, and install a log subscriber (`RUST_LOG`, default `warn`).
pub fn init() {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

/// Value of `key`, treating empty as unset.
pub fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(key: &'static str) -> Result<String, OpsError> {
    optional(key).ok_or(OpsError::MissingEnv(key))
}

pub fn address(key: &'static str) -> Result<Address, OpsError> {
    required(key)?.parse().map_err(|e| OpsError::InvalidEnv {
        name: key,
        reason: format!("{e}"),
    })
}

/// Network selected by `X402_NETWORK` (`base` for mainnet).
pub fn network() -> NetworkMode {
    NetworkMode::from_selector(optional("X402_NETWORK").as_deref())
}

/// Chain settings for the selected network; `RPC_URL` overrides the public endpoint.
pub fn chain() -> ChainConfig {
    let mut chain = ChainConfig::for_mode(network());
    if let Some(rpc) = optional("RPC_URL") {
        chain.rpc_url = rpc;
    }
    chain
}

pub fn rpc_url(chain: &ChainConfig) -> Result<url::Url, OpsError> {
    chain.rpc_url.parse().map_err(|e| OpsError::InvalidEnv {
        name: "RPC_URL",
        reason: format!("{e}"),
    })
}

pub fn api_base_url() -> String {
    optional("API_BASE_URL")
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub fn price() -> String {
    optional("X402_PRICE").unwrap_or_else(|| "$0.001".to_string())
}

/// Print `err` and exit with status 1.
pub fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1)
}

/// A horizontal rule for console reports.
pub fn rule() -> String {
    "=".repeat(50)
}
