//! Network selection.
//!
//! The marketplace runs against exactly one chain per process. The choice is
//! made once from configuration and then passed around as a plain value, so
//! everything that depends on it (pricing, gating policy, balance checks) is
//! a function of an explicit [`NetworkMode`] instead of ambient state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{BASE_NETWORK, BASE_SEPOLIA_NETWORK};

/// Selector value that switches the process to mainnet.
pub const MAINNET_SELECTOR: &str = "base";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Testnet,
    Mainnet,
}

impl NetworkMode {
    /// Resolve the mode from the `X402_NETWORK` selector.
    ///
    /// Only the exact value `"base"` selects mainnet; anything else, including
    /// an unset selector, stays on testnet.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some(MAINNET_SELECTOR) => NetworkMode::Mainnet,
            _ => NetworkMode::Testnet,
        }
    }

    pub fn from_network_id(network: &str) -> Option<Self> {
        match network {
            BASE_SEPOLIA_NETWORK => Some(NetworkMode::Testnet),
            BASE_NETWORK => Some(NetworkMode::Mainnet),
            _ => None,
        }
    }

    /// CAIP-2 identifier of the chain.
    pub fn network_id(self) -> &'static str {
        match self {
            NetworkMode::Testnet => BASE_SEPOLIA_NETWORK,
            NetworkMode::Mainnet => BASE_NETWORK,
        }
    }

    /// Short human-readable chain name.
    pub fn label(self) -> &'static str {
        match self {
            NetworkMode::Testnet => "base-sepolia",
            NetworkMode::Mainnet => "base",
        }
    }

    pub fn is_testnet(self) -> bool {
        self == NetworkMode::Testnet
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.network_id())
    }
}
