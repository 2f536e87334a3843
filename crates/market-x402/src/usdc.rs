use alloy::primitives::{Address, U256};
use alloy::providers::Provider;

use crate::{X402Error, IERC20};

/// Query the USDC balance of `owner`.
pub async fn balance_of<P: Provider>(
    provider: &P,
    token: Address,
    owner: Address,
) -> Result<U256, X402Error> {
    let contract = IERC20::new(token, provider);
    contract
        .balanceOf(owner)
        .call()
        .await
        .map_err(|e| X402Error::ChainError(format!("balanceOf failed: {e}")))
}

/// Query the native (ETH) balance of `owner`, used to pay gas.
pub async fn native_balance<P: Provider>(provider: &P, owner: Address) -> Result<U256, X402Error> {
    provider
        .get_balance(owner)
        .await
        .map_err(|e| X402Error::ChainError(format!("getBalance failed: {e}")))
}
