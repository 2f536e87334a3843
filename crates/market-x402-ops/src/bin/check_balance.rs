//! ETH and USDC balances of the server wallet.

use alloy::primitives::utils::format_ether;
use alloy::providers::ProviderBuilder;
use x402::scheme_server::to_token_units;
use x402::usdc;
use x402_ops::{env, units, OpsError};

#[tokio::main]
async fn main() {
    env::init();
    if let Err(e) = run().await {
        env::fail(e);
    }
}

async fn run() -> Result<(), OpsError> {
    let chain = env::chain();
    let wallet = env::address("SERVER_WALLET_ADDRESS")?;

    println!("\nServer Wallet Balance Check\n");
    println!("{}", env::rule());
    println!("\nServer Wallet: {wallet}");
    println!("Network: {} ({})\n", chain.label, chain.network);

    let provider = ProviderBuilder::new().connect_http(env::rpc_url(&chain)?);

    let eth = usdc::native_balance(&provider, wallet).await?;
    println!("ETH Balance:  {} ETH", format_ether(eth));

    let balance = usdc::balance_of(&provider, chain.usdc, wallet).await?;
    println!(
        "USDC Balance: {} USDC",
        units::format_token_amount(balance, chain.token_decimals)
    );

    println!("\n{}", env::rule());
    println!("\nView on Block Explorer:");
    println!("   {}\n", chain.address_url(wallet));

    if !balance.is_zero() {
        let price = env::price();
        let price_units = to_token_units(&price, chain.token_decimals)?;
        println!(
            "Estimated API calls paid: ~{} (at {price} each)\n",
            units::estimated_calls(balance, price_units)
        );
    }
    Ok(())
}
