//! Make a real paid request and report the USDC actually spent.

use alloy::providers::ProviderBuilder;
use std::time::Duration;
use x402::{usdc, ExactEvmSchemeClient, X402Client};
use x402_ops::{env, keys, units, OpsError};

#[tokio::main]
async fn main() {
    env::init();
    if let Err(e) = run().await {
        env::fail(e);
    }
}

async fn run() -> Result<(), OpsError> {
    let chain = env::chain();
    let signer = keys::parse_private_key("BUYER_PRIVATE_KEY", &env::required("BUYER_PRIVATE_KEY")?)?;
    let buyer = signer.address();
    let path = env::optional("PAY_PATH").unwrap_or_else(|| "/api/weather?city=London".to_string());
    let url = format!("{}{path}", env::api_base_url());

    println!("\nx402 Full Payment Test");
    println!("{}", env::rule());
    println!("\nBuyer Wallet: {buyer}");
    println!("Network: {} ({})", chain.label, chain.network);

    let provider = ProviderBuilder::new().connect_http(env::rpc_url(&chain)?);
    let before = usdc::balance_of(&provider, chain.usdc, buyer).await?;
    println!(
        "USDC Balance (before): {} USDC",
        units::format_token_amount(before, chain.token_decimals)
    );
    if before.is_zero() {
        return Err(OpsError::UnexpectedResponse(
            "no USDC in buyer wallet".to_string(),
        ));
    }

    println!("\nMaking paid request to {url}...");
    let client = X402Client::new(ExactEvmSchemeClient::new(signer))?;
    let paid = client.fetch(&url).await?;

    let status = paid.response.status();
    if let Some(req) = &paid.paid {
        println!("Paid {} ({} units) to {}", req.price, req.amount, req.pay_to);
    }

    let text = paid.response.text().await?;
    if status.is_success() {
        println!("\nPayment accepted, API response:");
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or(text)
            ),
            Err(_) => println!("{text}"),
        }
    } else {
        println!("\nRequest failed with status {status}");
        println!("Body: {text}");
    }

    // Give the settlement a moment to land before re-reading the balance.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let after = usdc::balance_of(&provider, chain.usdc, buyer).await?;
    let spent = units::spent(before, after);
    println!(
        "\nUSDC Balance (after): {} USDC",
        units::format_token_amount(after, chain.token_decimals)
    );

    if spent.is_zero() {
        println!("\nNo USDC left the wallet; payment was not settled on-chain.\n");
    } else {
        println!(
            "USDC Spent: {} USDC",
            units::format_token_amount(spent, chain.token_decimals)
        );
        println!("\nSUCCESS: payment processed on-chain.\n");
    }
    Ok(())
}
