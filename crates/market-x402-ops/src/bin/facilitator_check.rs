//! Print the resolved payment configuration and what the facilitator supports.

use x402::{FacilitatorClient, DEFAULT_FACILITATOR_URL, SCHEME_NAME};
use x402_ops::{env, OpsError};

#[tokio::main]
async fn main() {
    env::init();
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => env::fail(e),
    }
}

async fn run() -> Result<bool, OpsError> {
    let chain = env::chain();
    let facilitator_url =
        env::optional("X402_FACILITATOR_URL").unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_string());

    println!("\nx402 Configuration Check");
    println!("{}", env::rule());
    println!("Network:     {} ({})", chain.label, chain.network);
    println!("USDC:        {}", chain.usdc);
    match env::optional("SERVER_WALLET_ADDRESS") {
        Some(addr) => println!("Pay to:      {addr}"),
        None => println!("Pay to:      (SERVER_WALLET_ADDRESS not set)"),
    }
    println!("Price:       {}", env::price());
    println!("Facilitator: {facilitator_url}");

    let client = FacilitatorClient::new(&facilitator_url)?;
    let supported = client.supported().await?;

    println!("\nSupported kinds:");
    for kind in &supported.kinds {
        println!("   - x402 v{} {} on {}", kind.x402_version, kind.scheme, kind.network);
    }

    let ok = supported.supports(SCHEME_NAME, &chain.network);
    if ok {
        println!("\nFacilitator supports {SCHEME_NAME} on {}.\n", chain.network);
    } else {
        println!(
            "\nFacilitator does NOT list {SCHEME_NAME} on {}; payments will fail.\n",
            chain.network
        );
    }
    Ok(ok)
}
