//! Look this marketplace up in an x402 discovery catalog.

use x402_ops::catalog::{self, DEFAULT_CATALOG_URL, MARKET_API_NAMES};
use x402_ops::{env, OpsError};

#[tokio::main]
async fn main() {
    env::init();
    if let Err(e) = run().await {
        env::fail(e);
    }
}

async fn run() -> Result<(), OpsError> {
    let url = env::optional("CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
    let app_url = env::optional("MARKET_PUBLIC_URL");

    println!("Fetching catalog from: {url}");
    let http = reqwest::Client::new();
    let entries = catalog::fetch(&http, &url).await?;
    println!("\nFound {} resources in the catalog.", entries.len());

    let mine = catalog::matching(&entries, app_url.as_deref(), &MARKET_API_NAMES);
    if mine.is_empty() {
        println!("\nThis marketplace's APIs were not found.");
        if let Some(app_url) = &app_url {
            println!("Checked against deployment URL: {app_url}");
        } else {
            println!("Set MARKET_PUBLIC_URL to also match by deployment URL.");
        }
        println!("\nFirst 5 resources in the catalog:");
        for entry in entries.iter().take(5) {
            println!("- {} ({})", entry.resource, entry.network());
        }
        return Ok(());
    }

    println!("\nYour APIs are listed:");
    println!("{}", env::rule());
    for entry in mine {
        println!("\nResource URL: {}", entry.resource);
        println!("Network: {}", entry.network());
        println!("Payment: {}", entry.payment());
    }
    println!();
    Ok(())
}
