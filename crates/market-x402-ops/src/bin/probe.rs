//! Call a gated endpoint without paying and show the 402 requirements.

use x402_ops::probe::{describe, probe, ProbeResult};
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
    let path = env::optional("PROBE_PATH").unwrap_or_else(|| "/api/weather?city=London".to_string());
    let url = format!("{}{path}", env::api_base_url());

    println!("\nx402 Payment Gate Probe");
    println!("{}", env::rule());
    println!("\nRequesting {url} without payment...");

    let http = reqwest::Client::new();
    match probe(&http, &url).await? {
        ProbeResult::PaymentRequired(body) => {
            println!("\nGot 402 Payment Required (x402 v{})", body.x402_version);
            if let Some(description) = &body.description {
                println!("Description: {description}");
            }
            if let Some(error) = &body.error {
                println!("Reason: {error}");
            }
            println!("\nAccepted payments:");
            for req in &body.accepts {
                println!("   - {}", describe(req));
            }
            if let Some(extensions) = &body.extensions {
                println!("\nDiscovery extensions: {}", serde_json::Value::Object(extensions.clone()));
            }
            println!("\nThe endpoint is payment-gated.\n");
            Ok(true)
        }
        ProbeResult::Unexpected { status, body } => {
            println!("\nExpected 402, got {status}");
            println!("Body: {body}\n");
            Ok(false)
        }
    }
}
