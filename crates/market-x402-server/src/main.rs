use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402::FacilitatorClient;
use x402_server::{cors::build_cors, routes, AppState, FacilitatorVerifier, ServerConfig};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    let facilitator = FacilitatorClient::new(&config.facilitator_url).map_err(std::io::Error::other)?;
    let verifier = Arc::new(FacilitatorVerifier::new(facilitator));

    tracing::info!("Starting x402-market on port {}", port);
    tracing::info!("Network: {}", config.network);
    tracing::info!("Facilitator: {}", verifier.facilitator_url());
    tracing::info!("Pay to: {:#x}", config.pay_to);
    tracing::info!("Price per request: {}", config.price);
    if config.network.is_testnet() {
        tracing::info!("Testnet settlement bypass is active for reason code transaction_failed");
    }
    for (name, key) in [
        ("OPENWEATHER_API_KEY", &config.openweather_api_key),
        ("EXCHANGERATE_API_KEY", &config.exchangerate_api_key),
    ] {
        if key.is_none() {
            tracing::warn!("{name} not set; the matching API will answer 500 after payment");
        }
    }

    let state = AppState::new(config, verifier).map_err(std::io::Error::other)?;
    let state_data = web::Data::new(state);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm)
        .finish()
        .ok_or_else(|| std::io::Error::other("invalid rate limiter config"))?;

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
