//! End-to-end route tests with an in-memory verifier.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;

use x402::{PaymentRequiredBody, PaymentRequirements};
use x402_server::{
    routes, AppState, PaymentVerifier, Receipt, ServerConfig, VerificationOutcome, VerifierError,
};

/// Verified when any payment header is present, unpaid otherwise.
struct HeaderPresence;

#[async_trait]
impl PaymentVerifier for HeaderPresence {
    async fn verify(
        &self,
        header: Option<&str>,
        requirements: &PaymentRequirements,
    ) -> Result<VerificationOutcome, VerifierError> {
        Ok(match header {
            None => VerificationOutcome::Unpaid,
            Some(_) => VerificationOutcome::Verified(Receipt {
                transaction: "0xabc".into(),
                payer: None,
                network: requirements.network.clone(),
            }),
        })
    }
}

fn config(extra: &[(&str, &str)]) -> ServerConfig {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert(
        "SERVER_WALLET_ADDRESS".into(),
        "0x3333333333333333333333333333333333333333".into(),
    );
    // Nothing listens on port 1: upstream calls fail immediately.
    env.insert("OPENWEATHER_BASE_URL".into(), "http://127.0.0.1:1".into());
    env.insert("EXCHANGERATE_BASE_URL".into(), "http://127.0.0.1:1".into());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    ServerConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
}

fn state(config: ServerConfig) -> web::Data<AppState> {
    web::Data::new(AppState::new(config, Arc::new(HeaderPresence)).unwrap())
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state).configure(routes::configure)).await
    };
}

#[actix_rt::test]
async fn weather_without_payment_is_402() {
    let app = app!(state(config(&[])));
    let req = test::TestRequest::get()
        .uri("/api/weather?city=Paris")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);

    let header = resp
        .headers()
        .get("payment-required")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap();
    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.accepts.len(), 1);
    assert_eq!(body.accepts[0].scheme, "exact");
    assert_eq!(body.accepts[0].price, "$0.001");
    assert_eq!(body.accepts[0].network, "eip155:84532");
    assert_eq!(
        body.description.as_deref(),
        Some("Get real-time weather data for any city worldwide")
    );

    let bazaar = &body.extensions.as_ref().unwrap()["bazaar"];
    assert_eq!(bazaar["name"], "Weather API");
    assert_eq!(bazaar["input"]["city"], "London");

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(header)
        .unwrap();
    let from_header: PaymentRequiredBody = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(from_header, body);
}

#[actix_rt::test]
async fn paid_weather_falls_back_when_provider_is_down() {
    let app = app!(state(config(&[("OPENWEATHER_API_KEY", "test-key")])));
    let req = test::TestRequest::get()
        .uri("/api/weather?city=Oslo")
        .insert_header(("PAYMENT-SIGNATURE", "paid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["city"], "Oslo");
    assert_eq!(body["meta"]["api"], "x402-marketplace/weather");
    assert_eq!(body["meta"]["pricePerRequest"], "$0.001 USDC");
    assert_eq!(body["meta"]["network"], "base-sepolia");
    assert_eq!(body["meta"]["fallback"], true);
}

#[actix_rt::test]
async fn paid_weather_without_api_key_is_500() {
    let app = app!(state(config(&[])));
    let req = test::TestRequest::get()
        .uri("/api/weather")
        .insert_header(("X-PAYMENT", "paid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Weather API not configured");
}

#[actix_rt::test]
async fn exchange_validates_after_payment() {
    let app = app!(state(config(&[("EXCHANGERATE_API_KEY", "test-key")])));

    let unpaid = test::TestRequest::get()
        .uri("/api/exchange?amount=-5")
        .to_request();
    assert_eq!(
        test::call_service(&app, unpaid).await.status(),
        StatusCode::PAYMENT_REQUIRED
    );

    for uri in [
        "/api/exchange?amount=-5",
        "/api/exchange?amount=abc",
        "/api/exchange?amount=0",
        "/api/exchange?from=EURO",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(("PAYMENT-SIGNATURE", "paid"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_rt::test]
async fn malformed_query_negotiates_before_rejecting() {
    let app = app!(state(config(&[])));

    for uri in ["/api/weather?city=a&city=b", "/api/exchange?amount=1&amount=2"] {
        let unpaid = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(
            test::call_service(&app, unpaid).await.status(),
            StatusCode::PAYMENT_REQUIRED,
            "{uri}"
        );

        let paid = test::TestRequest::get()
            .uri(uri)
            .insert_header(("PAYMENT-SIGNATURE", "paid"))
            .to_request();
        let resp = test::call_service(&app, paid).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false, "{uri}");
    }
}

#[actix_rt::test]
async fn paid_exchange_without_provider_is_500() {
    let app = app!(state(config(&[("EXCHANGERATE_API_KEY", "test-key")])));
    let req = test::TestRequest::get()
        .uri("/api/exchange?from=usd&to=jpy&amount=10")
        .insert_header(("PAYMENT-SIGNATURE", "paid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "An internal error occurred");
}

#[actix_rt::test]
async fn catalog_is_free_and_lists_both_resources() {
    let app = app!(state(config(&[("X402_PRICE", "$0.002")])));
    let req = test::TestRequest::get().uri("/api/catalog").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let resources = body["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["resource"], "/api/weather");
    assert_eq!(resources[1]["resource"], "/api/exchange");
    assert_eq!(resources[1]["name"], "Exchange Rate API");
    assert_eq!(resources[0]["price"], "$0.002");
    assert_eq!(body["network"], "base-sepolia");
}

#[actix_rt::test]
async fn mainnet_gates_advertise_mainnet() {
    let app = app!(state(config(&[("X402_NETWORK", "base")])));
    let req = test::TestRequest::get().uri("/api/exchange").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);

    let body: PaymentRequiredBody = test::read_body_json(resp).await;
    assert_eq!(body.accepts[0].network, "eip155:8453");
    assert_eq!(body.accepts[0].domain_name(), Some("USD Coin"));
}

#[actix_rt::test]
async fn health_reports_network() {
    let app = app!(state(config(&[])));
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "x402-market");
    assert_eq!(body["network"], "base-sepolia");
}

#[actix_rt::test]
async fn metrics_require_token_or_opt_in() {
    let app = app!(state(config(&[])));
    let req = test::TestRequest::get().uri("/metrics").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let app = app!(state(config(&[("METRICS_TOKEN", "s3cret")])));
    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer s3cret"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let app = app!(state(config(&[("X402_PUBLIC_METRICS", "true")])));
    let req = test::TestRequest::get().uri("/metrics").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
