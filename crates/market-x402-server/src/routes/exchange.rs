use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;
use x402::DiscoveryMetadata;

use super::{success, Meta};
use crate::config::{ConfigError, GateConfig, GateConfigBuilder, ServerConfig};
use crate::error::ResourceError;
use crate::providers::exchange;
use crate::state::AppState;

pub const RESOURCE: &str = "/api/exchange";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(RESOURCE, web::get().to(get_exchange));
}

pub fn gate_config(config: &ServerConfig) -> Result<GateConfig, ConfigError> {
    GateConfigBuilder::new(RESOURCE, &config.chain, config.pay_to)
        .price(&config.price)
        .description("Get current exchange rates between 150+ currencies")
        .discovery(
            DiscoveryMetadata::new("Exchange Rate API")
                .tags(["finance", "currency", "data"])
                .input(
                    serde_json::json!({ "from": "USD", "to": "EUR", "amount": "1" }),
                    serde_json::json!({
                        "properties": {
                            "from": { "type": "string", "description": "ISO 4217 source currency" },
                            "to": { "type": "string", "description": "ISO 4217 target currency" },
                            "amount": { "type": "string", "description": "Positive amount to convert" }
                        }
                    }),
                ),
        )
        .build()
}

#[derive(Debug, Deserialize)]
pub struct ExchangeQuery {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

/// GET /api/exchange?from=&to=&amount= - currency conversion, paid per call
///
/// Parameters are parsed and validated after payment, inside the handler.
pub async fn get_exchange(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let raw_query = req.query_string().to_string();
    let gate = state.exchange_gate.clone();
    gate.guard(&req, move || async move {
        lookup(&state, &raw_query)
            .await
            .unwrap_or_else(|e| e.error_response())
    })
    .await
}

async fn lookup(state: &AppState, raw_query: &str) -> Result<HttpResponse, ResourceError> {
    let query = web::Query::<ExchangeQuery>::from_query(raw_query)
        .map_err(|e| ResourceError::BadRequest(format!("Invalid query: {e}")))?
        .into_inner();
    let from = exchange::currency_code(query.from.as_deref().unwrap_or("USD"))?;
    let to = exchange::currency_code(query.to.as_deref().unwrap_or("EUR"))?;
    let amount = exchange::parse_amount(query.amount.as_deref().unwrap_or("1"))?;

    let api_key = state
        .config
        .exchangerate_api_key
        .as_deref()
        .ok_or(ResourceError::NotConfigured("Exchange Rate API"))?;

    let conversion = exchange::convert(
        &state.upstream,
        &state.config.exchangerate_base_url,
        api_key,
        &from,
        &to,
        amount,
    )
    .await?;

    Ok(success(conversion, Meta::new("x402-marketplace/exchange", state)))
}
