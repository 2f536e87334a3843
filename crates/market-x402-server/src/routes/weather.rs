use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Deserialize;
use x402::DiscoveryMetadata;

use super::{success, Meta};
use crate::config::{ConfigError, GateConfig, GateConfigBuilder, ServerConfig};
use crate::error::ResourceError;
use crate::providers::weather;
use crate::state::AppState;

pub const RESOURCE: &str = "/api/weather";
const DEFAULT_CITY: &str = "London";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(RESOURCE, web::get().to(get_weather));
}

pub fn gate_config(config: &ServerConfig) -> Result<GateConfig, ConfigError> {
    GateConfigBuilder::new(RESOURCE, &config.chain, config.pay_to)
        .price(&config.price)
        .description("Get real-time weather data for any city worldwide")
        .discovery(
            DiscoveryMetadata::new("Weather API")
                .tags(["weather", "data", "utility"])
                .input(
                    serde_json::json!({ "city": "London" }),
                    serde_json::json!({
                        "properties": {
                            "city": { "type": "string", "description": "City name" }
                        }
                    }),
                ),
        )
        .build()
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

/// GET /api/weather?city= - current conditions, paid per call
///
/// The query is parsed after payment so malformed input still negotiates 402.
pub async fn get_weather(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let raw_query = req.query_string().to_string();
    let gate = state.weather_gate.clone();
    gate.guard(&req, move || async move {
        lookup(&state, &raw_query)
            .await
            .unwrap_or_else(|e| e.error_response())
    })
    .await
}

fn city(raw_query: &str) -> Result<String, ResourceError> {
    let query = web::Query::<WeatherQuery>::from_query(raw_query)
        .map_err(|e| ResourceError::BadRequest(format!("Invalid query: {e}")))?;
    Ok(query
        .into_inner()
        .city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CITY.to_string()))
}

async fn lookup(state: &AppState, raw_query: &str) -> Result<HttpResponse, ResourceError> {
    let city = city(raw_query)?;
    let api_key = state
        .config
        .openweather_api_key
        .as_deref()
        .ok_or(ResourceError::NotConfigured("Weather API"))?;

    let observation = weather::current(
        &state.upstream,
        &state.config.openweather_base_url,
        api_key,
        &city,
    )
    .await;

    let mut meta = Meta::new("x402-marketplace/weather", state);
    meta.fallback = observation.fallback;
    Ok(success(observation.report, meta))
}
