pub mod catalog;
pub mod exchange;
pub mod health;
pub mod weather;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::state::AppState;

/// Version of the paid API surface, reported in every `meta` block.
pub const API_VERSION: &str = "1.0.0";

/// Register every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure(cfg);
    catalog::configure(cfg);
    weather::configure(cfg);
    exchange::configure(cfg);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub api: &'static str,
    pub version: &'static str,
    pub price_per_request: String,
    pub network: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl Meta {
    pub fn new(api: &'static str, state: &AppState) -> Self {
        Self {
            api,
            version: API_VERSION,
            price_per_request: format!("{} USDC", state.config.price),
            network: state.config.network.label(),
            fallback: false,
        }
    }
}

/// `{success: true, data, meta}`
pub fn success<T: Serialize>(data: T, meta: Meta) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
        "meta": meta,
    }))
}
