use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::gate::PaymentGate;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/catalog", web::get().to(list_resources));
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub resource: String,
    pub name: Option<String>,
    pub description: String,
    pub mime_type: String,
    pub price: String,
    pub network: String,
    pub pay_to: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
}

impl CatalogEntry {
    fn from_gate(gate: &PaymentGate) -> Self {
        let config = gate.config();
        let discovery = config.discovery.as_ref();
        Self {
            resource: config.resource.clone(),
            name: discovery.map(|d| d.name.clone()),
            description: config.description.clone(),
            mime_type: config.mime_type.clone(),
            price: config.price.amount.clone(),
            network: config.price.network.clone(),
            pay_to: config.price.pay_to.to_checksum(None),
            tags: discovery.map(|d| d.tags.clone()).unwrap_or_default(),
            input: discovery.and_then(|d| d.input.clone()),
        }
    }
}

/// GET /api/catalog - free listing of every paid resource
pub async fn list_resources(state: web::Data<AppState>) -> HttpResponse {
    let resources: Vec<CatalogEntry> = state
        .gates()
        .into_iter()
        .map(CatalogEntry::from_gate)
        .collect();

    HttpResponse::Ok().json(serde_json::json!({
        "x402Version": x402::X402_VERSION,
        "network": state.config.network.label(),
        "resources": resources,
    }))
}
