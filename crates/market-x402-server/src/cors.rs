//! CORS configuration for the marketplace server.

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

/// Build the CORS middleware.
///
/// An empty list allows `http://localhost` on any port only. `*` allows any origin.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let allowed = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let origin = origin.to_str().unwrap_or("");
            origin_allowed(&allowed, origin)
        })
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-payment"),
            HeaderName::from_static("payment-signature"),
        ])
        .expose_headers(vec![HeaderName::from_static("payment-required")])
        .max_age(3600)
}

fn origin_allowed(allowed: &[String], origin: &str) -> bool {
    if allowed.is_empty() {
        return origin == "http://localhost" || origin.starts_with("http://localhost:");
    }
    allowed.iter().any(|a| a == "*" || a == origin)
}
