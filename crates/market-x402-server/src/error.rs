use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Errors produced by resource handlers after the gate has let a request through.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Caller-fixable input problem
    #[error("{0}")]
    BadRequest(String),

    /// Upstream API key missing from the environment
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// Upstream provider answered with an error status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ResourceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ResourceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ResourceError::NotConfigured(_) | ResourceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ResourceError::BadRequest(msg) => msg.clone(),
            ResourceError::Upstream { message, .. } => message.clone(),
            ResourceError::NotConfigured(what) => {
                tracing::error!("{what} not configured, check the API key environment variable");
                format!("{what} not configured")
            }
            ResourceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message,
        }))
    }
}
