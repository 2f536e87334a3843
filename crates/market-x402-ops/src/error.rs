#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("{0} is not set (add it to .env.local)")]
    MissingEnv(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    X402(#[from] x402::X402Error),
}
