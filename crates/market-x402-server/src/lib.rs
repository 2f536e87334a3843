//! Pay-per-call API marketplace: weather and exchange-rate data behind x402
//! payment gates.
//!
//! Every paid route runs through a [`PaymentGate`](gate::PaymentGate), which
//! consults a [`PaymentVerifier`](verifier::PaymentVerifier) and either answers
//! 402 with payment requirements or hands the request to the resource handler.
//!
//! # Modules
//!
//! - [`config`]: environment configuration and per-resource [`GateConfig`](config::GateConfig)
//! - [`verifier`]: facilitator-backed payment verification
//! - [`gate`]: the gating decision ([`disposition`](gate::disposition)) and [`PaymentGate`](gate::PaymentGate)
//! - [`providers`]: upstream weather and exchange-rate clients
//! - [`routes`]: HTTP handlers
//! - [`metrics`]: Prometheus counters for gate decisions and upstream calls

pub mod config;
pub mod cors;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod providers;
pub mod routes;
pub mod state;
pub mod verifier;

pub use config::{ConfigError, GateConfig, GateConfigBuilder, PriceDescriptor, ServerConfig};
pub use error::ResourceError;
pub use gate::{disposition, Disposition, PaymentGate, ReceiptSink, BYPASS_REASON_CODE};
pub use state::AppState;
pub use verifier::{
    FacilitatorVerifier, PaymentVerifier, Receipt, VerificationOutcome, VerifierError,
};
