use std::sync::Arc;

use crate::config::{ConfigError, ServerConfig};
use crate::gate::{PaymentGate, ReceiptSink};
use crate::providers::UpstreamClient;
use crate::routes;
use crate::verifier::PaymentVerifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub upstream: UpstreamClient,
    pub weather_gate: PaymentGate,
    pub exchange_gate: PaymentGate,
}

impl AppState {
    /// Build every payment gate from `config`. Prices are validated here, once.
    pub fn new(config: ServerConfig, verifier: Arc<dyn PaymentVerifier>) -> Result<Self, ConfigError> {
        let upstream = UpstreamClient::new().map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Self::with_upstream(config, verifier, upstream)
    }

    pub fn with_upstream(
        config: ServerConfig,
        verifier: Arc<dyn PaymentVerifier>,
        upstream: UpstreamClient,
    ) -> Result<Self, ConfigError> {
        let weather_gate = PaymentGate::new(
            routes::weather::gate_config(&config)?,
            config.network,
            verifier.clone(),
        );
        let exchange_gate = PaymentGate::new(
            routes::exchange::gate_config(&config)?,
            config.network,
            verifier,
        );

        Ok(Self {
            config: Arc::new(config),
            upstream,
            weather_gate,
            exchange_gate,
        })
    }

    /// Attach an audit sink to every gate.
    pub fn with_receipt_sink(mut self, sink: Arc<dyn ReceiptSink>) -> Self {
        self.weather_gate = self.weather_gate.with_receipt_sink(sink.clone());
        self.exchange_gate = self.exchange_gate.with_receipt_sink(sink);
        self
    }

    pub fn gates(&self) -> [&PaymentGate; 2] {
        [&self.weather_gate, &self.exchange_gate]
    }
}
