use alloy::primitives::Address;
use url::Url;
use x402::{ChainConfig, DiscoveryMetadata, ExactEvmSchemeServer, NetworkMode, PaymentRequirements};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PRICE: &str = "$0.001";
const DEFAULT_RATE_LIMIT_RPM: u64 = 60;
const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_EXCHANGERATE_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Process-wide configuration, read once at startup.
#[derive(Clone)]
pub struct ServerConfig {
    pub network: NetworkMode,
    pub chain: ChainConfig,
    /// Facilitator used to verify and settle payments
    pub facilitator_url: String,
    /// Wallet that receives every payment
    pub pay_to: Address,
    /// Price per call, e.g. "$0.001"
    pub price: String,
    pub openweather_api_key: Option<String>,
    pub exchangerate_api_key: Option<String>,
    pub openweather_base_url: String,
    pub exchangerate_base_url: String,
    pub port: u16,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u64,
    /// CORS allowed origins (empty = localhost only)
    pub allowed_origins: Vec<String>,
    /// Bearer token required for /metrics
    pub metrics_token: Option<String>,
    /// Serve /metrics without a token when none is configured
    pub public_metrics: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ServerConfig")
            .field("network", &self.network)
            .field("facilitator_url", &self.facilitator_url)
            .field("pay_to", &self.pay_to)
            .field("price", &self.price)
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("exchangerate_api_key", &redact(&self.exchangerate_api_key))
            .field("openweather_base_url", &self.openweather_base_url)
            .field("exchangerate_base_url", &self.exchangerate_base_url)
            .field("port", &self.port)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field("allowed_origins", &self.allowed_origins)
            .field("metrics_token", &redact(&self.metrics_token))
            .field("public_metrics", &self.public_metrics)
            .finish()
    }
}

impl ServerConfig {
    /// Load `.env.local` / `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let network = NetworkMode::from_selector(get("X402_NETWORK").as_deref());
        let chain = ChainConfig::for_mode(network);

        let facilitator_url =
            get("X402_FACILITATOR_URL").unwrap_or_else(|| x402::DEFAULT_FACILITATOR_URL.to_string());
        Url::parse(&facilitator_url).map_err(|_| ConfigError::InvalidUrl(facilitator_url.clone()))?;

        let pay_to = match get("SERVER_WALLET_ADDRESS") {
            Some(raw) => raw
                .parse::<Address>()
                .map_err(|_| ConfigError::InvalidAddress(raw))?,
            None if network == NetworkMode::Mainnet => {
                return Err(ConfigError::MissingRequired("SERVER_WALLET_ADDRESS"));
            }
            None => {
                tracing::warn!(
                    "SERVER_WALLET_ADDRESS not set; testnet payments will be addressed to {}",
                    Address::ZERO
                );
                Address::ZERO
            }
        };

        let price = get("X402_PRICE").unwrap_or_else(|| DEFAULT_PRICE.to_string());

        let openweather_base_url = get("OPENWEATHER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string());
        let exchangerate_base_url = get("EXCHANGERATE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_EXCHANGERATE_BASE_URL.to_string());
        for base in [&openweather_base_url, &exchangerate_base_url] {
            Url::parse(base).map_err(|_| ConfigError::InvalidUrl(base.clone()))?;
        }

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber("PORT", raw))?,
            None => DEFAULT_PORT,
        };

        let rate_limit_rpm = match get("RATE_LIMIT_RPM") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("RATE_LIMIT_RPM", raw))?,
            None => DEFAULT_RATE_LIMIT_RPM,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let public_metrics = get("X402_PUBLIC_METRICS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            network,
            chain,
            facilitator_url,
            pay_to,
            price,
            openweather_api_key: get("OPENWEATHER_API_KEY"),
            exchangerate_api_key: get("EXCHANGERATE_API_KEY"),
            openweather_base_url,
            exchangerate_base_url,
            port,
            rate_limit_rpm,
            allowed_origins,
            metrics_token: get("METRICS_TOKEN"),
            public_metrics,
        })
    }
}

/// What one protected resource costs and where the money goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDescriptor {
    /// Decimal currency string, e.g. "$0.001"
    pub amount: String,
    pub currency: String,
    /// CAIP-2 network identifier
    pub network: String,
    pub pay_to: Address,
}

/// Static description of one payment-gated resource.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub resource: String,
    pub price: PriceDescriptor,
    pub description: String,
    pub mime_type: String,
    pub discovery: Option<DiscoveryMetadata>,
    /// `accepts` entry derived from `price` once at build time.
    pub requirements: PaymentRequirements,
}

/// Builder for a [`GateConfig`]. The price is parsed once, at build time.
pub struct GateConfigBuilder {
    scheme: ExactEvmSchemeServer,
    resource: String,
    pay_to: Address,
    price: String,
    description: String,
    mime_type: String,
    discovery: Option<DiscoveryMetadata>,
}

impl GateConfigBuilder {
    pub fn new(resource: &str, chain: &ChainConfig, pay_to: Address) -> Self {
        Self {
            scheme: ExactEvmSchemeServer::new(chain.clone()),
            resource: resource.to_string(),
            pay_to,
            price: DEFAULT_PRICE.to_string(),
            description: String::new(),
            mime_type: "application/json".to_string(),
            discovery: None,
        }
    }

    pub fn price(mut self, price: &str) -> Self {
        self.price = price.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    pub fn discovery(mut self, discovery: DiscoveryMetadata) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn build(self) -> Result<GateConfig, ConfigError> {
        let requirements = self
            .scheme
            .requirements(&self.price, self.pay_to)
            .map_err(|e| ConfigError::InvalidPrice(format!("{}: {e}", self.price)))?;

        Ok(GateConfig {
            price: PriceDescriptor {
                amount: self.price,
                currency: "USDC".to_string(),
                network: requirements.network.clone(),
                pay_to: self.pay_to,
            },
            resource: self.resource,
            description: self.description,
            mime_type: self.mime_type,
            discovery: self.discovery,
            requirements,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
