use crate::constants::{DEFAULT_MAX_TIMEOUT_SECONDS, SCHEME_NAME};
use crate::{ChainConfig, PaymentRequirements, SchemeServer, X402Error};
use alloy::primitives::Address;

/// Seller-side `exact` scheme for USDC on Base.
#[derive(Debug, Clone, Default)]
pub struct ExactEvmSchemeServer {
    config: ChainConfig,
}

impl ExactEvmSchemeServer {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.config
    }

    /// Build the `accepts` entry for a resource priced at `price`, paid to `pay_to`.
    pub fn requirements(
        &self,
        price: &str,
        pay_to: Address,
    ) -> Result<PaymentRequirements, X402Error> {
        let (amount, asset) = self.parse_price(price)?;
        Ok(PaymentRequirements {
            scheme: SCHEME_NAME.to_string(),
            network: self.config.network.clone(),
            price: price.to_string(),
            amount,
            asset,
            pay_to,
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
            extra: Some(serde_json::json!({
                "name": self.config.eip712_domain_name,
                "version": self.config.eip712_domain_version,
            })),
        })
    }
}

impl SchemeServer for ExactEvmSchemeServer {
    fn parse_price(&self, price: &str) -> Result<(String, Address), X402Error> {
        let units = to_token_units(price, self.config.token_decimals)?;
        Ok((units.to_string(), self.config.usdc))
    }
}

/// Convert a dollar string into atomic token units with integer arithmetic only.
///
/// `"$0.001"` with 6 decimals is `1000`. Currency symbols and separators are
/// ignored; digits past the token precision are truncated.
pub fn to_token_units(price: &str, decimals: u32) -> Result<u64, X402Error> {
    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return Err(X402Error::InvalidPrice(format!(
            "'{price}' has no numeric content"
        )));
    }

    let overflow = || X402Error::InvalidPrice(format!("'{price}' overflows"));
    let parse = |digits: &str, part: &str| -> Result<u64, X402Error> {
        if digits.is_empty() {
            return Ok(0);
        }
        digits
            .parse::<u64>()
            .map_err(|e| X402Error::InvalidPrice(format!("'{price}' {part}: {e}")))
    };

    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let precision = decimals as usize;
    let fraction = &fraction[..fraction.len().min(precision)];

    let whole_units = parse(whole, "integer part")?
        .checked_mul(10u64.pow(decimals))
        .ok_or_else(overflow)?;
    let fraction_units = parse(fraction, "fractional part")?
        .checked_mul(10u64.pow((precision - fraction.len()) as u32))
        .ok_or_else(overflow)?;

    whole_units.checked_add(fraction_units).ok_or_else(overflow)
}
