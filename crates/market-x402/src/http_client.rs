use crate::constants::PAYMENT_HEADER;
use crate::{
    encode_payment, PaymentRequiredBody, PaymentRequirements, SchemeClient, X402Error,
    SCHEME_NAME,
};

/// HTTP client that automatically handles 402 payment responses.
///
/// On a 402 it parses the payment requirements, signs an authorization with
/// the provided [`SchemeClient`], and retries once with the payment header.
/// The paid response is returned as the server sent it; settlement proof is
/// the on-chain transfer, not a response header.
pub struct X402Client<S: SchemeClient> {
    http: reqwest::Client,
    scheme: S,
}

/// Outcome of a paid fetch.
pub struct PaidResponse {
    pub response: reqwest::Response,
    /// Requirements that were paid, if the first attempt returned 402.
    pub paid: Option<PaymentRequirements>,
}

impl<S: SchemeClient> X402Client<S> {
    pub fn new(scheme: S) -> Result<Self, X402Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| X402Error::HttpError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, scheme })
    }

    pub fn with_http_client(scheme: S, http: reqwest::Client) -> Self {
        Self { http, scheme }
    }

    /// GET `url`, paying once if the server asks for it.
    pub async fn fetch(&self, url: &str) -> Result<PaidResponse, X402Error> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| X402Error::HttpError(format!("request failed: {e}")))?;

        if resp.status() != reqwest::StatusCode::PAYMENT_REQUIRED {
            return Ok(PaidResponse {
                response: resp,
                paid: None,
            });
        }

        let body: PaymentRequiredBody = resp
            .json()
            .await
            .map_err(|e| X402Error::HttpError(format!("failed to parse 402 body: {e}")))?;

        let requirements = select_requirements(&body)?.clone();
        let payload = self
            .scheme
            .create_payment_payload(body.x402_version, &requirements)
            .await?;
        let encoded = encode_payment(&payload)?;

        let resp = self
            .http
            .get(url)
            .header(PAYMENT_HEADER, encoded)
            .send()
            .await
            .map_err(|e| X402Error::HttpError(format!("paid request failed: {e}")))?;

        Ok(PaidResponse {
            response: resp,
            paid: Some(requirements),
        })
    }
}

/// Pick the first `accepts` entry this client can pay.
pub fn select_requirements(body: &PaymentRequiredBody) -> Result<&PaymentRequirements, X402Error> {
    body.accepts
        .iter()
        .find(|r| r.scheme == SCHEME_NAME)
        .ok_or_else(|| {
            X402Error::UnsupportedScheme(format!(
                "no supported scheme in {:?}",
                body.accepts.iter().map(|r| &r.scheme).collect::<Vec<_>>()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn requirement(scheme: &str) -> PaymentRequirements {
        PaymentRequirements {
            scheme: scheme.to_string(),
            network: "eip155:84532".to_string(),
            price: "$0.001".to_string(),
            amount: "1000".to_string(),
            asset: Address::ZERO,
            pay_to: Address::ZERO,
            max_timeout_seconds: 60,
            extra: None,
        }
    }

    fn body(accepts: Vec<PaymentRequirements>) -> PaymentRequiredBody {
        PaymentRequiredBody {
            x402_version: 2,
            error: None,
            accepts,
            description: None,
            mime_type: None,
            extensions: None,
        }
    }

    #[test]
    fn test_selects_exact_scheme() {
        let b = body(vec![requirement("upto"), requirement("exact")]);
        assert_eq!(select_requirements(&b).unwrap().scheme, "exact");
    }

    #[test]
    fn test_no_matching_scheme() {
        let b = body(vec![requirement("upto")]);
        assert!(matches!(
            select_requirements(&b),
            Err(X402Error::UnsupportedScheme(_))
        ));
    }
}
