//! Unpaid probe of a gated endpoint.

use x402::{PaymentRequiredBody, PaymentRequirements};

use crate::OpsError;

/// What an unpaid request to a gated endpoint returned.
#[derive(Debug)]
pub enum ProbeResult {
    /// 402 with parseable payment requirements.
    PaymentRequired(PaymentRequiredBody),
    /// Anything else; the endpoint is not gated as expected.
    Unexpected { status: u16, body: String },
}

pub async fn probe(http: &reqwest::Client, url: &str) -> Result<ProbeResult, OpsError> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    Ok(classify(status.as_u16(), &text))
}

pub fn classify(status: u16, body: &str) -> ProbeResult {
    if status == 402 {
        if let Ok(parsed) = serde_json::from_str::<PaymentRequiredBody>(body) {
            return ProbeResult::PaymentRequired(parsed);
        }
    }
    ProbeResult::Unexpected {
        status,
        body: body.chars().take(500).collect(),
    }
}

/// One-line summary of an `accepts` entry.
pub fn describe(req: &PaymentRequirements) -> String {
    format!(
        "{} {} ({} units) on {} to {:#x}",
        req.scheme, req.price, req.amount, req.network, req.pay_to
    )
}
