use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::eip712::{encode_signature_hex, random_nonce, signing_hash, usdc_domain};
use crate::{
    ChainConfig, ExactEvmAuthorization, ExactEvmPayload, PaymentPayload, PaymentRequirements,
    SchemeClient, TransferWithAuthorization, X402Error, SCHEME_NAME,
};

/// Buyer-side `exact` scheme: signs EIP-3009 authorizations with a local key.
pub struct ExactEvmSchemeClient {
    signer: PrivateKeySigner,
}

impl ExactEvmSchemeClient {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

impl SchemeClient for ExactEvmSchemeClient {
    async fn create_payment_payload(
        &self,
        x402_version: u32,
        requirements: &PaymentRequirements,
    ) -> Result<PaymentPayload, X402Error> {
        if requirements.scheme != SCHEME_NAME {
            return Err(X402Error::UnsupportedScheme(requirements.scheme.clone()));
        }
        let config = ChainConfig::for_network(&requirements.network).ok_or_else(|| {
            X402Error::ConfigError(format!("unknown network {}", requirements.network))
        })?;

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| X402Error::ConfigError(format!("system time error: {e}")))?
            .as_secs();
        // Backdate slightly to tolerate clock skew against the chain.
        let valid_after = now.saturating_sub(600);
        let valid_before = now + requirements.max_timeout_seconds;

        let value = requirements
            .amount
            .parse::<U256>()
            .map_err(|e| X402Error::InvalidPayment(format!("invalid amount: {e}")))?;
        let nonce = random_nonce();

        let auth = TransferWithAuthorization {
            from: self.signer.address(),
            to: requirements.pay_to,
            value,
            validAfter: U256::from(valid_after),
            validBefore: U256::from(valid_before),
            nonce,
        };

        let domain = usdc_domain(
            &config,
            requirements.asset,
            requirements.domain_name(),
            requirements.domain_version(),
        );
        let sig = self
            .signer
            .sign_hash_sync(&signing_hash(&auth, &domain))
            .map_err(|e| X402Error::SignatureError(format!("signing failed: {e}")))?;

        let exact = ExactEvmPayload {
            signature: encode_signature_hex(&sig),
            authorization: ExactEvmAuthorization {
                from: self.signer.address(),
                to: requirements.pay_to,
                value: requirements.amount.clone(),
                valid_after: valid_after.to_string(),
                valid_before: valid_before.to_string(),
                nonce: nonce.to_string(),
            },
        };

        Ok(PaymentPayload {
            x402_version,
            scheme: requirements.scheme.clone(),
            network: requirements.network.clone(),
            payload: serde_json::to_value(exact)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eip712::recover_signer;
    use crate::{ExactEvmSchemeServer, NetworkMode};
    use alloy::primitives::FixedBytes;

    fn requirements() -> PaymentRequirements {
        ExactEvmSchemeServer::new(ChainConfig::for_mode(NetworkMode::Testnet))
            .requirements("$0.001", Address::repeat_byte(0x11))
            .unwrap()
    }

    #[tokio::test]
    async fn test_payload_signature_recovers_to_buyer() {
        let signer = PrivateKeySigner::random();
        let client = ExactEvmSchemeClient::new(signer.clone());
        let req = requirements();

        let payload = client.create_payment_payload(2, &req).await.unwrap();
        assert_eq!(payload.scheme, "exact");
        assert_eq!(payload.network, "eip155:84532");

        let exact: ExactEvmPayload = serde_json::from_value(payload.payload).unwrap();
        assert_eq!(exact.authorization.from, signer.address());
        assert_eq!(exact.authorization.to, req.pay_to);
        assert_eq!(exact.authorization.value, "1000");
        assert_eq!(exact.signature.len(), 132);

        let auth = TransferWithAuthorization {
            from: exact.authorization.from,
            to: exact.authorization.to,
            value: U256::from(1000u64),
            validAfter: exact.authorization.valid_after.parse().unwrap(),
            validBefore: exact.authorization.valid_before.parse().unwrap(),
            nonce: exact.authorization.nonce.parse::<FixedBytes<32>>().unwrap(),
        };
        let config = ChainConfig::for_mode(NetworkMode::Testnet);
        let domain = usdc_domain(&config, req.asset, Some("USDC"), Some("2"));
        let sig = alloy::hex::decode(exact.signature.trim_start_matches("0x")).unwrap();
        assert_eq!(recover_signer(&auth, &domain, &sig).unwrap(), signer.address());
    }

    #[tokio::test]
    async fn test_rejects_foreign_scheme() {
        let client = ExactEvmSchemeClient::new(PrivateKeySigner::random());
        let mut req = requirements();
        req.scheme = "upto".to_string();
        let err = client.create_payment_payload(2, &req).await.unwrap_err();
        assert!(matches!(err, X402Error::UnsupportedScheme(_)));
    }
}
