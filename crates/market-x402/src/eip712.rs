//! EIP-712 helpers for USDC `transferWithAuthorization` (EIP-3009).
//!
//! - [`usdc_domain`] builds the token's signing domain
//! - [`signing_hash`] computes the digest a buyer signs
//! - [`recover_signer`] recovers the signer from a 65-byte signature
//! - [`random_nonce`] produces a fresh 32-byte authorization nonce

use alloy::primitives::{keccak256, Address, FixedBytes, Signature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

use crate::{ChainConfig, TransferWithAuthorization, X402Error};

/// Signing domain of the USDC contract at `token`.
///
/// `name`/`version` override the chain defaults when the seller advertised
/// them in the requirements' `extra` field.
pub fn usdc_domain(
    config: &ChainConfig,
    token: Address,
    name: Option<&str>,
    version: Option<&str>,
) -> Eip712Domain {
    Eip712Domain {
        name: Some(Cow::Owned(
            name.unwrap_or(&config.eip712_domain_name).to_string(),
        )),
        version: Some(Cow::Owned(
            version.unwrap_or(&config.eip712_domain_version).to_string(),
        )),
        chain_id: Some(U256::from(config.chain_id)),
        verifying_contract: Some(token),
        salt: None,
    }
}

pub fn signing_hash(auth: &TransferWithAuthorization, domain: &Eip712Domain) -> B256 {
    auth.eip712_signing_hash(domain)
}

/// Recover the address that signed `auth` under `domain`.
pub fn recover_signer(
    auth: &TransferWithAuthorization,
    domain: &Eip712Domain,
    signature_bytes: &[u8],
) -> Result<Address, X402Error> {
    if signature_bytes.len() != 65 {
        return Err(X402Error::SignatureError(format!(
            "signature must be 65 bytes, got {}",
            signature_bytes.len()
        )));
    }
    let sig = Signature::from_raw(signature_bytes)
        .map_err(|e| X402Error::SignatureError(format!("invalid signature: {e}")))?;
    sig.recover_address_from_prehash(&signing_hash(auth, domain))
        .map_err(|e| X402Error::SignatureError(format!("recovery failed: {e}")))
}

/// Random 32-byte nonce (keccak256 of 32 bytes from the thread CSPRNG).
pub fn random_nonce() -> FixedBytes<32> {
    let mut bytes = [0u8; 32];
    rand::fill(&mut bytes);
    keccak256(bytes)
}

/// 0x-prefixed hex of the 65-byte signature (v = 27/28).
pub fn encode_signature_hex(sig: &Signature) -> String {
    format!("0x{}", alloy::hex::encode(sig.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkMode;
    use alloy::signers::local::PrivateKeySigner;
    use alloy::signers::SignerSync;

    fn sample_auth(from: Address) -> TransferWithAuthorization {
        TransferWithAuthorization {
            from,
            to: Address::ZERO,
            value: U256::from(1000u64),
            validAfter: U256::ZERO,
            validBefore: U256::from(u64::MAX),
            nonce: FixedBytes::ZERO,
        }
    }

    #[test]
    fn test_sign_and_recover() {
        let signer = PrivateKeySigner::random();
        let config = ChainConfig::for_mode(NetworkMode::Testnet);
        let domain = usdc_domain(&config, config.usdc, None, None);
        let auth = sample_auth(signer.address());

        let sig = signer.sign_hash_sync(&signing_hash(&auth, &domain)).unwrap();
        let hex = encode_signature_hex(&sig);
        let bytes = alloy::hex::decode(hex.trim_start_matches("0x")).unwrap();

        assert_eq!(recover_signer(&auth, &domain, &bytes).unwrap(), signer.address());
    }

    #[test]
    fn test_domain_override_changes_digest() {
        let config = ChainConfig::for_mode(NetworkMode::Testnet);
        let auth = sample_auth(Address::ZERO);
        let default = usdc_domain(&config, config.usdc, None, None);
        let renamed = usdc_domain(&config, config.usdc, Some("USD Coin"), None);
        assert_ne!(signing_hash(&auth, &default), signing_hash(&auth, &renamed));
    }

    #[test]
    fn test_short_signature_rejected() {
        let config = ChainConfig::default();
        let domain = usdc_domain(&config, config.usdc, None, None);
        let err = recover_signer(&sample_auth(Address::ZERO), &domain, &[0u8; 10]).unwrap_err();
        assert!(err.to_string().contains("65 bytes"));
    }

    #[test]
    fn test_random_nonce_is_unique() {
        assert_ne!(random_nonce(), random_nonce());
    }
}
