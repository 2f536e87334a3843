use alloy::signers::local::PrivateKeySigner;

use crate::OpsError;

/// Parse a hex private key, with or without the `0x` prefix.
pub fn parse_private_key(name: &'static str, raw: &str) -> Result<PrivateKeySigner, OpsError> {
    let trimmed = raw.trim();
    let hex = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        trimmed.to_string()
    } else {
        format!("0x{trimmed}")
    };
    hex.parse().map_err(|_| OpsError::InvalidEnv {
        name,
        reason: "not a 32-byte hex private key".to_string(),
    })
}

/// Hex encoding of a signer's secret key, `0x`-prefixed.
pub fn private_key_hex(signer: &PrivateKeySigner) -> String {
    alloy::hex::encode_prefixed(signer.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_prefix_is_optional() {
        let bare = parse_private_key("BUYER_PRIVATE_KEY", KEY).unwrap();
        let prefixed = parse_private_key("BUYER_PRIVATE_KEY", &format!("0x{KEY}")).unwrap();
        assert_eq!(bare.address(), prefixed.address());
        assert_eq!(
            format!("{:#x}", bare.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_private_key("BUYER_PRIVATE_KEY", "0x1234").unwrap_err();
        assert!(matches!(
            err,
            OpsError::InvalidEnv {
                name: "BUYER_PRIVATE_KEY",
                ..
            }
        ));
    }

    #[test]
    fn test_hex_round_trip() {
        let signer = PrivateKeySigner::random();
        let hex = private_key_hex(&signer);
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        let parsed = parse_private_key("KEY", &hex).unwrap();
        assert_eq!(parsed.address(), signer.address());
    }
}
