//! HMAC-SHA256 verification for first-party mini apps.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::parse::{InitData, HASH_FIELD};
use crate::{InitDataError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Key used to derive the per-bot secret from the bot token.
pub const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

/// HMAC-SHA256 of `message` under `key`.
fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| InitDataError::CryptoFailure(format!("HMAC key rejected: {e}")))?;
    mac.update(message);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    Ok(digest)
}

/// Derive the 32-byte secret key for a bot: `HMAC-SHA256("WebAppData", bot_token)`.
pub fn secret_key(bot_token: &str) -> Result<[u8; 32]> {
    if bot_token.trim().is_empty() {
        return Err(InitDataError::CryptoFailure("bot token is empty".to_string()));
    }
    hmac_sha256(WEB_APP_DATA_KEY, bot_token.as_bytes())
}

/// Compute the lowercase hex hash Telegram would attach to `init_data`.
///
/// The `hash` field itself, if present, is ignored.
///
/// # Arguments
/// * `init_data` - Decoded payload to sign
/// * `bot_token` - Token of the bot the mini app belongs to
///
/// # Returns
/// 64-character lowercase hex digest of the data-check-string
pub fn sign_hmac(init_data: &InitData, bot_token: &str) -> Result<String> {
    let secret = secret_key(bot_token)?;
    let data_check_string = init_data.data_check_string(&[HASH_FIELD]);
    let digest = hmac_sha256(&secret, data_check_string.as_bytes())?;
    Ok(hex::encode(digest))
}

/// Verify the `hash` field of `init_data` against `bot_token`.
///
/// # Arguments
/// * `init_data` - Decoded payload carrying a `hash` field
/// * `bot_token` - Token of the bot the mini app belongs to
///
/// # Returns
/// `Ok(())` on a match, `InvalidSignature` on a mismatch, and
/// `MissingRequiredFields` when there is no `hash`
pub fn verify_hmac(init_data: &InitData, bot_token: &str) -> Result<()> {
    let provided = init_data
        .hash()
        .ok_or_else(|| InitDataError::MissingRequiredFields("hash is missing".to_string()))?;
    let expected = sign_hmac(init_data, bot_token)?;

    if constant_time_compare(expected.as_bytes(), provided.as_bytes()) {
        Ok(())
    } else {
        Err(InitDataError::InvalidSignature("hash does not match".to_string()))
    }
}

/// Byte comparison whose duration does not depend on where the inputs differ.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_init_data;

    const TOKEN: &str = "123:ABC";

    #[test]
    fn test_secret_key_is_hmac_of_token() {
        let secret = secret_key(TOKEN).unwrap();
        let mut mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
        mac.update(TOKEN.as_bytes());
        assert_eq!(secret.as_slice(), mac.finalize().into_bytes().as_slice());
    }

    #[test]
    fn test_sign_hmac_matches_manual_computation() {
        let data = parse_init_data("auth_date=1700000000&user=%7B%22id%22%3A1%7D&hash=ignored");

        let secret = secret_key(TOKEN).unwrap();
        let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
        mac.update(b"auth_date=1700000000\nuser={\"id\":1}");
        let expected = hex::encode(mac.finalize().into_bytes());

        let sig = sign_hmac(&data, TOKEN).unwrap();
        assert_eq!(sig, expected);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_verify_hmac_accepts_own_signature() {
        let mut data = parse_init_data("auth_date=1700000000&query_id=q");
        let sig = sign_hmac(&data, TOKEN).unwrap();
        data.insert(HASH_FIELD, sig);
        assert!(verify_hmac(&data, TOKEN).is_ok());
    }

    #[test]
    fn test_verify_hmac_rejects_other_token() {
        let mut data = parse_init_data("auth_date=1700000000");
        let sig = sign_hmac(&data, TOKEN).unwrap();
        data.insert(HASH_FIELD, sig);
        let err = verify_hmac(&data, "456:DEF").unwrap_err();
        assert!(matches!(err, InitDataError::InvalidSignature(_)));
    }

    #[test]
    fn test_signature_field_is_part_of_hmac_input() {
        let mut data = parse_init_data("auth_date=1700000000&signature=abc");
        let sig = sign_hmac(&data, TOKEN).unwrap();
        data.insert(HASH_FIELD, sig);
        data.insert("signature", "abd");
        assert!(verify_hmac(&data, TOKEN).is_err());
    }

    #[test]
    fn test_empty_token_is_crypto_failure() {
        let data = parse_init_data("auth_date=1&hash=00");
        let err = verify_hmac(&data, "").unwrap_err();
        assert!(matches!(err, InitDataError::CryptoFailure(_)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hi"));
        assert!(constant_time_compare(b"", b""));
    }
}
