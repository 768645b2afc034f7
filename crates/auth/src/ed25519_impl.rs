//! Ed25519 verification for third-party mini apps.
//!
//! Third-party apps cannot know the bot token, so Telegram signs their
//! init-data with a platform key instead. The signed message is
//! `"{bot_id}:WebAppData\n"` followed by the data-check-string built without
//! `hash` and `signature`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::parse::{InitData, HASH_FIELD, SIGNATURE_FIELD};
use crate::{InitDataError, Result};

/// Numeric bot id, i.e. the part of the token before `:`.
pub fn bot_id(bot_token: &str) -> Result<&str> {
    let id = bot_token.split(':').next().unwrap_or_default();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InitDataError::CryptoFailure(
            "bot token does not start with a numeric bot id".to_string(),
        ));
    }
    Ok(id)
}

/// Message Telegram signs for `init_data`.
pub fn signed_message(init_data: &InitData, bot_token: &str) -> Result<String> {
    let bot_id = bot_id(bot_token)?;
    let data_check_string = init_data.data_check_string(&[HASH_FIELD, SIGNATURE_FIELD]);
    Ok(format!("{bot_id}:WebAppData\n{data_check_string}"))
}

/// Parse a hex-encoded 32-byte Ed25519 public key.
pub fn parse_public_key(public_key_hex: &str) -> Result<VerifyingKey> {
    let bytes = hex::decode(public_key_hex.trim())
        .map_err(|e| InitDataError::CryptoFailure(format!("public key is not hex: {e}")))?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| InitDataError::CryptoFailure("public key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| InitDataError::CryptoFailure(format!("invalid public key: {e}")))
}

fn decode_signature(encoded: &str) -> Result<Signature> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim().trim_end_matches('='))
        .map_err(|e| InitDataError::InvalidSignature(format!("signature is not base64url: {e}")))?;
    let bytes: [u8; 64] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| InitDataError::InvalidSignature("signature must be 64 bytes".to_string()))?;
    Ok(Signature::from_bytes(&bytes))
}

/// Verify the `signature` field of `init_data`.
///
/// # Arguments
/// * `init_data` - Decoded payload carrying a `signature` field
/// * `bot_token` - Token whose numeric prefix is the signed bot id
/// * `public_key_hex` - Telegram's Ed25519 key as 64 hex characters
///
/// # Returns
/// `Ok(())` if the signature verifies. `public_key_hex` is `None` when no
/// platform key is configured, which is a [`InitDataError::CryptoFailure`]
/// rather than a mismatch.
pub fn verify_ed25519(
    init_data: &InitData,
    bot_token: &str,
    public_key_hex: Option<&str>,
) -> Result<()> {
    let encoded = init_data.signature().ok_or_else(|| {
        InitDataError::MissingRequiredFields("signature is missing".to_string())
    })?;
    let public_key_hex = public_key_hex.ok_or_else(|| {
        InitDataError::CryptoFailure("Telegram public key is not configured".to_string())
    })?;

    let verifying_key = parse_public_key(public_key_hex)?;
    let message = signed_message(init_data, bot_token)?;
    let signature = decode_signature(encoded)?;

    verifying_key
        .verify(message.as_bytes(), &signature)
        .map_err(|e| InitDataError::InvalidSignature(format!("signature verification failed: {e}")))
}

/// Produce the base64url signature for `init_data` with `signing_key`.
///
/// Only Telegram holds the production key; this exists for tests and local
/// tooling that run against a self-generated key pair.
///
/// # Arguments
/// * `init_data` - Decoded payload; `hash` and `signature` are not signed
/// * `bot_token` - Token whose numeric prefix is the signed bot id
/// * `signing_key` - Private half of the key pair
///
/// # Returns
/// Unpadded base64url signature, ready for the `signature` field
pub fn sign_ed25519(init_data: &InitData, bot_token: &str, signing_key: &SigningKey) -> Result<String> {
    let message = signed_message(init_data, bot_token)?;
    Ok(URL_SAFE_NO_PAD.encode(signing_key.sign(message.as_bytes()).to_bytes()))
}
