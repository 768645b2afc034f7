//! Verification method selection.
//!
//! Methods are tried in [`VERIFICATION_ORDER`]; the first one whose field is
//! present in the payload is used, and no other method is attempted.

use serde::Serialize;

use crate::config::AuthConfig;
use crate::ed25519_impl::verify_ed25519;
use crate::hmac_impl::verify_hmac;
use crate::parse::{InitData, HASH_FIELD, SIGNATURE_FIELD};
use crate::Result;

/// How a payload was (or will be) verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Platform-signed payload of a third-party mini app
    Ed25519,
    /// Bot-token HMAC of a first-party mini app
    HmacSha256,
}

/// Precedence of verification methods. A `signature` wins over a `hash`.
pub const VERIFICATION_ORDER: [VerificationMethod; 2] =
    [VerificationMethod::Ed25519, VerificationMethod::HmacSha256];

impl VerificationMethod {
    /// Field the method needs in the payload.
    pub fn required_field(&self) -> &'static str {
        match self {
            VerificationMethod::Ed25519 => SIGNATURE_FIELD,
            VerificationMethod::HmacSha256 => HASH_FIELD,
        }
    }

    /// True if the payload carries what this method needs.
    pub fn applies_to(&self, init_data: &InitData) -> bool {
        init_data.contains(self.required_field())
    }

    /// Run this method against the payload.
    pub fn verify(&self, init_data: &InitData, config: &AuthConfig) -> Result<()> {
        match self {
            VerificationMethod::Ed25519 => verify_ed25519(
                init_data,
                config.bot_token(),
                config.telegram_public_key(),
            ),
            VerificationMethod::HmacSha256 => verify_hmac(init_data, config.bot_token()),
        }
    }
}

/// First method in [`VERIFICATION_ORDER`] that applies, if any.
pub fn select_method(init_data: &InitData) -> Option<VerificationMethod> {
    VERIFICATION_ORDER
        .into_iter()
        .find(|method| method.applies_to(init_data))
}
