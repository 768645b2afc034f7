//! Telegram WebApp init-data authentication for the hookah wishlist.
//!
//! This crate provides:
//! - Init-data decoding and data-check-string construction
//! - HMAC-SHA256 verification for payloads from the bot's own mini app
//! - Ed25519 verification for third-party mini apps
//! - `auth_date` freshness and `user` payload validation
//! - A non-failing orchestrator returning a serializable outcome
//!
//! # Example
//!
//! ```
//! use wishlist_auth::{sign_hmac, validate_init_data_at, AuthConfig, InitData};
//!
//! let now = 1_700_000_000;
//! let mut data: InitData = [
//!     ("user", r#"{"id":1,"first_name":"A"}"#),
//!     ("auth_date", "1700000000"),
//! ]
//! .into_iter()
//! .collect();
//! let hash = sign_hmac(&data, "123:ABC").unwrap();
//! data.insert("hash", hash);
//!
//! let outcome = validate_init_data_at(&data.to_query_string(), &AuthConfig::new("123:ABC"), now);
//! assert!(outcome.is_valid());
//! assert_eq!(outcome.user().unwrap().first_name, "A");
//! ```

mod config;
mod ed25519_impl;
mod error;
mod freshness;
mod hmac_impl;
mod method;
mod parse;
mod user;
mod validate;

pub use config::{AuthConfig, TELEGRAM_PUBLIC_KEY_PRODUCTION, TELEGRAM_PUBLIC_KEY_TEST};
pub use ed25519_impl::{bot_id, parse_public_key, sign_ed25519, signed_message, verify_ed25519};
pub use error::{AuthErrorCode, ConfigError, ErrorKind, InitDataError, Result};
pub use freshness::{check_freshness, DEFAULT_MAX_AGE_SECS};
pub use hmac_impl::{secret_key, sign_hmac, verify_hmac, WEB_APP_DATA_KEY};
pub use method::{select_method, VerificationMethod, VERIFICATION_ORDER};
pub use parse::{
    extract_init_data, parse_init_data, InitData, AUTH_DATE_FIELD, HASH_FIELD, LAUNCH_DATA_PARAM,
    SIGNATURE_FIELD, USER_FIELD,
};
pub use user::{parse_user, TelegramUser};
pub use validate::{
    validate_init_data, validate_init_data_at, verify_init_data, verify_init_data_at,
    ValidationOutcome, VerifiedInitData,
};

/// Re-exported so callers can build keys for [`sign_ed25519`] without a
/// direct dependency.
pub use ed25519_dalek::SigningKey;
