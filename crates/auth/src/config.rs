//! Configuration for init-data verification
//!
//! Supports environment-based configuration with sensible defaults.

use std::env;
use std::fmt;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::freshness::DEFAULT_MAX_AGE_SECS;

/// Telegram's Ed25519 public key for third-party validation (production).
pub const TELEGRAM_PUBLIC_KEY_PRODUCTION: &str =
    "e7bf03a2fa4602af4580703d88dda5bb59f32ed8b02a56c187fe7d34caed242d";

/// Telegram's Ed25519 public key for third-party validation (test environment).
pub const TELEGRAM_PUBLIC_KEY_TEST: &str =
    "40055058a4ee38156a06562e52eece92a771bcd8346a8c4615cb7376eddf72ec";

/// Verifier configuration
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    bot_token: String,
    #[serde(default)]
    telegram_public_key: Option<String>,
    #[serde(default = "default_max_age")]
    max_age_secs: u64,
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECS
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("bot_token", &"<redacted>")
            .field("telegram_public_key", &self.telegram_public_key)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl AuthConfig {
    /// HMAC-only configuration with the default 24h window.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            telegram_public_key: None,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `TELEGRAM_BOT_TOKEN`: bot token (required)
    /// - `TELEGRAM_PUBLIC_KEY`: hex Ed25519 key for third-party payloads
    /// - `TELEGRAM_ENV`: `test` selects Telegram's test-environment key when
    ///   `TELEGRAM_PUBLIC_KEY` is unset, anything else the production key
    /// - `INITDATA_MAX_AGE_SECS`: freshness window in seconds
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    ///
    /// `lookup` is asked for the same variables as [`AuthConfig::from_env`],
    /// which is this function over `std::env`.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, or `None` if unset
    ///
    /// # Returns
    /// The validated configuration, or the first missing/invalid variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let telegram_public_key = lookup("TELEGRAM_PUBLIC_KEY").unwrap_or_else(|| {
            match lookup("TELEGRAM_ENV").unwrap_or_default().to_lowercase().as_str() {
                "test" => TELEGRAM_PUBLIC_KEY_TEST.to_string(),
                _ => TELEGRAM_PUBLIC_KEY_PRODUCTION.to_string(),
            }
        });

        let max_age_secs = match lookup("INITDATA_MAX_AGE_SECS") {
            Some(value) => value.parse().map_err(|e| {
                ConfigError::Invalid(format!("INITDATA_MAX_AGE_SECS {value:?}: {e}"))
            })?,
            None => DEFAULT_MAX_AGE_SECS,
        };

        let config = Self {
            bot_token,
            telegram_public_key: Some(telegram_public_key),
            max_age_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style method to set the Ed25519 public key (hex)
    #[must_use]
    pub fn with_public_key(mut self, public_key_hex: impl Into<String>) -> Self {
        self.telegram_public_key = Some(public_key_hex.into());
        self
    }

    /// Use Telegram's production public key
    #[must_use]
    pub fn with_production_public_key(self) -> Self {
        self.with_public_key(TELEGRAM_PUBLIC_KEY_PRODUCTION)
    }

    /// Use Telegram's test-environment public key
    #[must_use]
    pub fn with_test_public_key(self) -> Self {
        self.with_public_key(TELEGRAM_PUBLIC_KEY_TEST)
    }

    /// Builder-style method to set the freshness window
    #[must_use]
    pub fn with_max_age(mut self, max_age_secs: u64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn telegram_public_key(&self) -> Option<&str> {
        self.telegram_public_key.as_deref()
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.trim().is_empty() {
            return Err(ConfigError::Invalid("bot token cannot be empty".to_string()));
        }

        if self.max_age_secs == 0 {
            return Err(ConfigError::Invalid("max age cannot be zero".to_string()));
        }

        if let Some(key) = &self.telegram_public_key {
            if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::Invalid(
                    "Telegram public key must be 64 hex characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<AuthConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AuthConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new("123:ABC");
        assert_eq!(config.bot_token(), "123:ABC");
        assert_eq!(config.telegram_public_key(), None);
        assert_eq!(config.max_age_secs(), 86_400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = AuthConfig::new("123:ABC")
            .with_test_public_key()
            .with_max_age(3_600);
        assert_eq!(config.telegram_public_key(), Some(TELEGRAM_PUBLIC_KEY_TEST));
        assert_eq!(config.max_age_secs(), 3_600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(AuthConfig::new("").validate().is_err());
        assert!(AuthConfig::new("1:A").with_max_age(0).validate().is_err());
        assert!(AuthConfig::new("1:A").with_public_key("abcd").validate().is_err());
        assert!(AuthConfig::new("1:A").with_production_public_key().validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", AuthConfig::new("123:SECRET"));
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AuthConfig = serde_json::from_str(r#"{"bot_token":"123:ABC"}"#).unwrap();
        assert_eq!(config.max_age_secs(), 86_400);
        assert_eq!(config.telegram_public_key(), None);
    }

    #[test]
    fn test_lookup_requires_bot_token() {
        let err = from_vars(&[("TELEGRAM_ENV", "test")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_lookup_defaults_to_production_key() {
        let config = from_vars(&[("TELEGRAM_BOT_TOKEN", "123:ABC")]).unwrap();
        assert_eq!(config.telegram_public_key(), Some(TELEGRAM_PUBLIC_KEY_PRODUCTION));
        assert_eq!(config.max_age_secs(), DEFAULT_MAX_AGE_SECS);

        let config =
            from_vars(&[("TELEGRAM_BOT_TOKEN", "123:ABC"), ("TELEGRAM_ENV", "staging")]).unwrap();
        assert_eq!(config.telegram_public_key(), Some(TELEGRAM_PUBLIC_KEY_PRODUCTION));
    }

    #[test]
    fn test_lookup_test_environment_key() {
        let config =
            from_vars(&[("TELEGRAM_BOT_TOKEN", "123:ABC"), ("TELEGRAM_ENV", "Test")]).unwrap();
        assert_eq!(config.telegram_public_key(), Some(TELEGRAM_PUBLIC_KEY_TEST));
    }

    #[test]
    fn test_lookup_explicit_key_wins() {
        let key = "ab".repeat(32);
        let config = from_vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("TELEGRAM_ENV", "test"),
            ("TELEGRAM_PUBLIC_KEY", &key),
        ])
        .unwrap();
        assert_eq!(config.telegram_public_key(), Some(key.as_str()));
    }

    #[test]
    fn test_lookup_max_age() {
        let config = from_vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("INITDATA_MAX_AGE_SECS", "3600"),
        ])
        .unwrap();
        assert_eq!(config.max_age_secs(), 3_600);

        let err = from_vars(&[
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("INITDATA_MAX_AGE_SECS", "a day"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("INITDATA_MAX_AGE_SECS")));

        let err = from_vars(&[("TELEGRAM_BOT_TOKEN", "123:ABC"), ("INITDATA_MAX_AGE_SECS", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
