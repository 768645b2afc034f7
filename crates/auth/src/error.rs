//! Error types for init-data verification.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for init-data operations.
pub type Result<T> = std::result::Result<T, InitDataError>;

/// Errors that can occur while verifying Telegram WebApp init-data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitDataError {
    /// `hash`/`signature` or `auth_date` absent from the payload
    #[error("Missing required fields: {0}")]
    MissingRequiredFields(String),

    /// `auth_date` is not an integer
    #[error("Malformed auth_date: {0}")]
    MalformedAuthDate(String),

    /// `auth_date` is older than the allowed window
    #[error("Stale auth_date: {0}")]
    StaleAuthDate(String),

    /// The hash or signature did not match
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// The check could not be executed (bad key material, backend error)
    #[error("Crypto failure: {0}")]
    CryptoFailure(String),

    /// The `user` field is missing, malformed or incomplete
    #[error("Invalid user payload: {0}")]
    InvalidUserPayload(String),
}

/// Stable classification of an [`InitDataError`], used for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`InitDataError::MissingRequiredFields`]
    MissingRequiredFields,
    /// See [`InitDataError::MalformedAuthDate`]
    MalformedAuthDate,
    /// See [`InitDataError::StaleAuthDate`]
    StaleAuthDate,
    /// See [`InitDataError::InvalidSignature`]
    InvalidSignature,
    /// See [`InitDataError::CryptoFailure`]
    CryptoFailure,
    /// See [`InitDataError::InvalidUserPayload`]
    InvalidUserPayload,
}

impl ErrorKind {
    /// Snake-case label, stable across releases.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredFields => "missing_required_fields",
            ErrorKind::MalformedAuthDate => "malformed_auth_date",
            ErrorKind::StaleAuthDate => "stale_auth_date",
            ErrorKind::InvalidSignature => "invalid_signature",
            ErrorKind::CryptoFailure => "crypto_failure",
            ErrorKind::InvalidUserPayload => "invalid_user_payload",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code for integration with the workspace error codes.
/// Range: 11xxx for auth errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// Missing hash/signature or auth_date
    MissingRequiredFields = 11001,
    /// auth_date not an integer
    MalformedAuthDate = 11002,
    /// auth_date too old
    StaleAuthDate = 11003,
    /// Signature mismatch
    InvalidSignature = 11004,
    /// Crypto backend or key material failure
    CryptoFailure = 11005,
    /// Bad user JSON
    InvalidUserPayload = 11006,
}

impl InitDataError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InitDataError::MissingRequiredFields(_) => ErrorKind::MissingRequiredFields,
            InitDataError::MalformedAuthDate(_) => ErrorKind::MalformedAuthDate,
            InitDataError::StaleAuthDate(_) => ErrorKind::StaleAuthDate,
            InitDataError::InvalidSignature(_) => ErrorKind::InvalidSignature,
            InitDataError::CryptoFailure(_) => ErrorKind::CryptoFailure,
            InitDataError::InvalidUserPayload(_) => ErrorKind::InvalidUserPayload,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> AuthErrorCode {
        match self.kind() {
            ErrorKind::MissingRequiredFields => AuthErrorCode::MissingRequiredFields,
            ErrorKind::MalformedAuthDate => AuthErrorCode::MalformedAuthDate,
            ErrorKind::StaleAuthDate => AuthErrorCode::StaleAuthDate,
            ErrorKind::InvalidSignature => AuthErrorCode::InvalidSignature,
            ErrorKind::CryptoFailure => AuthErrorCode::CryptoFailure,
            ErrorKind::InvalidUserPayload => AuthErrorCode::InvalidUserPayload,
        }
    }
}

/// Errors raised while building an [`AuthConfig`](crate::AuthConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// A value is present but unusable
    #[error("Configuration error: {0}")]
    Invalid(String),
}
