//! End-to-end init-data validation.
//!
//! [`validate_init_data`] never fails: every error is folded into a
//! [`ValidationOutcome`] so HTTP middleware can map it straight to a 401.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use wishlist_telemetry::{metrics, Timer};

use crate::config::AuthConfig;
use crate::error::ErrorKind;
use crate::freshness::check_freshness;
use crate::method::{select_method, VerificationMethod};
use crate::parse::{parse_init_data, InitData};
use crate::user::{parse_user, TelegramUser};
use crate::{InitDataError, Result};

/// A payload that passed every check.
#[derive(Debug, Clone)]
pub struct VerifiedInitData {
    /// All decoded fields, including `hash`/`signature`
    pub init_data: InitData,
    pub user: TelegramUser,
    pub method: VerificationMethod,
    /// Seconds between `auth_date` and the check; negative for future dates
    pub age_secs: i64,
}

/// Result of [`validate_init_data`].
///
/// Serializes to `{"valid": true, "user": {...}}` or
/// `{"valid": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Authenticated
    Valid {
        user: TelegramUser,
        method: VerificationMethod,
    },
    /// Rejected
    Invalid { error: InitDataError },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    pub fn user(&self) -> Option<&TelegramUser> {
        match self {
            ValidationOutcome::Valid { user, .. } => Some(user),
            ValidationOutcome::Invalid { .. } => None,
        }
    }

    /// Method used for an accepted payload.
    pub fn method(&self) -> Option<VerificationMethod> {
        match self {
            ValidationOutcome::Valid { method, .. } => Some(*method),
            ValidationOutcome::Invalid { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&InitDataError> {
        match self {
            ValidationOutcome::Valid { .. } => None,
            ValidationOutcome::Invalid { error } => Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(InitDataError::kind)
    }

    /// Convert back into a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<TelegramUser> {
        match self {
            ValidationOutcome::Valid { user, .. } => Ok(user),
            ValidationOutcome::Invalid { error } => Err(error),
        }
    }
}

impl From<Result<VerifiedInitData>> for ValidationOutcome {
    fn from(result: Result<VerifiedInitData>) -> Self {
        match result {
            Ok(verified) => ValidationOutcome::Valid {
                user: verified.user,
                method: verified.method,
            },
            Err(error) => ValidationOutcome::Invalid { error },
        }
    }
}

impl Serialize for ValidationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationOutcome", 2)?;
        match self {
            ValidationOutcome::Valid { user, .. } => {
                state.serialize_field("valid", &true)?;
                state.serialize_field("user", user)?;
            }
            ValidationOutcome::Invalid { error } => {
                state.serialize_field("valid", &false)?;
                state.serialize_field("error", &error.to_string())?;
            }
        }
        state.end()
    }
}

/// Run every check against `raw` at Unix time `now`.
///
/// Order: required fields, freshness, signature, user payload. The first
/// failing step decides the error.
pub fn verify_init_data_at(raw: &str, config: &AuthConfig, now: i64) -> Result<VerifiedInitData> {
    let init_data = parse_init_data(raw);

    let method = select_method(&init_data);
    let (Some(method), Some(auth_date)) = (method, init_data.auth_date()) else {
        return Err(InitDataError::MissingRequiredFields(missing_fields(&init_data)));
    };

    let age_secs = check_freshness(auth_date, now, config.max_age_secs())?;

    method.verify(&init_data, config)?;

    let user_raw = init_data
        .user_raw()
        .ok_or_else(|| InitDataError::InvalidUserPayload("user is missing".to_string()))?;
    let user = parse_user(user_raw)?;

    Ok(VerifiedInitData {
        init_data,
        user,
        method,
        age_secs,
    })
}

/// [`verify_init_data_at`] against the current wall clock.
pub fn verify_init_data(raw: &str, config: &AuthConfig) -> Result<VerifiedInitData> {
    verify_init_data_at(raw, config, chrono::Utc::now().timestamp())
}

/// Validate `raw` at Unix time `now`, recording the outcome in telemetry.
pub fn validate_init_data_at(raw: &str, config: &AuthConfig, now: i64) -> ValidationOutcome {
    let timer = Timer::start("initdata.validate_ms");
    let outcome = ValidationOutcome::from(verify_init_data_at(raw, config, now));
    timer.stop();

    match &outcome {
        ValidationOutcome::Valid { user, method } => {
            metrics().increment("initdata.valid");
            tracing::debug!(user_id = user.id, method = ?method, "Init data accepted");
        }
        ValidationOutcome::Invalid { error } => {
            let kind = error.kind();
            metrics().increment(&format!("initdata.invalid.{kind}"));
            tracing::warn!(kind = %kind, error = %error, "Init data rejected");
        }
    }

    outcome
}

/// Validate `raw` against the current wall clock.
pub fn validate_init_data(raw: &str, config: &AuthConfig) -> ValidationOutcome {
    validate_init_data_at(raw, config, chrono::Utc::now().timestamp())
}

fn missing_fields(init_data: &InitData) -> String {
    let mut missing = Vec::new();
    if select_method(init_data).is_none() {
        missing.push("hash or signature");
    }
    if init_data.auth_date().is_none() {
        missing.push("auth_date");
    }
    missing.join(", ")
}
