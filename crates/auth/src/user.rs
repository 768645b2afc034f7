//! Telegram user carried in the `user` field.

use serde::{Deserialize, Serialize};

use crate::{InitDataError, Result};

/// The user who opened the mini app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUser {
    /// Telegram user id
    pub id: i64,
    /// First name, always present for real users
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
    /// Fields this crate does not model, passed through as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TelegramUser {
    /// First and last name joined by a space.
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// `@username`, if the user has one.
    pub fn mention(&self) -> Option<String> {
        self.username.as_deref().map(|u| format!("@{u}"))
    }
}

/// Parse and validate the JSON in the `user` field.
///
/// `id` must be a positive integer and `first_name` non-empty.
pub fn parse_user(raw: &str) -> Result<TelegramUser> {
    let user: TelegramUser = serde_json::from_str(raw)
        .map_err(|e| InitDataError::InvalidUserPayload(format!("user is not valid JSON: {e}")))?;

    if user.id <= 0 {
        return Err(InitDataError::InvalidUserPayload(format!(
            "user.id must be positive, got {}",
            user.id
        )));
    }
    if user.first_name.is_empty() {
        return Err(InitDataError::InvalidUserPayload(
            "user.first_name is empty".to_string(),
        ));
    }

    Ok(user)
}
