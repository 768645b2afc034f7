//! `auth_date` freshness check.

use crate::{InitDataError, Result};

/// Default maximum age of init-data, in seconds (24 hours).
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

/// Parse `auth_date` and check it is at most `max_age_secs` old at `now`.
///
/// Returns the age in seconds. The check is one-sided: an `auth_date` in the
/// future (negative age) passes.
pub fn check_freshness(auth_date: &str, now: i64, max_age_secs: u64) -> Result<i64> {
    let issued_at: i64 = auth_date.parse().map_err(|e| {
        InitDataError::MalformedAuthDate(format!("auth_date {auth_date:?} is not an integer: {e}"))
    })?;

    let age = now.saturating_sub(issued_at);
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    if age > max_age {
        return Err(InitDataError::StaleAuthDate(format!(
            "auth_date is {age}s old, limit is {max_age_secs}s"
        )));
    }

    Ok(age)
}
