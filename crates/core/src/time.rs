//! Timestamp parsing and the clock the scheduler reads "now" from.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::BotError;

/// Naive layouts the game API has been seen to emit. Interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 (`2025-01-02T03:04:05Z`, `...+03:00`) and naive
/// date-times without an offset, which are taken as UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, BotError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| BotError::malformed(format!("invalid timestamp {raw:?}")))
}

/// Parse an optional timestamp field. Empty strings count as absent.
pub fn parse_optional_instant(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, BotError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_instant(s)
            .map(Some)
            .map_err(|e| BotError::malformed(format!("{field}: {e}"))),
    }
}
