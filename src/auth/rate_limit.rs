//! Rate-limit signal decoded once at the HTTP boundary.
//!
//! The backend reports two independent limits on its 429 responses: a
//! per-phone SMS cooldown (`x-rate-limit-type: SMS_LIMIT` plus a JSON
//! `cooldown_time`) and a general request throttle (`Retry-After` header).
//! Everything past this module works with the decoded variant; nothing else
//! inspects raw headers or body fields.

use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;

pub const RATE_LIMIT_TYPE_HEADER: &str = "x-rate-limit-type";
pub const SMS_LIMIT: &str = "SMS_LIMIT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitSignal {
    /// Server enforces a minimum interval between codes for this phone; a
    /// valid code is already outstanding.
    SmsLimit { cooldown_seconds: u64 },
    /// General request-rate limiting, independent of the SMS rule.
    Throttle { retry_after_seconds: u64 },
    None,
}

impl RateLimitSignal {
    /// Decode the signal from a backend response.
    ///
    /// An `SMS_LIMIT` response without a parsable `cooldown_time` degrades to
    /// `Throttle` so callers fall back to the generic wait message.
    #[must_use]
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &Value) -> Self {
        if status != StatusCode::TOO_MANY_REQUESTS {
            return Self::None;
        }

        let limit_type = headers
            .get(RATE_LIMIT_TYPE_HEADER)
            .and_then(|value| value.to_str().ok());

        if limit_type == Some(SMS_LIMIT) {
            if let Some(cooldown_seconds) = body.get("cooldown_time").and_then(Value::as_u64) {
                return Self::SmsLimit { cooldown_seconds };
            }
        }

        let retry_after_seconds = headers
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Self::Throttle {
            retry_after_seconds,
        }
    }
}
