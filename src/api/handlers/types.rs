//! Request and response bodies for the auth endpoints.
//!
//! Navigation is data: responses carry a `next` hint and the client owns the
//! actual transition. Alerts and form errors are separate surfaces; a form
//! error sticks to the input, an alert is transient.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::NavbarInfo;

/// User-facing copy, shared by handlers and tests.
pub mod messages {
    pub const INVALID_CREDENTIAL: &str = "Enter a valid phone number or username.";
    pub const INVALID_PHONE: &str = "Enter a valid phone number.";
    pub const INCOMPLETE_CODE: &str = "Enter the complete verification code.";
    pub const DIGITS_ONLY: &str = "The verification code accepts digits only.";
    pub const WRONG_CODE: &str = "The entered code is incorrect.";
    pub const COOLDOWN_ACTIVE: &str = "A code was already sent. Wait before requesting another.";
    pub const THROTTLED: &str = "Too many attempts. Wait and try again.";
    pub const SESSION_EXPIRED: &str = "Your verification session has expired. Sign in again.";
    pub const UNEXPECTED: &str = "Something went wrong. Try again.";
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Phone number or username, as typed.
    pub input: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Where the client goes next: `verify` or `password`.
    pub next: String,
    /// Seconds before another code may be requested; only on the verify path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResendResponse {
    pub cooldown_seconds: u64,
    /// True when a new code went out and previously entered digits are stale.
    pub clear_slots: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VerifyRequest {
    /// One entry per slot, each a single digit.
    pub digits: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FormErrorResponse {
    pub form_error: String,
}

impl FormErrorResponse {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            form_error: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AlertResponse {
    pub alert: String,
}

impl AlertResponse {
    #[must_use]
    pub fn unexpected() -> Self {
        Self {
            alert: messages::UNEXPECTED.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ThrottledResponse {
    pub alert: String,
    pub retry_after_seconds: u64,
    /// Set to `verify_throttle` when the countdown gates submission instead
    /// of resending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CooldownResponse {
    pub alert: String,
    pub cooldown_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RedirectResponse {
    pub next: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl RedirectResponse {
    #[must_use]
    pub fn to(next: &str) -> Self {
        Self {
            next: next.to_string(),
            alert: None,
        }
    }

    #[must_use]
    pub fn to_login() -> Self {
        Self::to("login")
    }

    #[must_use]
    pub fn expired() -> Self {
        Self {
            next: "login".to_string(),
            alert: Some(messages::SESSION_EXPIRED.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NavbarResponse {
    pub phone: String,
    #[serde(rename = "pictureUrl")]
    pub picture_url: Option<String>,
}

impl From<NavbarInfo> for NavbarResponse {
    fn from(info: NavbarInfo) -> Self {
        Self {
            phone: info.phone,
            picture_url: info.picture_url,
        }
    }
}
