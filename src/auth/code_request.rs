//! Code requests: the persisted cooldown record and the coordinator that
//! talks to the backend and interprets its rate-limit signals.

use tracing::error;

use super::config::AuthConfig;
use super::rate_limit::RateLimitSignal;
use super::session_store::{keys, SessionStore};
use crate::backend::{BackendClient, CodeRequestReply};

/// The locally-tracked cooldown for an outstanding OTP.
///
/// At most one record exists per browser session; new requests overwrite it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeRequestRecord {
    pub phone: String,
    pub requested_at_ms: u64,
    pub cooldown_seconds: u64,
}

impl CodeRequestRecord {
    /// Record for a code the backend just sent.
    #[must_use]
    pub fn new(phone: &str, now_ms: u64, cooldown_seconds: u64) -> Self {
        Self {
            phone: phone.to_string(),
            requested_at_ms: now_ms,
            cooldown_seconds,
        }
    }

    /// Record derived from an SMS-limit response: the server says
    /// `cooldown_time` seconds remain, so back-compute `requested_at` such
    /// that the locally-tracked remaining time matches the server's.
    #[must_use]
    pub fn from_sms_limit(
        phone: &str,
        now_ms: u64,
        configured_cooldown_seconds: u64,
        cooldown_time_seconds: u64,
    ) -> Self {
        let elapsed_ms = configured_cooldown_seconds
            .saturating_sub(cooldown_time_seconds)
            .saturating_mul(1000);
        Self {
            phone: phone.to_string(),
            requested_at_ms: now_ms.saturating_sub(elapsed_ms),
            cooldown_seconds: configured_cooldown_seconds,
        }
    }

    /// Seconds until another code may be requested. Never negative.
    #[must_use]
    pub fn remaining_cooldown_seconds(&self, now_ms: u64) -> u64 {
        let elapsed_seconds = now_ms.saturating_sub(self.requested_at_ms) / 1000;
        self.cooldown_seconds.saturating_sub(elapsed_seconds)
    }

    /// False once the record's age exceeds the code lifetime, regardless of
    /// phone validity.
    #[must_use]
    pub fn is_valid(&self, now_ms: u64, code_lifetime_seconds: u64) -> bool {
        now_ms.saturating_sub(self.requested_at_ms) <= code_lifetime_seconds.saturating_mul(1000)
    }

    /// Persist the record; timestamp and phone are set together with the code
    /// lifetime as TTL.
    pub fn write(&self, store: &mut SessionStore, config: &AuthConfig) {
        let ttl = config.code_lifetime_seconds();
        store.set(
            keys::REQUESTED_CODE_TIMESTAMP,
            &self.requested_at_ms.to_string(),
            ttl,
        );
        store.set(keys::INPUTTED_PHONE, &self.phone, ttl);
    }

    /// Read the record back. The cooldown is reconstructed from the
    /// configured constant, so record and constant must stay consistent.
    #[must_use]
    pub fn read(store: &SessionStore, config: &AuthConfig) -> Option<Self> {
        let requested_at_ms = store
            .get(keys::REQUESTED_CODE_TIMESTAMP)?
            .parse::<u64>()
            .ok()?;
        let phone = store.get(keys::INPUTTED_PHONE)?.to_string();
        Some(Self {
            phone,
            requested_at_ms,
            cooldown_seconds: config.code_request_cooldown_seconds(),
        })
    }

    /// Drop the record; both keys are cleared together.
    pub fn clear(store: &mut SessionStore) {
        store.clear(keys::REQUESTED_CODE_TIMESTAMP);
        store.clear(keys::INPUTTED_PHONE);
    }
}

pub enum CodeRequestOutcome {
    /// Code sent; a fresh record was written. Proceed to verification.
    Accepted { record: CodeRequestRecord },
    /// A valid code is already outstanding; the back-computed record was
    /// written so the display matches the server. Proceed to verification.
    NeedsCooldownDisplay {
        record: CodeRequestRecord,
        seconds: u64,
    },
    /// General throttle; nothing written, do not navigate to verification.
    Throttled { retry_after_seconds: u64 },
    /// Backend rejected the phone format.
    InvalidPhone,
    /// Anything else; nothing persisted.
    UnexpectedError,
}

pub struct CodeRequestCoordinator<'a> {
    backend: &'a BackendClient,
    config: &'a AuthConfig,
}

impl<'a> CodeRequestCoordinator<'a> {
    #[must_use]
    pub fn new(backend: &'a BackendClient, config: &'a AuthConfig) -> Self {
        Self { backend, config }
    }

    /// Request an OTP for the phone and mirror the backend's cooldown state
    /// into the session store.
    pub async fn request_code(
        &self,
        store: &mut SessionStore,
        phone: &str,
        now_ms: u64,
    ) -> CodeRequestOutcome {
        match self.backend.request_code(phone).await {
            Ok(CodeRequestReply::Sent) => {
                let record = CodeRequestRecord::new(
                    phone,
                    now_ms,
                    self.config.code_request_cooldown_seconds(),
                );
                record.write(store, self.config);
                CodeRequestOutcome::Accepted { record }
            }
            Ok(CodeRequestReply::RateLimited(RateLimitSignal::SmsLimit { cooldown_seconds })) => {
                let record = CodeRequestRecord::from_sms_limit(
                    phone,
                    now_ms,
                    self.config.code_request_cooldown_seconds(),
                    cooldown_seconds,
                );
                record.write(store, self.config);
                let seconds = record.remaining_cooldown_seconds(now_ms);
                CodeRequestOutcome::NeedsCooldownDisplay { record, seconds }
            }
            Ok(CodeRequestReply::RateLimited(RateLimitSignal::Throttle {
                retry_after_seconds,
            })) => CodeRequestOutcome::Throttled {
                retry_after_seconds,
            },
            Ok(CodeRequestReply::RateLimited(RateLimitSignal::None)) => {
                error!("Backend sent 429 without a decodable rate-limit signal");
                CodeRequestOutcome::UnexpectedError
            }
            Ok(CodeRequestReply::InvalidPhone) => CodeRequestOutcome::InvalidPhone,
            Ok(CodeRequestReply::Unexpected(status)) => {
                error!("Unexpected code-request status from backend: {status}");
                CodeRequestOutcome::UnexpectedError
            }
            Err(err) => {
                error!("Code request failed: {err}");
                CodeRequestOutcome::UnexpectedError
            }
        }
    }
}
