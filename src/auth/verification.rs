//! Code verification: digit collection, the entry guard for the verification
//! screen, and the submit state machine.
//!
//! Collecting -> Submitting -> Verified | Rejected. Verified is terminal (the
//! session is established and the caller navigates away); every rejection
//! returns to Collecting with an attached reason.

use thiserror::Error;
use tracing::error;

use super::classifier::valid_phone;
use super::code_request::CodeRequestRecord;
use super::config::AuthConfig;
use super::rate_limit::RateLimitSignal;
use super::session_store::SessionStore;
use crate::backend::{BackendClient, VerifyReply};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InputRejected {
    #[error("only a single digit is accepted")]
    NotADigit,
    #[error("slot index out of range")]
    OutOfRange,
}

/// The N single-character slots the user types the code into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationAttempt {
    slots: Vec<String>,
}

impl VerificationAttempt {
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            slots: vec![String::new(); length],
        }
    }

    /// Apply one keystroke to one slot. A single ASCII digit fills the slot;
    /// an empty string is a deletion; anything else is rejected at input time
    /// and the slot stays unchanged.
    pub fn enter(&mut self, index: usize, input: &str) -> Result<(), InputRejected> {
        let slot = self.slots.get_mut(index).ok_or(InputRejected::OutOfRange)?;
        if input.is_empty() {
            slot.clear();
            return Ok(());
        }
        if input.len() == 1 && input.chars().all(|c| c.is_ascii_digit()) {
            *slot = input.to_string();
            return Ok(());
        }
        Err(InputRejected::NotADigit)
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|slot| !slot.is_empty())
    }

    /// The machine moves to Submitting the moment every slot is filled and no
    /// local form error is pending; no explicit user action is required.
    #[must_use]
    pub fn should_auto_submit(&self, form_error_pending: bool) -> bool {
        self.is_complete() && !form_error_pending
    }

    /// Concatenate the slots into the code string, once every slot is filled.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        if self.is_complete() {
            Some(self.slots.concat())
        } else {
            None
        }
    }
}

/// Why the verification screen cannot be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionExpired {
    #[error("no pending code request")]
    NoRecord,
    #[error("stored phone fails format validation")]
    InvalidPhone,
    #[error("verification code has expired")]
    CodeExpired,
}

/// A code request that is still live; holds the record the screen counts
/// down from.
#[derive(Clone, Debug)]
pub struct PendingVerification {
    pub record: CodeRequestRecord,
}

/// Guard for entering the verification screen: there must be a pending
/// record, its phone must still look like a phone, and the code must not
/// have outlived the configured lifetime.
pub fn pending_verification(
    store: &SessionStore,
    config: &AuthConfig,
    now_ms: u64,
) -> Result<PendingVerification, SessionExpired> {
    let record = CodeRequestRecord::read(store, config).ok_or(SessionExpired::NoRecord)?;
    if !valid_phone(&record.phone) {
        return Err(SessionExpired::InvalidPhone);
    }
    if !record.is_valid(now_ms, config.code_lifetime_seconds()) {
        return Err(SessionExpired::CodeExpired);
    }
    Ok(PendingVerification { record })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyRejection {
    /// Backend rejected the code; slots are kept for another try.
    WrongCode,
    /// A code is already outstanding for this phone.
    SmsCooldown { cooldown_seconds: u64 },
    /// Starts the second, independent verify-throttle countdown; the submit
    /// control stays disabled until it elapses.
    Throttled { retry_after_seconds: u64 },
    /// Not every slot was filled; nothing was sent.
    IncompleteCode,
    Unexpected,
}

pub enum VerifyOutcome {
    /// Session established and code-request record cleared; the caller
    /// performs the navigation.
    Verified { next: &'static str },
    /// Back to Collecting with a reason.
    Rejected(VerifyRejection),
}

pub struct VerificationMachine<'a> {
    backend: &'a BackendClient,
    config: &'a AuthConfig,
}

impl<'a> VerificationMachine<'a> {
    #[must_use]
    pub fn new(backend: &'a BackendClient, config: &'a AuthConfig) -> Self {
        Self { backend, config }
    }

    /// Submit the collected code for the pending phone.
    pub async fn submit(
        &self,
        store: &mut SessionStore,
        pending: &PendingVerification,
        attempt: &VerificationAttempt,
    ) -> VerifyOutcome {
        let Some(code) = attempt.code() else {
            return VerifyOutcome::Rejected(VerifyRejection::IncompleteCode);
        };

        match self.backend.verify_code(&pending.record.phone, &code).await {
            Ok(VerifyReply::Verified(session)) => {
                store.store_session(&session, self.config);
                CodeRequestRecord::clear(store);
                VerifyOutcome::Verified { next: "/" }
            }
            Ok(VerifyReply::WrongCode) => VerifyOutcome::Rejected(VerifyRejection::WrongCode),
            Ok(VerifyReply::RateLimited(RateLimitSignal::SmsLimit { cooldown_seconds })) => {
                VerifyOutcome::Rejected(VerifyRejection::SmsCooldown { cooldown_seconds })
            }
            Ok(VerifyReply::RateLimited(RateLimitSignal::Throttle {
                retry_after_seconds,
            })) => VerifyOutcome::Rejected(VerifyRejection::Throttled {
                retry_after_seconds,
            }),
            Ok(VerifyReply::RateLimited(RateLimitSignal::None)) => {
                error!("Backend sent 429 without a decodable rate-limit signal");
                VerifyOutcome::Rejected(VerifyRejection::Unexpected)
            }
            Ok(VerifyReply::Unexpected(status)) => {
                error!("Unexpected verify-code status from backend: {status}");
                VerifyOutcome::Rejected(VerifyRejection::Unexpected)
            }
            Err(err) => {
                error!("Code verification failed: {err}");
                VerifyOutcome::Rejected(VerifyRejection::Unexpected)
            }
        }
    }
}
