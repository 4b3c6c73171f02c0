//! Authentication session lifecycle: classification, code requests,
//! verification, cookie-held sessions, and the timers mirrored to the client.

pub mod classifier;
pub mod code_request;
pub mod config;
pub mod countdown;
pub mod rate_limit;
pub mod session_store;
pub mod verification;

use secrecy::SecretString;
use std::time::{SystemTime, UNIX_EPOCH};

/// Access/refresh token pair issued by the backend on successful verification.
///
/// Each token has an independent, server-defined lifetime; the access token is
/// recreated by the refresh middleware without user involvement.
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::now_ms;

    #[test]
    fn now_ms_is_monotonic_enough() {
        let first = now_ms();
        let second = now_ms();
        assert!(second >= first);
        // Sanity: past 2020-01-01 in milliseconds.
        assert!(first > 1_577_836_800_000);
    }
}
