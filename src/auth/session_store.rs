//! Cookie-backed session store.
//!
//! The only shared mutable state in the subsystem. Values are read from the
//! request `Cookie` header and written back as `Set-Cookie` headers on the
//! response, so a write becomes visible on the *next* request. Last write
//! wins; there is no locking (the refresh middleware's accepted race relies
//! on exactly that).

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use tracing::error;

use super::{config::AuthConfig, Session};

/// Persisted key layout. `requestedCodeTimestamp` and `inputtedPhone` are
/// always set and cleared together.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const REQUESTED_CODE_TIMESTAMP: &str = "requestedCodeTimestamp";
    pub const INPUTTED_PHONE: &str = "inputtedPhone";
}

enum Pending {
    Set {
        key: String,
        value: String,
        ttl_seconds: u64,
    },
    Clear {
        key: String,
    },
}

#[derive(Default)]
pub struct SessionStore {
    values: HashMap<String, String>,
    pending: Vec<Pending>,
}

impl SessionStore {
    /// Build a store snapshot from the request's `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                let trimmed = pair.trim();
                let mut parts = trimmed.splitn(2, '=');
                let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                    continue;
                };
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self {
            values,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Queue a write for the response; reads within this request see it too.
    pub fn set(&mut self, key: &str, value: &str, ttl_seconds: u64) {
        self.values.insert(key.to_string(), value.to_string());
        self.pending.push(Pending::Set {
            key: key.to_string(),
            value: value.to_string(),
            ttl_seconds,
        });
    }

    pub fn clear(&mut self, key: &str) {
        self.values.remove(key);
        self.pending.push(Pending::Clear {
            key: key.to_string(),
        });
    }

    /// Persist a verified token pair. The refresh token is written first so
    /// an access token never lands without a refresh token that can recreate
    /// it.
    pub fn store_session(&mut self, session: &Session, config: &AuthConfig) {
        self.set(
            keys::REFRESH_TOKEN,
            session.refresh_token.expose_secret(),
            config.refresh_token_ttl_seconds(),
        );
        self.set(
            keys::ACCESS_TOKEN,
            session.access_token.expose_secret(),
            config.access_token_ttl_seconds(),
        );
    }

    /// Destroy both tokens (explicit sign-out or refresh rejection).
    pub fn clear_session(&mut self) {
        self.clear(keys::ACCESS_TOKEN);
        self.clear(keys::REFRESH_TOKEN);
    }

    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Render the queued writes as `Set-Cookie` header values.
    #[must_use]
    pub fn set_cookie_headers(&self, secure: bool) -> Vec<HeaderValue> {
        self.pending
            .iter()
            .filter_map(|write| {
                let cookie = match write {
                    Pending::Set {
                        key,
                        value,
                        ttl_seconds,
                    } => format!(
                        "{key}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
                    ),
                    Pending::Clear { key } => {
                        format!("{key}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
                    }
                };
                let cookie = if secure {
                    format!("{cookie}; Secure")
                } else {
                    cookie
                };
                match HeaderValue::from_str(&cookie) {
                    Ok(header) => Some(header),
                    Err(err) => {
                        error!("Failed to encode session cookie: {err}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Append the queued writes to a response header map.
    pub fn apply_to(&self, headers: &mut HeaderMap, secure: bool) {
        for cookie in self.set_cookie_headers(secure) {
            headers.append(SET_COOKIE, cookie);
        }
    }
}
