//! Token refresh at the request boundary.
//!
//! Every request passes through [`token_refresh`] before routing. When the
//! access token cookie is gone but a refresh token survives, the middleware
//! exchanges it for a new access token and re-sets the cookie on the response.
//! Concurrent requests may race here; each exchange yields a valid token and
//! the last `Set-Cookie` wins, so the race is accepted rather than locked
//! away. Only an explicit 401 from the backend destroys the session; a
//! transport failure leaves both cookies untouched so a later request can
//! retry.
//!
//! The middleware owns the request's [`SessionStore`]: handlers mutate the
//! shared store through request extensions and the middleware renders every
//! queued write as `Set-Cookie` headers once, after the handler ran. Queue
//! order is preserved, so a handler's clear always lands after a refresh
//! performed here.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::handlers::types::RedirectResponse;
use super::GateState;
use crate::auth::session_store::{keys, SessionStore};
use crate::backend::RefreshReply;

/// The per-request session store, shared between this middleware and the
/// handler it wraps.
pub type SharedStore = Arc<Mutex<SessionStore>>;

/// What the interception decided; handlers read it from request extensions.
#[derive(Clone, Default)]
pub struct AuthContext {
    access_token: Option<SecretString>,
}

impl AuthContext {
    #[must_use]
    pub fn authenticated(access_token: SecretString) -> Self {
        Self {
            access_token: Some(access_token),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }
}

/// Opportunistic refresh: runs on every request, acts only when the access
/// token is missing and a refresh token is present.
pub async fn token_refresh(
    State(state): State<Arc<GateState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut store = SessionStore::from_headers(request.headers());

    let context = if let Some(access) = store.get(keys::ACCESS_TOKEN) {
        AuthContext::authenticated(SecretString::from(access.to_string()))
    } else if let Some(refresh_token) = store.get(keys::REFRESH_TOKEN).map(str::to_string) {
        match state.backend.refresh(&refresh_token).await {
            Ok(RefreshReply::Refreshed(access)) => {
                debug!("Access token refreshed");
                store.set(
                    keys::ACCESS_TOKEN,
                    access.expose_secret(),
                    state.config.access_token_ttl_seconds(),
                );
                AuthContext::authenticated(access)
            }
            Ok(RefreshReply::Rejected) => {
                // The refresh token itself is dead; nothing left to salvage.
                store.clear_session();
                AuthContext::anonymous()
            }
            Ok(RefreshReply::Unexpected(status)) => {
                error!("Unexpected refresh status from backend: {status}");
                AuthContext::anonymous()
            }
            Err(err) => {
                error!("Token refresh failed: {err}");
                AuthContext::anonymous()
            }
        }
    } else {
        AuthContext::anonymous()
    };

    let store: SharedStore = Arc::new(Mutex::new(store));
    request.extensions_mut().insert(context);
    request.extensions_mut().insert(store.clone());

    let mut response = next.run(request).await;

    let store = store.lock().await;
    if store.has_pending_writes() {
        store.apply_to(response.headers_mut(), state.config.session_cookie_secure());
    }
    response
}

/// Route guard for protected endpoints. 401 carries a `next` hint instead of
/// an HTTP redirect; the client owns navigation.
pub async fn require_auth(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if authenticated {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, Json(RedirectResponse::to_login())).into_response()
    }
}
