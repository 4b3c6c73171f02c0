use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::auth::code_request::CodeRequestRecord;
use crate::auth::session_store::SessionStore;
use crate::auth::verification::SessionExpired;

pub mod health;
pub mod login;
pub mod navbar;
pub mod session;
pub mod types;
pub mod verify;

use types::{messages, AlertResponse, RedirectResponse, ThrottledResponse};

/// 429 with both the machine-readable header and the body the client renders.
pub(crate) fn throttled(retry_after_seconds: u64, timer: Option<&str>) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ThrottledResponse {
            alert: messages::THROTTLED.to_string(),
            retry_after_seconds,
            timer: timer.map(str::to_string),
        }),
    )
        .into_response();
    if let Ok(value) = retry_after_seconds.to_string().parse() {
        response.headers_mut().insert(RETRY_AFTER, value);
    }
    response
}

pub(crate) fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, Json(AlertResponse::unexpected())).into_response()
}

/// 410 with a login hint; drops the stale code-request cookies when any
/// existed. Cookie rendering happens in the refresh middleware.
pub(crate) fn expired_session(store: &mut SessionStore, reason: SessionExpired) -> Response {
    debug!("Verification session expired: {reason}");
    if reason != SessionExpired::NoRecord {
        CodeRequestRecord::clear(store);
    }
    (StatusCode::GONE, Json(RedirectResponse::expired())).into_response()
}
