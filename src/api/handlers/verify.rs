use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

use super::types::{
    messages, CooldownResponse, FormErrorResponse, RedirectResponse, ThrottledResponse,
    VerifyRequest,
};
use super::{bad_gateway, expired_session, throttled};
use crate::api::refresh::SharedStore;
use crate::api::GateState;
use crate::auth::countdown::VerifyTimers;
use crate::auth::now_ms;
use crate::auth::verification::{
    pending_verification, VerificationAttempt, VerificationMachine, VerifyOutcome, VerifyRejection,
};

#[utoipa::path(
    post,
    path = "/v1/auth/verify",
    tag = "auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Session established", body = RedirectResponse),
        (status = 400, description = "Bad or wrong code", body = FormErrorResponse),
        (status = 410, description = "No live code request", body = RedirectResponse),
        (status = 429, description = "Cooldown or verify throttle", body = ThrottledResponse)
    )
)]
pub async fn verify(
    Extension(state): Extension<Arc<GateState>>,
    Extension(store): Extension<SharedStore>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    let mut store = store.lock().await;
    let now = now_ms();
    let pending = match pending_verification(&store, &state.config, now) {
        Ok(pending) => pending,
        Err(reason) => return expired_session(&mut store, reason),
    };

    let length = state.config.otp_length();
    if request.digits.len() != length {
        return form_error(messages::INCOMPLETE_CODE);
    }
    let mut attempt = VerificationAttempt::new(length);
    for (index, digit) in request.digits.iter().enumerate() {
        // An empty entry is a deletion, so it passes here and is caught by
        // the completeness check below.
        if attempt.enter(index, digit).is_err() {
            return form_error(messages::DIGITS_ONLY);
        }
    }
    if !attempt.should_auto_submit(false) {
        return form_error(messages::INCOMPLETE_CODE);
    }

    let machine = VerificationMachine::new(&state.backend, &state.config);
    match machine.submit(&mut store, &pending, &attempt).await {
        VerifyOutcome::Verified { next } => {
            (StatusCode::OK, Json(RedirectResponse::to(next))).into_response()
        }
        VerifyOutcome::Rejected(VerifyRejection::WrongCode) => form_error(messages::WRONG_CODE),
        VerifyOutcome::Rejected(VerifyRejection::SmsCooldown { cooldown_seconds }) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(CooldownResponse {
                alert: messages::COOLDOWN_ACTIVE.to_string(),
                cooldown_seconds,
            }),
        )
            .into_response(),
        VerifyOutcome::Rejected(VerifyRejection::Throttled {
            retry_after_seconds,
        }) => {
            // The submit throttle runs on its own clock; the resend cooldown
            // keeps whatever time it had.
            let timers = VerifyTimers::new(
                pending.record.remaining_cooldown_seconds(now),
                retry_after_seconds,
            );
            throttled(timers.throttle.remaining(), Some("verify_throttle"))
        }
        VerifyOutcome::Rejected(VerifyRejection::IncompleteCode) => {
            form_error(messages::INCOMPLETE_CODE)
        }
        VerifyOutcome::Rejected(VerifyRejection::Unexpected) => bad_gateway(),
    }
}

fn form_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(FormErrorResponse::new(message)),
    )
        .into_response()
}
