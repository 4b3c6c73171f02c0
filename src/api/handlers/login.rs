use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

use super::types::{
    messages, AlertResponse, CooldownResponse, FormErrorResponse, LoginRequest, LoginResponse,
    RedirectResponse, ResendResponse, ThrottledResponse,
};
use super::{bad_gateway, expired_session, throttled};
use crate::api::refresh::SharedStore;
use crate::api::GateState;
use crate::auth::classifier::{classify, Credential};
use crate::auth::code_request::{CodeRequestCoordinator, CodeRequestOutcome};
use crate::auth::countdown::Countdown;
use crate::auth::now_ms;
use crate::auth::session_store::SessionStore;
use crate::auth::verification::{pending_verification, SessionExpired};

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Next step for the credential", body = LoginResponse),
        (status = 400, description = "Credential failed validation", body = FormErrorResponse),
        (status = 429, description = "Code requests throttled", body = ThrottledResponse),
        (status = 502, description = "Backend failure", body = AlertResponse)
    )
)]
pub async fn login(
    Extension(state): Extension<Arc<GateState>>,
    Extension(store): Extension<SharedStore>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match classify(&request.input) {
        Credential::Invalid => (
            StatusCode::BAD_REQUEST,
            Json(FormErrorResponse::new(messages::INVALID_CREDENTIAL)),
        )
            .into_response(),
        Credential::Username(_) => (
            StatusCode::OK,
            Json(LoginResponse {
                next: "password".to_string(),
                cooldown_seconds: None,
            }),
        )
            .into_response(),
        Credential::Phone(phone) => {
            let mut store = store.lock().await;
            request_code(&state, &mut store, &phone).await
        }
    }
}

async fn request_code(state: &GateState, store: &mut SessionStore, phone: &str) -> Response {
    let now = now_ms();
    let coordinator = CodeRequestCoordinator::new(&state.backend, &state.config);
    match coordinator.request_code(store, phone, now).await {
        CodeRequestOutcome::Accepted { record } => (
            StatusCode::OK,
            Json(LoginResponse {
                next: "verify".to_string(),
                cooldown_seconds: Some(record.remaining_cooldown_seconds(now)),
            }),
        )
            .into_response(),
        // A valid code is already out; still navigate, with the server's
        // remaining time on the countdown.
        CodeRequestOutcome::NeedsCooldownDisplay { seconds, .. } => (
            StatusCode::OK,
            Json(LoginResponse {
                next: "verify".to_string(),
                cooldown_seconds: Some(seconds),
            }),
        )
            .into_response(),
        CodeRequestOutcome::Throttled {
            retry_after_seconds,
        } => throttled(retry_after_seconds, None),
        CodeRequestOutcome::InvalidPhone => (
            StatusCode::BAD_REQUEST,
            Json(FormErrorResponse::new(messages::INVALID_PHONE)),
        )
            .into_response(),
        CodeRequestOutcome::UnexpectedError => bad_gateway(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/resend-code",
    tag = "auth",
    responses(
        (status = 200, description = "New cooldown state", body = ResendResponse),
        (status = 410, description = "No live code request", body = RedirectResponse),
        (status = 429, description = "Cooldown or throttle active", body = CooldownResponse)
    )
)]
pub async fn resend_code(
    Extension(state): Extension<Arc<GateState>>,
    Extension(store): Extension<SharedStore>,
) -> Response {
    let mut store = store.lock().await;
    let now = now_ms();
    let pending = match pending_verification(&store, &state.config, now) {
        Ok(pending) => pending,
        Err(reason) => return expired_session(&mut store, reason),
    };

    // Server-side check of the same countdown the client displays.
    let cooldown = Countdown::new(pending.record.remaining_cooldown_seconds(now));
    if !cooldown.is_elapsed() {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(CooldownResponse {
                alert: messages::COOLDOWN_ACTIVE.to_string(),
                cooldown_seconds: cooldown.remaining(),
            }),
        )
            .into_response();
    }

    let coordinator = CodeRequestCoordinator::new(&state.backend, &state.config);
    match coordinator
        .request_code(&mut store, &pending.record.phone, now)
        .await
    {
        CodeRequestOutcome::Accepted { record } => (
            StatusCode::OK,
            Json(ResendResponse {
                cooldown_seconds: record.remaining_cooldown_seconds(now),
                clear_slots: true,
            }),
        )
            .into_response(),
        // The previous code is still the live one; keep what was typed.
        CodeRequestOutcome::NeedsCooldownDisplay { seconds, .. } => (
            StatusCode::OK,
            Json(ResendResponse {
                cooldown_seconds: seconds,
                clear_slots: false,
            }),
        )
            .into_response(),
        CodeRequestOutcome::Throttled {
            retry_after_seconds,
        } => throttled(retry_after_seconds, None),
        // The stored phone is no longer accepted upstream; treat the whole
        // verification session as gone.
        CodeRequestOutcome::InvalidPhone => {
            expired_session(&mut store, SessionExpired::InvalidPhone)
        }
        CodeRequestOutcome::UnexpectedError => bad_gateway(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{router, GateState};
    use crate::auth::config::AuthConfig;
    use crate::backend::BackendClient;
    use anyhow::Result;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE, RETRY_AFTER, SET_COOKIE};
    use axum::http::Request;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app(server: &MockServer) -> Result<Router> {
        let config = AuthConfig::new(server.uri(), "http://localhost:3000".to_string());
        let backend = BackendClient::new(&server.uri())?;
        router(Arc::new(GateState { backend, config }))
    }

    fn login_request(input: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "input": input }).to_string()))
            .unwrap()
    }

    async fn body_value(response: axum::response::Response) -> Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn phone_login_requests_a_code_and_sets_the_record_cookies() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/request-code"))
            .and(body_json(json!({ "phone": "09123456789" })))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let response = app(&server)
            .await?
            .oneshot(login_request("09123456789"))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        assert!(cookies
            .iter()
            .any(|cookie| cookie.starts_with("requestedCodeTimestamp=")));
        assert!(cookies
            .iter()
            .any(|cookie| cookie.starts_with("inputtedPhone=09123456789")));

        let body = body_value(response).await?;
        assert_eq!(body["next"], "verify");
        assert_eq!(body["cooldown_seconds"], 120);
        Ok(())
    }

    #[tokio::test]
    async fn username_login_goes_to_the_password_step_without_a_backend_call() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server).await?.oneshot(login_request("alice123")).await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_value(response).await?;
        assert_eq!(body["next"], "password");
        assert!(body.get("cooldown_seconds").is_none());
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_credential_is_a_local_form_error() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server).await?.oneshot(login_request("!!")).await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_value(response).await?;
        assert_eq!(body["form_error"], messages::INVALID_CREDENTIAL);
        Ok(())
    }

    #[tokio::test]
    async fn sms_limit_still_navigates_with_the_server_remaining_time() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/request-code"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-rate-limit-type", "SMS_LIMIT")
                    .set_body_json(json!({ "cooldown_time": 45 })),
            )
            .mount(&server)
            .await;

        let response = app(&server)
            .await?
            .oneshot(login_request("09123456789"))
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_value(response).await?;
        assert_eq!(body["next"], "verify");
        assert_eq!(body["cooldown_seconds"], 45);
        Ok(())
    }

    #[tokio::test]
    async fn throttled_login_returns_429_with_retry_after() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/request-code"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let response = app(&server)
            .await?
            .oneshot(login_request("09123456789"))
            .await?;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "30");
        let body = body_value(response).await?;
        assert_eq!(body["retry_after_seconds"], 30);
        // No navigation hint on a throttle.
        assert!(body.get("next").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_is_a_502_alert() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/request-code"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = app(&server)
            .await?
            .oneshot(login_request("09123456789"))
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_value(response).await?;
        assert_eq!(body["alert"], messages::UNEXPECTED);
        Ok(())
    }

    fn resend_request(cookie: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/auth/resend-code")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn record_cookie(requested_at_ms: u64) -> String {
        format!("requestedCodeTimestamp={requested_at_ms}; inputtedPhone=09123456789")
    }

    #[tokio::test]
    async fn resend_without_a_record_is_gone() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server).await?.oneshot(resend_request("other=1")).await?;

        assert_eq!(response.status(), StatusCode::GONE);
        let body = body_value(response).await?;
        assert_eq!(body["next"], "login");
        assert_eq!(body["alert"], messages::SESSION_EXPIRED);
        Ok(())
    }

    #[tokio::test]
    async fn resend_during_the_cooldown_is_refused_locally() -> Result<()> {
        let server = MockServer::start().await;
        let cookie = record_cookie(now_ms());

        let response = app(&server).await?.oneshot(resend_request(&cookie)).await?;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_value(response).await?;
        assert_eq!(body["alert"], messages::COOLDOWN_ACTIVE);
        assert!(body["cooldown_seconds"].as_u64().unwrap() > 0);
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn resend_after_the_cooldown_sends_a_new_code_and_clears_slots() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/request-code"))
            .and(body_json(json!({ "phone": "09123456789" })))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        // Cooldown (120s) elapsed, code lifetime (900s) not yet.
        let cookie = record_cookie(now_ms() - 200_000);
        let response = app(&server).await?.oneshot(resend_request(&cookie)).await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_value(response).await?;
        assert_eq!(body["clear_slots"], true);
        assert_eq!(body["cooldown_seconds"], 120);
        Ok(())
    }
}
