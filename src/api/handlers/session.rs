use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::types::SessionResponse;
use crate::api::refresh::{AuthContext, SharedStore};

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "A session is active", body = SessionResponse),
        (status = 204, description = "No session")
    )
)]
pub async fn session(Extension(context): Extension<AuthContext>) -> Response {
    if context.is_authenticated() {
        (
            StatusCode::OK,
            Json(SessionResponse {
                authenticated: true,
            }),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Always clears both token cookies, session or not.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    responses((status = 204, description = "Session destroyed"))
)]
pub async fn logout(Extension(store): Extension<SharedStore>) -> Response {
    // Clears land after any refresh the middleware queued on this request,
    // so the browser's final state is always logged out.
    let mut store = store.lock().await;
    store.clear_session();
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{router, GateState};
    use crate::auth::config::AuthConfig;
    use crate::backend::BackendClient;
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::Request;
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::MockServer;

    async fn app(server: &MockServer) -> Result<Router> {
        let config = AuthConfig::new(server.uri(), "http://localhost:3000".to_string());
        let backend = BackendClient::new(&server.uri())?;
        router(Arc::new(GateState { backend, config }))
    }

    #[tokio::test]
    async fn session_reports_an_active_access_token() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server)
            .await?
            .oneshot(
                Request::builder()
                    .uri("/v1/auth/session")
                    .header(COOKIE, "access_token=live")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn session_without_tokens_is_no_content() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server)
            .await?
            .oneshot(
                Request::builder()
                    .uri("/v1/auth/session")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_both_tokens_even_without_a_session() -> Result<()> {
        let server = MockServer::start().await;
        let response = app(&server)
            .await?
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/auth/logout")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
        Ok(())
    }

    #[tokio::test]
    async fn logout_is_idempotent() -> Result<()> {
        let server = MockServer::start().await;
        let app = app(&server).await?;

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/v1/auth/logout")
                        .header(COOKIE, "access_token=a; refresh_token=b")
                        .body(Body::empty())?,
                )
                .await?;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
        Ok(())
    }
}
