use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error};

use super::bad_gateway;
use super::types::{NavbarResponse, RedirectResponse};
use crate::api::refresh::{AuthContext, SharedStore};
use crate::api::GateState;
use crate::auth::session_store::{keys, SessionStore};
use crate::backend::{NavbarReply, RefreshReply};

#[utoipa::path(
    get,
    path = "/v1/account/navbar",
    tag = "account",
    responses(
        (status = 200, description = "Signed-in profile summary", body = NavbarResponse),
        (status = 401, description = "No usable session", body = RedirectResponse),
        (status = 502, description = "Backend failure", body = super::types::AlertResponse)
    )
)]
pub async fn navbar(
    Extension(state): Extension<Arc<GateState>>,
    Extension(context): Extension<AuthContext>,
    Extension(store): Extension<SharedStore>,
) -> Response {
    // The route guard already ran; this is belt and braces for direct calls.
    let Some(access) = context.access_token() else {
        return unauthorized();
    };

    let mut store = store.lock().await;
    match state.backend.navbar_info(access.expose_secret()).await {
        Ok(NavbarReply::Info(info)) => {
            (StatusCode::OK, Json(NavbarResponse::from(info))).into_response()
        }
        // The cookie passed interception but the backend disagreed; one
        // refresh attempt before the session is written off.
        Ok(NavbarReply::Unauthorized) => retry_after_refresh(&state, &mut store).await,
        Ok(NavbarReply::Unexpected(status)) => {
            error!("Unexpected navbar status from backend: {status}");
            bad_gateway()
        }
        Err(err) => {
            error!("Navbar request failed: {err}");
            bad_gateway()
        }
    }
}

async fn retry_after_refresh(state: &GateState, store: &mut SessionStore) -> Response {
    let Some(refresh_token) = store.get(keys::REFRESH_TOKEN).map(str::to_string) else {
        store.clear_session();
        return unauthorized();
    };

    match state.backend.refresh(&refresh_token).await {
        Ok(RefreshReply::Refreshed(access)) => {
            debug!("Access token refreshed on retry");
            store.set(
                keys::ACCESS_TOKEN,
                access.expose_secret(),
                state.config.access_token_ttl_seconds(),
            );
            match state.backend.navbar_info(access.expose_secret()).await {
                Ok(NavbarReply::Info(info)) => {
                    (StatusCode::OK, Json(NavbarResponse::from(info))).into_response()
                }
                Ok(NavbarReply::Unauthorized) => {
                    // A fresh token was refused too; the session is dead.
                    store.clear_session();
                    unauthorized()
                }
                Ok(NavbarReply::Unexpected(status)) => {
                    error!("Unexpected navbar status from backend: {status}");
                    bad_gateway()
                }
                Err(err) => {
                    error!("Navbar retry failed: {err}");
                    bad_gateway()
                }
            }
        }
        Ok(RefreshReply::Rejected) => {
            store.clear_session();
            unauthorized()
        }
        Ok(RefreshReply::Unexpected(status)) => {
            error!("Unexpected refresh status from backend: {status}");
            bad_gateway()
        }
        Err(err) => {
            error!("Token refresh failed: {err}");
            bad_gateway()
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(RedirectResponse::to_login())).into_response()
}
