use crate::{auth::config::AuthConfig, backend::BackendClient};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;
pub mod refresh;

pub use openapi::ApiDoc;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Shared gateway state: the backend client and the auth configuration.
pub struct GateState {
    pub backend: BackendClient,
    pub config: AuthConfig,
}

/// Start the gateway.
///
/// # Errors
/// Returns an error if the backend client, router, or listener cannot be set
/// up, or if serving fails.
pub async fn new(port: u16, config: AuthConfig) -> Result<()> {
    let backend =
        BackendClient::new(config.backend_base_url()).context("Failed to build backend client")?;
    let state = Arc::new(GateState { backend, config });
    let app = router(state)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the full router with middleware; also used directly by tests.
///
/// # Errors
/// Returns an error if the configured frontend URL does not yield a CORS
/// origin.
pub fn router(state: Arc<GateState>) -> Result<Router> {
    let frontend_origin = frontend_origin(state.config.frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    // Protected routes sit behind the guard; the refresh middleware below
    // runs first and populates the auth context the guard reads.
    let protected = Router::new()
        .route("/v1/account/navbar", get(handlers::navbar::navbar))
        .layer(axum::middleware::from_fn(refresh::require_auth));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/v1/auth/login", post(handlers::login::login))
        .route("/v1/auth/resend-code", post(handlers::login::resend_code))
        .route("/v1/auth/verify", post(handlers::verify::verify))
        .route("/v1/auth/session", get(handlers::session::session))
        .route("/v1/auth/logout", post(handlers::session::logout))
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    refresh::token_refresh,
                ))
                .layer(Extension(state)),
        );

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_paths_and_keeps_ports() -> Result<()> {
        assert_eq!(
            frontend_origin("https://store.test/some/path")?,
            HeaderValue::from_static("https://store.test")
        );
        assert_eq!(
            frontend_origin("http://localhost:3000")?,
            HeaderValue::from_static("http://localhost:3000")
        );
        assert!(frontend_origin("not a url").is_err());
        Ok(())
    }

    #[test]
    fn user_agent_carries_name_and_version() {
        assert!(APP_USER_AGENT.starts_with("storegate/"));
    }
}
