use utoipa::OpenApi;

use super::handlers::{health, login, navbar, session, types, verify};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login,
        login::resend_code,
        verify::verify,
        session::session,
        session::logout,
        navbar::navbar,
    ),
    components(schemas(
        types::LoginRequest,
        types::LoginResponse,
        types::ResendResponse,
        types::VerifyRequest,
        types::FormErrorResponse,
        types::AlertResponse,
        types::ThrottledResponse,
        types::CooldownResponse,
        types::RedirectResponse,
        types::SessionResponse,
        types::NavbarResponse,
    )),
    tags(
        (name = "auth", description = "Login, verification, and session lifecycle"),
        (name = "account", description = "Signed-in account data"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
