use crate::api;
use crate::auth::config::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            backend_url,
            frontend_url,
            code_request_cooldown,
            code_lifetime,
            access_token_lifetime,
            refresh_token_lifetime,
            otp_length,
        } => {
            let config = AuthConfig::new(backend_url, frontend_url)
                .with_code_request_cooldown_seconds(code_request_cooldown)
                .with_code_lifetime_seconds(code_lifetime)
                .with_access_token_ttl_seconds(access_token_lifetime)
                .with_refresh_token_ttl_seconds(refresh_token_lifetime)
                .with_otp_length(otp_length);

            api::new(port, config).await?;
        }
    }

    Ok(())
}
