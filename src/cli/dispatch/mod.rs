use crate::cli::actions::Action;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        backend_url: matches
            .get_one("backend-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --backend-url"))?,
        frontend_url: matches
            .get_one("frontend-url")
            .map(|s: &String| s.to_string())
            .unwrap_or_else(|| "http://localhost:3000".to_string()),
        code_request_cooldown: matches
            .get_one::<u64>("code-request-cooldown")
            .copied()
            .unwrap_or(120),
        code_lifetime: matches.get_one::<u64>("code-lifetime").copied().unwrap_or(900),
        access_token_lifetime: matches
            .get_one::<u64>("access-token-lifetime")
            .copied()
            .unwrap_or(300),
        refresh_token_lifetime: matches
            .get_one::<u64>("refresh-token-lifetime")
            .copied()
            .unwrap_or(86400),
        otp_length: matches.get_one::<usize>("otp-length").copied().unwrap_or(5),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_collects_all_server_fields() {
        let matches = commands::new().get_matches_from(vec![
            "storegate",
            "--backend-url",
            "https://api.store.tld",
            "--code-request-cooldown",
            "60",
            "--otp-length",
            "6",
        ]);

        let action = handler(&matches).unwrap();
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
                assert_eq!(port, 8080);
                assert_eq!(backend_url, "https://api.store.tld");
                assert_eq!(frontend_url, "http://localhost:3000");
                assert_eq!(code_request_cooldown, 60);
                assert_eq!(code_lifetime, 900);
                assert_eq!(access_token_lifetime, 300);
                assert_eq!(refresh_token_lifetime, 86400);
                assert_eq!(otp_length, 6);
            }
        }
    }
}
