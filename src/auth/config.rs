//! Gateway configuration and defaults.

const DEFAULT_CODE_REQUEST_COOLDOWN_SECONDS: u64 = 120;
const DEFAULT_CODE_LIFETIME_SECONDS: u64 = 15 * 60;
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_OTP_LENGTH: usize = 5;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    backend_base_url: String,
    frontend_base_url: String,
    code_request_cooldown_seconds: u64,
    code_lifetime_seconds: u64,
    access_token_ttl_seconds: u64,
    refresh_token_ttl_seconds: u64,
    otp_length: usize,
}

impl AuthConfig {
    #[must_use]
    pub fn new(backend_base_url: String, frontend_base_url: String) -> Self {
        Self {
            backend_base_url,
            frontend_base_url,
            code_request_cooldown_seconds: DEFAULT_CODE_REQUEST_COOLDOWN_SECONDS,
            code_lifetime_seconds: DEFAULT_CODE_LIFETIME_SECONDS,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            otp_length: DEFAULT_OTP_LENGTH,
        }
    }

    #[must_use]
    pub fn with_code_request_cooldown_seconds(mut self, seconds: u64) -> Self {
        self.code_request_cooldown_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_code_lifetime_seconds(mut self, seconds: u64) -> Self {
        self.code_lifetime_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_length(mut self, length: usize) -> Self {
        self.otp_length = length;
        self
    }

    #[must_use]
    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn code_request_cooldown_seconds(&self) -> u64 {
        self.code_request_cooldown_seconds
    }

    #[must_use]
    pub fn code_lifetime_seconds(&self) -> u64 {
        self.code_lifetime_seconds
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> u64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn otp_length(&self) -> usize {
        self.otp_length
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}
