//! HTTP client for the commerce backend.
//!
//! One request per call, no retries; failures are reported to callers, not
//! retried here. Rate-limit metadata is decoded into [`RateLimitSignal`]
//! before a reply leaves this module.

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;
use url::Url;

use crate::auth::{rate_limit::RateLimitSignal, Session};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("backend request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug)]
pub enum CodeRequestReply {
    Sent,
    RateLimited(RateLimitSignal),
    InvalidPhone,
    Unexpected(u16),
}

pub enum VerifyReply {
    Verified(Session),
    WrongCode,
    RateLimited(RateLimitSignal),
    Unexpected(u16),
}

pub enum RefreshReply {
    Refreshed(SecretString),
    Rejected,
    Unexpected(u16),
}

#[derive(Debug, Deserialize)]
pub struct NavbarInfo {
    pub phone: String,
    #[serde(rename = "pictureUrl")]
    pub picture_url: Option<String>,
}

pub enum NavbarReply {
    Info(NavbarInfo),
    Unauthorized,
    Unexpected(u16),
}

#[derive(Deserialize)]
struct TokenPairBody {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct AccessTokenBody {
    access: String,
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Build a client for the backend base URL.
    ///
    /// # Errors
    /// Returns an error if the URL does not parse or the client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .user_agent(crate::api::APP_USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }

    /// Ask the backend to send an OTP to the phone.
    ///
    /// # Errors
    /// Returns `BackendError` only for transport failures; HTTP-level
    /// outcomes are encoded in the reply.
    pub async fn request_code(&self, phone: &str) -> Result<CodeRequestReply, BackendError> {
        let response = self
            .client
            .post(self.endpoint("login/request-code")?)
            .json(&json!({ "phone": phone }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(CodeRequestReply::Sent);
        }
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let headers = response.headers().clone();
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                Ok(CodeRequestReply::RateLimited(RateLimitSignal::from_response(
                    status, &headers, &body,
                )))
            }
            StatusCode::BAD_REQUEST => Ok(CodeRequestReply::InvalidPhone),
            other => Ok(CodeRequestReply::Unexpected(other.as_u16())),
        }
    }

    /// Submit the concatenated verification code for the phone.
    ///
    /// # Errors
    /// Returns `BackendError` only for transport failures.
    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<VerifyReply, BackendError> {
        let response = self
            .client
            .post(self.endpoint("login/verify-code")?)
            .json(&json!({ "phone": phone, "verification_code": code }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return match response.json::<TokenPairBody>().await {
                Ok(tokens) => Ok(VerifyReply::Verified(Session {
                    access_token: SecretString::from(tokens.access),
                    refresh_token: SecretString::from(tokens.refresh),
                })),
                Err(err) => {
                    error!("Backend returned an unreadable token pair: {err}");
                    Ok(VerifyReply::Unexpected(status.as_u16()))
                }
            };
        }
        match status {
            StatusCode::BAD_REQUEST => Ok(VerifyReply::WrongCode),
            StatusCode::TOO_MANY_REQUESTS => {
                let headers = response.headers().clone();
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                Ok(VerifyReply::RateLimited(RateLimitSignal::from_response(
                    status, &headers, &body,
                )))
            }
            other => Ok(VerifyReply::Unexpected(other.as_u16())),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// Returns `BackendError` only for transport failures; a rejected token
    /// is a reply, not an error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshReply, BackendError> {
        let response = self
            .client
            .post(self.endpoint("token/refresh")?)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return match response.json::<AccessTokenBody>().await {
                Ok(body) => Ok(RefreshReply::Refreshed(SecretString::from(body.access))),
                Err(err) => {
                    error!("Backend returned an unreadable access token: {err}");
                    Ok(RefreshReply::Unexpected(status.as_u16()))
                }
            };
        }
        if status == StatusCode::UNAUTHORIZED {
            return Ok(RefreshReply::Rejected);
        }
        Ok(RefreshReply::Unexpected(status.as_u16()))
    }

    /// Fetch the signed-in user's navbar profile with a bearer token.
    ///
    /// # Errors
    /// Returns `BackendError` only for transport failures.
    pub async fn navbar_info(&self, access_token: &str) -> Result<NavbarReply, BackendError> {
        let response = self
            .client
            .get(self.endpoint("account/navbar-info")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return match response.json::<NavbarInfo>().await {
                Ok(info) => Ok(NavbarReply::Info(info)),
                Err(err) => {
                    error!("Backend returned an unreadable navbar profile: {err}");
                    Ok(NavbarReply::Unexpected(status.as_u16()))
                }
            };
        }
        if status == StatusCode::UNAUTHORIZED {
            return Ok(NavbarReply::Unauthorized);
        }
        Ok(NavbarReply::Unexpected(status.as_u16()))
    }
}
