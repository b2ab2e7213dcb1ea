//! Authorization header providers.
//!
//! Token acquisition and refresh live outside this crate; the runner only
//! asks an [`AuthProvider`] for headers right before each request.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Environment variable read by [`EnvTokenProvider`] by default.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid authorization header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Auth provider failed: {0}")]
    Provider(String),
}

/// Supplies the headers that authorize a request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn auth_headers(&self) -> Result<HeaderMap, AuthError>;
}

fn bearer_headers(token: &SecretString) -> Result<HeaderMap, AuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// A fixed bearer token.
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: SecretString::from(token.into()) }
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn auth_headers(&self) -> Result<HeaderMap, AuthError> {
        bearer_headers(&self.token)
    }
}

/// Reads a bearer token from the environment on every call, so a token
/// rotated by an outside process is picked up without restarting.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(ACCESS_TOKEN_ENV)
    }
}

#[async_trait]
impl AuthProvider for EnvTokenProvider {
    async fn auth_headers(&self) -> Result<HeaderMap, AuthError> {
        let token = std::env::var(&self.var)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::MissingCredentials(format!("{} is not set", self.var)))?;
        bearer_headers(&SecretString::from(token))
    }
}
