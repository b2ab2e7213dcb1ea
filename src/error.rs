//! Error types for a script run.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum RunError {
    /// The request was rejected before any I/O.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status; `payload` is the decoded error body.
    #[error("Remote rejection (HTTP {status}): {payload}")]
    Remote { status: StatusCode, payload: Value },

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl RunError {
    /// Category tag reported as `errorType` in an error record.
    pub fn error_type(&self) -> &'static str {
        match self {
            RunError::InvalidRequest(_) => "InvalidRequest",
            RunError::Auth(_) => "AuthError",
            RunError::Transport(_) => "TransportError",
            RunError::Remote { .. } => "RemoteError",
            RunError::Decode(_) => "DecodeError",
            RunError::Url(_) => "InvalidUrl",
        }
    }

    /// The error followed by its sources, one per line.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str("\n    caused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
