//! Runcodes: a whole invocation request packed into one base64 string, so a
//! saved run can be replayed with a single argument.

use base64::{engine::general_purpose, Engine};
use thiserror::Error;

use crate::request::InvocationRequest;

#[derive(Debug, Error)]
pub enum RuncodeError {
    #[error("Error decoding base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded runcode is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Error parsing runcode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn request_from_runcode(runcode: &str) -> Result<InvocationRequest, RuncodeError> {
    let decoded = general_purpose::STANDARD.decode(runcode.trim())?;
    let decoded_str = String::from_utf8(decoded)?;
    Ok(serde_json::from_str(&decoded_str)?)
}

pub fn runcode_from_request(request: &InvocationRequest) -> Result<String, RuncodeError> {
    let json_string = serde_json::to_string(request)?;
    Ok(general_purpose::STANDARD.encode(json_string))
}
