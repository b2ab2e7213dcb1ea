//! The error record returned in place of a response body, and the sink every
//! failure is reported to.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RunError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Always `true`; callers check this field to tell a record from a body.
    pub error: bool,
    pub message: String,
    pub details: ErrorDetails,
    #[serde(rename = "rawError")]
    pub raw_error: RawError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub stack: Option<String>,
    #[serde(rename = "scriptId")]
    pub script_id: String,
    pub timestamp: String,
    #[serde(rename = "errorType")]
    pub error_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawError {
    pub name: String,
    pub stack: Option<String>,
}

impl ErrorRecord {
    pub fn from_error(err: &RunError, script_id: &str) -> Self {
        let message = err.to_string();
        let stack = Some(err.chain());
        let name = err.error_type().to_string();
        Self {
            error: true,
            message: message.clone(),
            details: ErrorDetails {
                message,
                stack: stack.clone(),
                script_id: script_id.to_string(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                error_type: name.clone(),
            },
            raw_error: RawError { name, stack },
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "error": true, "message": self.message })
        })
    }
}

/// Receives every failed run before the record is handed back to the caller.
pub trait FailureReporter: Send + Sync {
    fn report(&self, record: &ErrorRecord);
}

/// Logs the record through `log` and echoes a readable line to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl FailureReporter for LogReporter {
    fn report(&self, record: &ErrorRecord) {
        match serde_json::to_string(&record.details) {
            Ok(details) => log::error!("script run failed: {details}"),
            Err(_) => log::error!(
                "script run failed: script_id={} error_type={} message={}",
                record.details.script_id,
                record.details.error_type,
                record.message
            ),
        }
        eprintln!(
            "❌ Error running script {}: {}",
            record.details.script_id, record.message
        );
    }
}
