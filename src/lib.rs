//! Client for the Google Apps Script `scripts:run` endpoint.
//!
//! [`ScriptRunner`] assembles the request URL, attaches headers from an
//! [`AuthProvider`], posts, and hands back the decoded JSON body. Failures
//! are reported to a [`FailureReporter`] and returned either as a
//! [`RunError`] or, through [`ScriptRunner::run_or_record`], as an
//! [`ErrorRecord`] value.

pub mod auth;
pub mod error;
pub mod record;
pub mod request;
pub mod runcode;
pub mod runner;
mod send;
pub mod tool;

pub use auth::{AuthError, AuthProvider, EnvTokenProvider, StaticToken};
pub use error::RunError;
pub use record::{ErrorRecord, FailureReporter, LogReporter};
pub use request::{Alt, InvocationRequest, UnsetParams};
pub use runner::{ScriptRunner, ScriptRunnerBuilder, DEFAULT_BASE_URL};
pub use tool::{ScriptRunTool, ToolDefinition};
