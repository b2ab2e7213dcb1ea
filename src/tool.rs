//! `script_run` as a function for LLM tool-calling frameworks.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::RunError;
use crate::request::InvocationRequest;
use crate::runner::ScriptRunner;

pub const TOOL_NAME: &str = "script_run";

const TOOL_DESCRIPTION: &str = "Run a function in an Apps Script project. The script project must be \
deployed for use with the Apps Script API and the calling application must share the same Cloud \
Platform project.";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The function definition advertised to the calling framework.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        kind: "function",
        function: FunctionDefinition {
            name: TOOL_NAME,
            description: TOOL_DESCRIPTION,
            parameters: parameters_schema(),
        },
    }
}

fn parameters_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "scriptId": {
                "type": "string",
                "description": "The script ID of the script to be executed. Find the script ID on the Project settings page under \"IDs.\""
            },
            "fields": {
                "type": "string",
                "description": "Selector specifying which fields to include in a partial response."
            },
            "alt": {
                "type": "string",
                "enum": ["json", "xml"],
                "description": "Data format for response."
            },
            "key": {
                "type": "string",
                "description": "API key. Required unless you provide an OAuth 2.0 token."
            },
            "access_token": {
                "type": "string",
                "description": "OAuth access token."
            },
            "oauth_token": {
                "type": "string",
                "description": "OAuth 2.0 token for the current user."
            },
            "quotaUser": {
                "type": "string",
                "description": "Available to use for quota purposes for server-side applications. Can be any arbitrary string assigned to a user, but should not exceed 40 characters."
            },
            "prettyPrint": {
                "type": "boolean",
                "description": "Returns response with indentations and line breaks."
            }
        },
        "required": ["scriptId"]
    })
}

/// Entry point for a framework that hands over the raw JSON arguments.
#[derive(Clone)]
pub struct ScriptRunTool {
    runner: Arc<ScriptRunner>,
}

impl ScriptRunTool {
    pub fn new(runner: Arc<ScriptRunner>) -> Self {
        Self { runner }
    }

    /// Runs the script named in `args`. Never fails: malformed arguments
    /// and run failures both come back as an error record.
    pub async fn call(&self, args: Value) -> Value {
        let script_id = args
            .get("scriptId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value::<InvocationRequest>(args) {
            Ok(request) => self.runner.run_or_record(&request).await,
            Err(err) => {
                let err = RunError::InvalidRequest(format!("invalid {TOOL_NAME} arguments: {err}"));
                self.runner.report(&err, &script_id).to_value()
            }
        }
    }
}
