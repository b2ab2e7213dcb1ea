//! The parameter bag for a single `scripts:run` invocation and its query
//! string encoding.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Response format requested from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Alt {
    #[default]
    Json,
    Xml,
}

impl Alt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alt::Json => "json",
            Alt::Xml => "xml",
        }
    }
}

/// What to do with optional parameters the caller did not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsetParams {
    /// Leave them out of the query string.
    #[default]
    Omit,
    /// Send them with the literal value `undefined`, as older callers did.
    SendUndefined,
}

/// Parameters sent on every request regardless of input.
pub const FIXED_PARAMS: [(&str, &str); 3] = [
    ("$.xgafv", "1"),
    ("upload_protocol", "raw"),
    ("uploadType", "raw"),
];

const UNDEFINED: &str = "undefined";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(rename = "scriptId")]
    pub script_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(default)]
    pub alt: Alt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(rename = "quotaUser", default, skip_serializing_if = "Option::is_none")]
    pub quota_user: Option<String>,
    #[serde(rename = "prettyPrint", default = "default_pretty_print")]
    pub pretty_print: bool,
}

fn default_pretty_print() -> bool {
    true
}

impl InvocationRequest {
    pub fn new(script_id: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            pretty_print: true,
            ..Default::default()
        }
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn alt(mut self, alt: Alt) -> Self {
        self.alt = alt;
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.oauth_token = Some(token.into());
        self
    }

    pub fn quota_user(mut self, user: impl Into<String>) -> Self {
        self.quota_user = Some(user.into());
        self
    }

    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Ordered `(key, value)` pairs for the query string. Empty strings are
    /// kept as-is; only `None` is subject to `unset`.
    pub fn query_pairs(&self, unset: UnsetParams) -> Vec<(&'static str, String)> {
        let optional = |value: &Option<String>| match (value, unset) {
            (Some(v), _) => Some(v.clone()),
            (None, UnsetParams::SendUndefined) => Some(UNDEFINED.to_string()),
            (None, UnsetParams::Omit) => None,
        };

        let mut pairs = Vec::with_capacity(10);
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };
        push("fields", optional(&self.fields));
        push("alt", Some(self.alt.as_str().to_string()));
        push("key", optional(&self.key));
        push("access_token", optional(&self.access_token));
        push("oauth_token", optional(&self.oauth_token));
        push("quotaUser", optional(&self.quota_user));
        push("prettyPrint", Some(self.pretty_print.to_string()));
        for (key, value) in FIXED_PARAMS {
            push(key, Some(value.to_string()));
        }
        pairs
    }

    /// Encodes the query string. Keys are static and written literally so
    /// `$.xgafv` is not escaped; values are form-urlencoded.
    pub fn query_string(&self, unset: UnsetParams) -> String {
        self.query_pairs(unset)
            .into_iter()
            .map(|(key, value)| {
                let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{key}={value}")
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
