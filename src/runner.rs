//! The script runner: URL assembly, auth, dispatch and failure handling for
//! `scripts:run`.

use std::sync::Arc;

use log::{debug, info};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::auth::{AuthProvider, EnvTokenProvider};
use crate::error::RunError;
use crate::record::{ErrorRecord, FailureReporter, LogReporter};
use crate::request::{InvocationRequest, UnsetParams};
use crate::send;

/// Root of the Apps Script API.
pub const DEFAULT_BASE_URL: &str = "https://script.googleapis.com";

pub struct ScriptRunnerBuilder {
    base_url: Option<Url>,
    http_client: Option<reqwest::Client>,
    auth: Option<Arc<dyn AuthProvider>>,
    reporter: Option<Arc<dyn FailureReporter>>,
    unset_params: UnsetParams,
}

impl Default for ScriptRunnerBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            http_client: None,
            auth: None,
            reporter: None,
            unset_params: UnsetParams::Omit,
        }
    }
}

impl ScriptRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API root. Only useful for pointing at a test server.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets a custom HTTP client, e.g. one with a timeout configured.
    ///
    /// If not set, a default client with no timeout is created.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the auth provider. Defaults to [`EnvTokenProvider`].
    pub fn auth(mut self, auth: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Sets the failure reporter. Defaults to [`LogReporter`].
    pub fn reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn unset_params(mut self, policy: UnsetParams) -> Self {
        self.unset_params = policy;
        self
    }

    pub fn build(self) -> Result<ScriptRunner, RunError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        if base_url.cannot_be_a_base() {
            return Err(RunError::InvalidRequest(format!(
                "base URL cannot have path segments: {base_url}"
            )));
        }

        let client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };

        Ok(ScriptRunner {
            client,
            base_url,
            auth: self.auth.unwrap_or_else(|| Arc::new(EnvTokenProvider::default())),
            reporter: self.reporter.unwrap_or_else(|| Arc::new(LogReporter)),
            unset_params: self.unset_params,
        })
    }
}

/// Runs Apps Script functions through the `scripts:run` endpoint.
///
/// Holds no per-call state, so one runner can be shared across tasks.
pub struct ScriptRunner {
    client: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthProvider>,
    reporter: Arc<dyn FailureReporter>,
    unset_params: UnsetParams,
}

impl ScriptRunner {
    pub fn builder() -> ScriptRunnerBuilder {
        ScriptRunnerBuilder::new()
    }

    /// Builds `{base}/v1/scripts/{scriptId}:run` with the full query string.
    pub fn request_url(&self, request: &InvocationRequest) -> Result<Url, RunError> {
        if request.script_id.trim().is_empty() {
            return Err(RunError::InvalidRequest("scriptId is required".to_string()));
        }

        let run_segment = format!("{}:run", request.script_id);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RunError::InvalidRequest(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "scripts", run_segment.as_str()]);
        url.set_query(Some(&request.query_string(self.unset_params)));
        Ok(url)
    }

    /// Runs the script and returns the decoded response body.
    ///
    /// Failures are reported to the configured [`FailureReporter`] before
    /// being returned.
    pub async fn run(&self, request: &InvocationRequest) -> Result<Value, RunError> {
        self.execute(request).await.inspect_err(|err| {
            self.report(err, &request.script_id);
        })
    }

    /// Like [`ScriptRunner::run`], but a failure comes back as the JSON
    /// error record instead of an `Err`.
    pub async fn run_or_record(&self, request: &InvocationRequest) -> Value {
        match self.execute(request).await {
            Ok(body) => body,
            Err(err) => self.report(&err, &request.script_id).to_value(),
        }
    }

    async fn execute(&self, request: &InvocationRequest) -> Result<Value, RunError> {
        let url = self.request_url(request)?;
        // The query may carry keys and tokens, so only the path is logged.
        debug!("POST {}", url.path());

        let mut headers = self.auth.auth_headers().await?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = send::send_to_google_apps_script(&self.client, url, headers).await?;
        info!("script {} ran successfully", request.script_id);
        Ok(body)
    }

    pub(crate) fn report(&self, err: &RunError, script_id: &str) -> ErrorRecord {
        let record = ErrorRecord::from_error(err, script_id);
        self.reporter.report(&record);
        record
    }
}
