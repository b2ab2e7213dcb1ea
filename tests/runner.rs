//! Integration tests for the script runner against a mock API server

use std::sync::{Arc, Mutex};

use apps_script_runner::{
    AuthError, AuthProvider, ErrorRecord, FailureReporter, InvocationRequest, RunError,
    ScriptRunner, StaticToken, UnsetParams,
};
use async_trait::async_trait;
use mockito::Matcher;
use reqwest::header::HeaderMap;
use serde_json::json;
use url::Url;

#[derive(Default)]
struct RecordingReporter {
    records: Mutex<Vec<ErrorRecord>>,
}

impl RecordingReporter {
    fn records(&self) -> Vec<ErrorRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, record: &ErrorRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

struct FailingAuth;

#[async_trait]
impl AuthProvider for FailingAuth {
    async fn auth_headers(&self) -> Result<HeaderMap, AuthError> {
        Err(AuthError::Provider("token refresh failed".to_string()))
    }
}

fn runner(
    server: &mockito::Server,
    auth: impl AuthProvider + 'static,
    reporter: Arc<RecordingReporter>,
) -> ScriptRunner {
    ScriptRunner::builder()
        .base_url(Url::parse(&server.url()).unwrap())
        .auth(auth)
        .reporter(reporter)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_success_returns_body_verbatim() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("$.xgafv".into(), "1".into()),
            Matcher::UrlEncoded("upload_protocol".into(), "raw".into()),
            Matcher::UrlEncoded("uploadType".into(), "raw".into()),
            Matcher::UrlEncoded("alt".into(), "json".into()),
            Matcher::UrlEncoded("prettyPrint".into(), "true".into()),
        ]))
        .match_header("authorization", "Bearer X")
        .match_header("content-type", "application/json")
        .match_body("")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"done": true}"#)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    let result = runner.run(&InvocationRequest::new("abc")).await.unwrap();

    assert_eq!(result, json!({"done": true}));
    assert!(reporter.records().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_rejection_becomes_error_record() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"forbidden"}"#)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    let result = runner.run_or_record(&InvocationRequest::new("abc")).await;

    assert_eq!(result["error"], json!(true));
    assert!(result["message"]
        .as_str()
        .unwrap()
        .contains(r#"{"error":"forbidden"}"#));
    assert_eq!(result["details"]["scriptId"], json!("abc"));
    assert_eq!(result["details"]["errorType"], json!("RemoteError"));

    let records = reporter.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].details.script_id, "abc");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_rejection_carries_payload() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"status":"NOT_FOUND"}}"#)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    match runner.run(&InvocationRequest::new("abc")).await {
        Err(RunError::Remote { status, payload }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(payload["error"]["status"], json!("NOT_FOUND"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert_eq!(reporter.records().len(), 1);
}

#[tokio::test]
async fn test_auth_failure_is_returned_not_raised() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, FailingAuth, reporter.clone());

    let result = runner.run_or_record(&InvocationRequest::new("abc")).await;

    assert_eq!(result["error"], json!(true));
    assert_eq!(result["details"]["errorType"], json!("AuthError"));
    assert_eq!(result["rawError"]["name"], json!("AuthError"));
    assert!(result["details"]["stack"]
        .as_str()
        .unwrap()
        .contains("token refresh failed"));
    assert_eq!(reporter.records().len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_json_success_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    let err = runner.run(&InvocationRequest::new("abc")).await.unwrap_err();
    assert_eq!(err.error_type(), "DecodeError");
}

#[tokio::test]
async fn test_non_json_error_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    let result = runner.run_or_record(&InvocationRequest::new("abc")).await;
    assert_eq!(result["details"]["errorType"], json!("DecodeError"));
}

#[tokio::test]
async fn test_transport_failure_becomes_error_record() {
    let reporter = Arc::new(RecordingReporter::default());
    // Nothing listens on port 9 (discard) on the loopback interface.
    let runner = ScriptRunner::builder()
        .base_url(Url::parse("http://127.0.0.1:9").unwrap())
        .auth(StaticToken::new("X"))
        .reporter(reporter.clone())
        .build()
        .unwrap();

    let result = runner.run_or_record(&InvocationRequest::new("abc")).await;

    assert_eq!(result["details"]["errorType"], json!("TransportError"));
    assert_eq!(reporter.records().len(), 1);
}

#[tokio::test]
async fn test_empty_script_id_is_rejected_before_io() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let reporter = Arc::new(RecordingReporter::default());
    let runner = runner(&server, StaticToken::new("X"), reporter.clone());

    let result = runner.run_or_record(&InvocationRequest::new("")).await;

    assert_eq!(result["details"]["errorType"], json!("InvalidRequest"));
    assert_eq!(result["details"]["scriptId"], json!(""));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unset_params_policy() {
    let mut server = mockito::Server::new_async().await;

    let omitted = server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::Exact(
            "alt=json&prettyPrint=true&$.xgafv=1&upload_protocol=raw&uploadType=raw".into(),
        ))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let undefined = server
        .mock("POST", "/v1/scripts/abc:run")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("fields".into(), "undefined".into()),
            Matcher::UrlEncoded("key".into(), "undefined".into()),
            Matcher::UrlEncoded("access_token".into(), "undefined".into()),
            Matcher::UrlEncoded("oauth_token".into(), "undefined".into()),
            Matcher::UrlEncoded("quotaUser".into(), "undefined".into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let base_url = Url::parse(&server.url()).unwrap();
    let request = InvocationRequest::new("abc");

    ScriptRunner::builder()
        .base_url(base_url.clone())
        .auth(StaticToken::new("X"))
        .build()
        .unwrap()
        .run(&request)
        .await
        .unwrap();

    ScriptRunner::builder()
        .base_url(base_url)
        .auth(StaticToken::new("X"))
        .unset_params(UnsetParams::SendUndefined)
        .build()
        .unwrap()
        .run(&request)
        .await
        .unwrap();

    omitted.assert_async().await;
    undefined.assert_async().await;
}
