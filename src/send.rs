use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::RunError;

/// Posts to `url` with no body and decodes the JSON reply.
///
/// A non-success status is returned as [`RunError::Remote`] carrying the
/// decoded error body; a body that is not JSON is a [`RunError::Decode`]
/// either way.
pub async fn send_to_google_apps_script(
    client: &Client,
    url: Url,
    headers: HeaderMap,
) -> Result<Value, RunError> {
    let res = client.post(url).headers(headers).send().await?;

    let status = res.status();
    let body = res.bytes().await?;

    if status.is_success() {
        Ok(serde_json::from_slice(&body)?)
    } else {
        let payload: Value = serde_json::from_slice(&body)?;
        Err(RunError::Remote { status, payload })
    }
}
