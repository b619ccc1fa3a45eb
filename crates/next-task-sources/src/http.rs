//! Shared HTTP client and JSON request helper

use std::time::Duration;

use next_task_core::SourceError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Build the client shared by every source
pub fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("next-task/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SourceError::Request {
            source_name: "http".to_string(),
            reason: e.to_string(),
        })
}

/// Send a request and decode a JSON success body
///
/// Non-success statuses become [`FetchError::Api`] carrying the response text.
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> FetchResult<T> {
    let response = request.send().await?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "received response");

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(FetchError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
