//! Backend variants of [`crate::InferenceAdapter`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::adapter::BackendSettings;
use crate::error::{InferenceError, InferenceResult};

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod scripted;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use scripted::ScriptedAdapter;

/// Build the shared HTTP client for a backend.
fn http_client(settings: &BackendSettings) -> InferenceResult<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| InferenceError::Config(format!("failed to build HTTP client: {e}")))
}

/// Send a request and decode a JSON reply, mapping HTTP failures.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> InferenceResult<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "Backend returned an error status");
        return Err(InferenceError::from_status(status.as_u16(), retry_after, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}
