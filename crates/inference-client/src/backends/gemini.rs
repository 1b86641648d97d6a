//! Gemini `generateContent` backend.

use motionprobe_model::Frame;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{http_client, send_json, trim_base};
use crate::adapter::{BackendSettings, InferenceAdapter};
use crate::encode::{encode_frames, JPEG_MIME};
use crate::error::{InferenceError, InferenceResult};

pub struct GeminiAdapter {
    http: Client,
    settings: BackendSettings,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiAdapter {
    pub fn new(settings: BackendSettings) -> InferenceResult<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            trim_base(&self.settings.base_url),
            self.settings.model
        )
    }

    fn request_body(prompt: &str, images: Vec<String>) -> Value {
        let mut parts = vec![json!({ "text": prompt })];
        parts.extend(images.into_iter().map(|data| {
            json!({ "inline_data": { "mime_type": JPEG_MIME, "data": data } })
        }));
        json!({ "contents": [{ "parts": parts }] })
    }
}

#[async_trait::async_trait]
impl InferenceAdapter for GeminiAdapter {
    async fn submit(&self, frames: &[Frame], prompt: &str) -> InferenceResult<String> {
        let body = Self::request_body(prompt, encode_frames(frames)?);
        let request = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body);

        let response: GenerateResponse = send_json(request).await?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InferenceError::InvalidResponse(
                "Gemini reply contained no text".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: String) -> GeminiAdapter {
        GeminiAdapter::new(BackendSettings {
            base_url,
            api_key: "test-key".into(),
            model: "gemini-test".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn frames() -> Vec<Frame> {
        vec![Frame::solid(8, 8, [10, 20, 30]).unwrap(); 2]
    }

    #[tokio::test]
    async fn sends_inline_frames_and_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "MOTION_TYPE: pan\n" },
                        { "text": "DIRECTION: left" }
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = adapter(server.uri()).submit(&frames(), "prompt").await.unwrap();
        assert_eq!(reply, "MOTION_TYPE: pan\nDIRECTION: left");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "prompt");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
            .mount(&server)
            .await;

        let err = adapter(server.uri()).submit(&frames(), "p").await.unwrap_err();
        assert_eq!(
            err,
            InferenceError::RateLimited {
                retry_after: Some(Duration::from_secs(3))
            }
        );
    }

    #[tokio::test]
    async fn empty_candidates_are_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = adapter(server.uri()).submit(&frames(), "p").await.unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn server_errors_are_transport_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = adapter(server.uri()).submit(&frames(), "p").await.unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)));
        assert!(err.is_retryable());
    }
}
