//! Anthropic messages backend.

use motionprobe_model::Frame;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{http_client, send_json, trim_base};
use crate::adapter::{BackendSettings, InferenceAdapter};
use crate::encode::{encode_frames, JPEG_MIME};
use crate::error::{InferenceError, InferenceResult};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicAdapter {
    http: Client,
    settings: BackendSettings,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(settings: BackendSettings) -> InferenceResult<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            settings,
        })
    }

    fn request_body(&self, prompt: &str, images: Vec<String>) -> Value {
        let mut content: Vec<Value> = images
            .into_iter()
            .map(|data| {
                json!({
                    "type": "image",
                    "source": { "type": "base64", "media_type": JPEG_MIME, "data": data }
                })
            })
            .collect();
        content.push(json!({ "type": "text", "text": prompt }));
        json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": content }]
        })
    }
}

#[async_trait::async_trait]
impl InferenceAdapter for AnthropicAdapter {
    async fn submit(&self, frames: &[Frame], prompt: &str) -> InferenceResult<String> {
        let body = self.request_body(prompt, encode_frames(frames)?);
        let request = self
            .http
            .post(format!("{}/v1/messages", trim_base(&self.settings.base_url)))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(request).await?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(InferenceError::InvalidResponse(
                "Anthropic reply contained no text".to_string(),
            ));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "anthropic"
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

    #[tokio::test]
    async fn sends_base64_blocks_before_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ak-test"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "MOTION_TYPE: dolly\nDIRECTION: in" }]
            })))
            .mount(&server)
            .await;

        let adapter = AnthropicAdapter::new(BackendSettings {
            base_url: format!("{}/", server.uri()),
            api_key: "ak-test".into(),
            model: "claude-test".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let frames = vec![Frame::solid(4, 4, [9, 9, 9]).unwrap(); 3];
        let reply = adapter.submit(&frames, "classify").await.unwrap();
        assert_eq!(reply, "MOTION_TYPE: dolly\nDIRECTION: in");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[3]["text"], "classify");
    }
}
