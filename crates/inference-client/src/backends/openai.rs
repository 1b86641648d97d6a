//! OpenAI chat-completions backend.

use motionprobe_model::Frame;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{http_client, send_json, trim_base};
use crate::adapter::{BackendSettings, InferenceAdapter};
use crate::encode::{encode_frames, JPEG_MIME};
use crate::error::{InferenceError, InferenceResult};

const MAX_TOKENS: u32 = 1024;

pub struct OpenAiAdapter {
    http: Client,
    settings: BackendSettings,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(settings: BackendSettings) -> InferenceResult<Self> {
        Ok(Self {
            http: http_client(&settings)?,
            settings,
        })
    }

    fn request_body(&self, prompt: &str, images: Vec<String>) -> Value {
        let mut content = vec![json!({ "type": "text", "text": prompt })];
        content.extend(images.into_iter().map(|data| {
            json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{JPEG_MIME};base64,{data}") }
            })
        }));
        json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": content }]
        })
    }
}

#[async_trait::async_trait]
impl InferenceAdapter for OpenAiAdapter {
    async fn submit(&self, frames: &[Frame], prompt: &str) -> InferenceResult<String> {
        let body = self.request_body(prompt, encode_frames(frames)?);
        let request = self
            .http
            .post(format!("{}/v1/chat/completions", trim_base(&self.settings.base_url)))
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let response: ChatResponse = send_json(request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| InferenceError::InvalidResponse("OpenAI reply contained no text".into()))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
