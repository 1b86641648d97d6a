//! The inference capability and backend selection.

use std::sync::Arc;
use std::time::Duration;

use motionprobe_common::InferenceConfig;
use motionprobe_model::Frame;

use crate::backends::{AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ScriptedAdapter};
use crate::error::{InferenceError, InferenceResult};

/// A vision backend that answers a prompt about a frame sequence.
///
/// Implementations make a single attempt; retry and timeouts are applied by
/// the caller.
#[async_trait::async_trait]
pub trait InferenceAdapter: Send + Sync {
    /// Submit frames plus prompt and return the raw text reply.
    async fn submit(&self, frames: &[Frame], prompt: &str) -> InferenceResult<String>;

    /// Backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Model identifier sent to the backend.
    fn model(&self) -> &str;
}

/// Supported backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Gemini,
    OpenAi,
    Anthropic,
    Scripted,
}

impl BackendKind {
    pub fn parse(name: &str) -> InferenceResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(BackendKind::Gemini),
            "openai" => Ok(BackendKind::OpenAi),
            "anthropic" | "claude" => Ok(BackendKind::Anthropic),
            "scripted" => Ok(BackendKind::Scripted),
            other => Err(InferenceError::Config(format!(
                "unknown backend '{other}' (expected gemini, openai, anthropic or scripted)"
            ))),
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::Gemini => "https://generativelanguage.googleapis.com",
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::Anthropic => "https://api.anthropic.com",
            BackendKind::Scripted => "",
        }
    }

    /// Model used when none is configured for this backend.
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Gemini => "gemini-1.5-flash",
            BackendKind::OpenAi => "gpt-4o",
            BackendKind::Anthropic => "claude-3-5-sonnet-latest",
            BackendKind::Scripted => "scripted",
        }
    }

    /// Environment variable conventionally holding the API key.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            BackendKind::Gemini => "GEMINI_API_KEY",
            BackendKind::OpenAi => "OPENAI_API_KEY",
            BackendKind::Anthropic => "ANTHROPIC_API_KEY",
            BackendKind::Scripted => "",
        }
    }

    /// Whether the backend needs an API key.
    pub fn needs_api_key(&self) -> bool {
        !matches!(self, BackendKind::Scripted)
    }
}

/// Connection settings shared by the HTTP backends.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Build the adapter selected by configuration.
///
/// HTTP backends read their API key from `config.api_key_env`.
pub fn build_adapter(config: &InferenceConfig) -> InferenceResult<Arc<dyn InferenceAdapter>> {
    let kind = BackendKind::parse(&config.backend)?;
    let adapter: Arc<dyn InferenceAdapter> = match kind {
        BackendKind::Scripted => Arc::new(ScriptedAdapter::new(config.scripted_responses.clone())?),
        BackendKind::Gemini => Arc::new(GeminiAdapter::new(http_settings(kind, config)?)?),
        BackendKind::OpenAi => Arc::new(OpenAiAdapter::new(http_settings(kind, config)?)?),
        BackendKind::Anthropic => Arc::new(AnthropicAdapter::new(http_settings(kind, config)?)?),
    };
    tracing::info!(backend = adapter.name(), model = adapter.model(), "Using inference backend");
    Ok(adapter)
}

fn http_settings(kind: BackendKind, config: &InferenceConfig) -> InferenceResult<BackendSettings> {
    let api_key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            InferenceError::Config(format!(
                "API key not found: set the {} environment variable",
                config.api_key_env
            ))
        })?;

    Ok(BackendSettings {
        base_url: config
            .base_url
            .clone()
            .unwrap_or_else(|| kind.default_base_url().to_string()),
        api_key,
        model: config.model.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!(BackendKind::parse("Gemini").unwrap(), BackendKind::Gemini);
        assert_eq!(BackendKind::parse("claude").unwrap(), BackendKind::Anthropic);
        assert!(BackendKind::parse("llava").is_err());
    }

    #[test]
    fn backend_defaults() {
        assert_eq!(BackendKind::Gemini.default_api_key_env(), InferenceConfig::default().api_key_env);
        assert_eq!(BackendKind::Gemini.default_model(), InferenceConfig::default().model);
        assert_eq!(BackendKind::OpenAi.default_api_key_env(), "OPENAI_API_KEY");
        assert!(!BackendKind::Scripted.needs_api_key());
    }

    #[test]
    fn scripted_backend_needs_no_key() {
        let config = InferenceConfig {
            backend: "scripted".into(),
            scripted_responses: vec!["MOTION_TYPE: static".into()],
            ..Default::default()
        };
        let adapter = build_adapter(&config).unwrap();
        assert_eq!(adapter.name(), "scripted");
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let config = InferenceConfig {
            backend: "openai".into(),
            api_key_env: "MOTIONPROBE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            build_adapter(&config).map(|_| ()),
            Err(InferenceError::Config(_))
        ));
    }
}
