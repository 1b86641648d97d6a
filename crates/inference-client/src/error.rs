//! Inference error types.

use std::time::Duration;

use thiserror::Error;

pub type InferenceResult<T> = Result<T, InferenceError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Rate limited{}", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Backend configuration error: {0}")]
    Config(String),

    #[error("Frame encoding failed: {0}")]
    FrameEncoding(String),
}

fn retry_suffix(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|d| format!(" (retry after {}s)", d.as_secs()))
        .unwrap_or_default()
}

impl InferenceError {
    /// Timeouts, rate limits and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InferenceError::Timeout(_)
                | InferenceError::RateLimited { .. }
                | InferenceError::Transport(_)
        )
    }

    /// Map an HTTP status that is not a success.
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: String) -> Self {
        match status {
            429 => InferenceError::RateLimited { retry_after },
            408 | 504 => InferenceError::Timeout(format!("backend returned {status}")),
            500..=599 => InferenceError::Transport(format!("backend returned {status}: {body}")),
            _ => InferenceError::RequestFailed { status, body },
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout(e.to_string())
        } else if e.is_decode() {
            InferenceError::InvalidResponse(e.to_string())
        } else {
            InferenceError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            InferenceError::from_status(429, Some(Duration::from_secs(2)), String::new()),
            InferenceError::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
        );
        assert!(matches!(
            InferenceError::from_status(504, None, String::new()),
            InferenceError::Timeout(_)
        ));
        assert!(matches!(
            InferenceError::from_status(503, None, "busy".into()),
            InferenceError::Transport(_)
        ));
        assert_eq!(
            InferenceError::from_status(401, None, "bad key".into()),
            InferenceError::RequestFailed {
                status: 401,
                body: "bad key".into()
            }
        );
    }

    #[test]
    fn only_transport_class_errors_retry() {
        assert!(InferenceError::Timeout("slow".into()).is_retryable());
        assert!(InferenceError::RateLimited { retry_after: None }.is_retryable());
        assert!(InferenceError::Transport("reset".into()).is_retryable());
        assert!(!InferenceError::InvalidResponse("no text".into()).is_retryable());
        assert!(!InferenceError::RequestFailed {
            status: 400,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn rate_limit_message_mentions_delay() {
        let e = InferenceError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
        };
        assert_eq!(e.to_string(), "Rate limited (retry after 5s)");
        assert_eq!(
            InferenceError::RateLimited { retry_after: None }.to_string(),
            "Rate limited"
        );
    }
}
