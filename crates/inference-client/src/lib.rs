//! MotionProbe Inference Client
//!
//! One [`InferenceAdapter`] capability with variants chosen by
//! configuration (Gemini, OpenAI, Anthropic, scripted). Frames are uploaded
//! as base64 JPEG; recoverable failures are retried with exponential
//! backoff by [`retry::with_retry`].

pub mod adapter;
pub mod backends;
pub mod encode;
pub mod error;
pub mod prompt;
pub mod retry;

pub use adapter::{build_adapter, BackendKind, BackendSettings, InferenceAdapter};
pub use backends::ScriptedAdapter;
pub use error::{InferenceError, InferenceResult};
pub use prompt::PromptTemplate;
pub use retry::{with_retry, RetryPolicy};
