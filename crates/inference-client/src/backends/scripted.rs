//! Offline backend that replays canned replies.

use std::sync::atomic::{AtomicUsize, Ordering};

use motionprobe_model::Frame;

use crate::adapter::InferenceAdapter;
use crate::error::{InferenceError, InferenceResult};

/// Replays a fixed script, cycling when it runs out.
pub struct ScriptedAdapter {
    script: Vec<InferenceResult<String>>,
    cursor: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(responses: Vec<String>) -> InferenceResult<Self> {
        Self::with_script(responses.into_iter().map(Ok).collect())
    }

    /// A script that may include failures.
    pub fn with_script(script: Vec<InferenceResult<String>>) -> InferenceResult<Self> {
        if script.is_empty() {
            return Err(InferenceError::Config(
                "scripted backend needs at least one response".to_string(),
            ));
        }
        Ok(Self {
            script,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of calls served so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InferenceAdapter for ScriptedAdapter {
    async fn submit(&self, _frames: &[Frame], _prompt: &str) -> InferenceResult<String> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.script.len();
        self.script[index].clone()
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
