//! Error types shared across MotionProbe crates.

use std::path::PathBuf;

/// Top-level error type for MotionProbe operations.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The source video could not be decoded. No clip can be produced.
    #[error("Unreadable source {path}: {message}")]
    UnreadableSource { path: PathBuf, message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    /// A clip on disk does not hold the frames it was written with.
    #[error("Frame count mismatch for {path}: expected {expected}, found {found}")]
    FrameCountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    pub fn unreadable_source(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_source_names_the_path() {
        let err = ProbeError::unreadable_source("/tmp/missing.mp4", "no video stream");
        assert!(err.to_string().contains("/tmp/missing.mp4"));
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(ProbeError::from(io), ProbeError::Io(_)));
    }
}
