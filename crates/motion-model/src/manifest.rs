//! Sidecar ground-truth manifest (`manifest.json`).
//!
//! Written once next to the encoded clips after assembly; the evaluation
//! run loads labels from here, never from pixel data.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::motion::MotionSpec;

/// File name of the manifest inside a clip directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Current manifest schema version.
pub const MANIFEST_VERSION: &str = "1.0";

/// Ground truth for every clip in a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipManifest {
    /// Schema version.
    pub version: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    pub fps: f64,
    pub width: u32,
    pub height: u32,

    /// Clip entries keyed by clip id.
    pub clips: BTreeMap<String, ClipEntry>,
}

/// One persisted clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    /// Path of the encoded clip, relative to the manifest directory.
    pub file: String,

    pub frame_count: usize,

    pub ground_truth: MotionSpec,
}

impl ClipManifest {
    pub fn new(fps: f64, width: u32, height: u32) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            fps,
            width,
            height,
            clips: BTreeMap::new(),
        }
    }

    /// Add or replace a clip entry.
    pub fn insert(&mut self, id: impl Into<String>, entry: ClipEntry) {
        self.clips.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&ClipEntry> {
        self.clips.get(id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Load `manifest.json` from a clip directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = dir.as_ref().join(MANIFEST_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| ManifestError::Io {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ManifestError::Parse { path, source: e })
    }

    /// Write `manifest.json` into a clip directory, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ManifestError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| ManifestError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| ManifestError::Parse {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ManifestError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// List entries whose clip file is missing under `dir`.
    pub fn validate_files(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = dir.as_ref();
        self.clips
            .iter()
            .filter(|(_, entry)| !dir.join(&entry.file).exists())
            .map(|(id, entry)| format!("{id}: clip missing: {}", entry.file))
            .collect()
    }
}

/// Errors reading or writing the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
