//! MotionProbe Model
//!
//! Defines the core data contracts shared by generation and evaluation:
//! - **Frame:** Immutable RGB raster with a shared pixel buffer
//! - **MotionSpec:** Camera-motion class, direction, and kinematics
//! - **LabeledClip:** Generated frames paired with their ground truth
//! - **Prediction / ScoreRecord / SuiteResult:** Evaluation outputs
//! - **ClipManifest:** Sidecar ground-truth file persisted next to clips

pub mod clip;
pub mod frame;
pub mod manifest;
pub mod motion;
pub mod prediction;
pub mod score;

pub use clip::*;
pub use frame::*;
pub use manifest::*;
pub use motion::*;
pub use prediction::*;
pub use score::*;
