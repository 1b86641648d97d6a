//! MotionProbe Transform Core
//!
//! Synthesizes labeled camera-motion clips from source frames:
//! - **Params:** Per-frame kinematics for pan, tilt, zoom, dolly, and static
//! - **Warp:** Backward bilinear warping with a documented border policy
//! - **Engine:** Clip generation, source looping, and parallel batches
//!
//! This crate is pure computation: frames in, frames out.

pub mod engine;
pub mod params;
pub mod warp;

pub use engine::{GenerateError, GenerateOptions, MotionTransformEngine};
pub use params::{params_at, ParallaxConfig, TransformParams};
pub use warp::BorderPolicy;
