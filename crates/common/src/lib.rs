//! MotionProbe Common Utilities
//!
//! Shared infrastructure for all MotionProbe crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Harness configuration loading and validation

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
