//! MotionProbe Evaluation Harness
//!
//! Turns labeled clips into accuracy numbers:
//! - **Sampler:** evenly spaced frame indices per clip
//! - **Parser:** tolerant tokenizer for backend free text
//! - **Scoring:** per-clip records and an associative suite reduction
//! - **Runner:** bounded-concurrency inference with retry and degradation
//! - **Report:** JSON persistence and console summary
//!
//! The sampler, parser, and scoring modules perform no I/O.

pub mod parser;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod scoring;

pub use parser::parse_response;
pub use report::{SuiteReport, REPORT_FILE};
pub use runner::{ExcludedClip, RunnerSettings, SuiteRun, SuiteRunner};
pub use sampler::{sample, sample_frames, sample_indices, SampleError};
pub use scoring::{aggregate, score, score_failure, Tally};
