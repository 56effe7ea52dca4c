//! Evaluation engine module.
//!
//! This module turns a graph and a target node into an image.

pub mod engine;
pub mod progress;

pub use engine::{EvalOptions, EvalStats, Evaluation, ExecutionEngine};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
