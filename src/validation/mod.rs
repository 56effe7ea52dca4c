//! Validation module for pre-evaluation checking.
//!
//! The pipeline inspects a graph without evaluating it and reports
//! problems a pass would run into.

pub mod pipeline;
pub mod stages;

pub use pipeline::ValidationPipeline;
pub use stages::{ConnectivityValidation, ParameterValidation, StructuralValidation, ValidationStage};
