//! Core types for the Pixgraph processing engine.
//!
//! This module contains the foundational types that make up the node graph
//! including:
//! - Identifiers and error types
//! - Image, kernel and parameter value types
//! - Node kinds and ports
//! - The per-node parameter store

pub mod types;
pub mod port;
pub mod error;
pub mod node;
pub mod params;

// Re-export commonly used types
pub use types::{Image, Kernel, Value};
pub use port::{Port, PortDirection};
pub use error::{EvalError, GraphError, LinkId, NodeId, OpError, ParameterError, PixgraphError, PortId};
pub use node::NodeKind;
pub use params::Parameters;
