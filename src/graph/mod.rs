//! Graph module for managing processing graphs.
//!
//! A processing graph is a directed graph where nodes are image operations
//! and links carry images from an output port to an input port. Cycles can
//! be built; they are reported by validation and refused by evaluation.

pub mod structure;
pub mod connection;
pub mod topology;
pub mod shared;

// Re-export commonly used types
pub use structure::{GraphNode, ProcessingGraph};
pub use connection::Link;
pub use topology::TopologyAnalyzer;
pub use shared::SharedGraph;
