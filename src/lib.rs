//! # Pixgraph - Node-graph Image Processing
//!
//! Pixgraph evaluates image processing pipelines built as a graph of nodes.
//! Each node loads, transforms, combines or emits an image; links carry
//! images from one node's output port to another node's input port.
//!
//! ## Features
//!
//! - **Pull-based evaluation**: only the nodes a target depends on run
//! - **Memoized passes**: a node feeding several consumers runs once per pass
//! - **Cycle-safe**: loops in the graph fail cleanly instead of recursing forever
//! - **Validated parameters**: out-of-range values are rejected when written
//! - **Swappable pixel work**: every operation goes through the [`ops::ImageOps`] trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixgraph::prelude::*;
//!
//! let mut graph = ProcessingGraph::new();
//!
//! let load = graph.add_node(NodeKind::Load, "source");
//! graph.set_parameter(load, "path", "input.png").unwrap();
//!
//! let blur = graph.add_node(NodeKind::Blur, "soften");
//! graph.set_parameter(blur, "kernel_size", 5).unwrap();
//!
//! let output = graph.add_node(NodeKind::Output, "result");
//!
//! graph.connect_nodes(load, blur).unwrap();
//! graph.connect_nodes(blur, output).unwrap();
//!
//! let engine = ExecutionEngine::new();
//! let evaluation = engine.evaluate(&graph, output).unwrap();
//! engine.save(&evaluation.image, "output.png".as_ref()).unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: identifiers, errors, node kinds, ports, parameters, value types
//! - [`graph`]: graph structure, links, topology analysis, shared graphs
//! - [`ops`]: the image operations contract and its standard implementation
//! - [`execution`]: the evaluation engine and progress reporting
//! - [`validation`]: optional pre-flight checks

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod graph;
pub mod ops;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use pixgraph::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Image, Kernel, Value};
    pub use crate::core::node::NodeKind;
    pub use crate::core::port::{Port, PortDirection};
    pub use crate::core::params::Parameters;

    // Errors
    pub use crate::core::error::{
        EvalError, EvalWarning, GraphError, LinkId, NodeId, OpError, ParameterError,
        PixgraphError, PixgraphResult, PortId, ValidationError, ValidationReport,
        ValidationWarning,
    };

    // Graph
    pub use crate::graph::connection::Link;
    pub use crate::graph::shared::SharedGraph;
    pub use crate::graph::structure::{GraphNode, ProcessingGraph};
    pub use crate::graph::topology::TopologyAnalyzer;

    // Operations
    pub use crate::ops::{ImageOps, OperationTable, StandardOps};

    // Validation
    pub use crate::validation::pipeline::ValidationPipeline;
    pub use crate::validation::stages::ValidationStage;

    // Execution
    pub use crate::execution::engine::{EvalOptions, EvalStats, Evaluation, ExecutionEngine};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "pixgraph");
    }

    #[test]
    fn test_basic_graph_creation() {
        let mut graph = ProcessingGraph::new();

        let load = graph.add_node(NodeKind::Load, "");
        let output = graph.add_node(NodeKind::Output, "");

        assert!(graph.connect_nodes(load, output).is_ok());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_errors_convert_to_crate_error() {
        let mut graph = ProcessingGraph::new();
        let blur = graph.add_node(NodeKind::Blur, "");

        let err: PixgraphError = graph.set_parameter(blur, "kernel_size", 2).unwrap_err().into();
        assert!(matches!(err, PixgraphError::Graph(GraphError::InvalidParameter { .. })));

        let err: PixgraphError = ExecutionEngine::new()
            .evaluate(&graph, blur)
            .unwrap_err()
            .into();
        assert!(matches!(err, PixgraphError::Eval(EvalError::Disconnected { .. })));
    }
}
