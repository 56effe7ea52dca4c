//! Error types for Pixgraph.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Be serializable for sending to a presentation layer
//! - Name the node, port or link that needs attention
//! - Convert into the top-level [`PixgraphError`] with `?`

use crate::core::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a node in the graph.
///
/// Allocated by the owning [`ProcessingGraph`](crate::graph::ProcessingGraph)
/// from its own counter; never reused within that graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a port. Inputs and outputs share one id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub u32);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.0)
    }
}

/// Unique identifier for a link in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link {}", self.0)
    }
}

/// Top-level error type for Pixgraph.
#[derive(Error, Debug)]
pub enum PixgraphError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Image operation error: {0}")]
    Operation(#[from] OpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from structural graph mutation and lookup.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Link {0} not found")]
    LinkNotFound(LinkId),

    #[error("{0} does not exist")]
    PortNotFound(PortId),

    #[error("{port} is not an {expected:?} port")]
    WrongPortDirection {
        port: PortId,
        expected: crate::core::port::PortDirection,
    },

    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("Input {port} is already fed by {existing}")]
    PortAlreadyConnected { port: PortId, existing: LinkId },

    #[error("Node {0} has no free input port")]
    NoFreeInput(NodeId),

    #[error("Node {0} has no output port")]
    NoOutputPort(NodeId),

    #[error("Invalid parameter on node {node_id}: {source}")]
    InvalidParameter {
        node_id: NodeId,
        #[source]
        source: ParameterError,
    },
}

/// Errors raised by the parameter store when a write is rejected.
///
/// The stored value is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterError {
    #[error("'{parameter}' = {value} is outside {expected}")]
    OutOfRange {
        parameter: String,
        value: String,
        expected: String,
    },

    #[error("{kind} nodes have no parameter '{parameter}'")]
    UnknownParameter { kind: NodeKind, parameter: String },

    #[error("'{parameter}' expects {expected}")]
    TypeMismatch { parameter: String, expected: String },

    #[error("Invalid kernel: {0}")]
    InvalidKernel(String),

    #[error("'{0}' must not be empty")]
    EmptyValue(String),
}

/// Errors from an evaluation pass.
///
/// Any of these fails the whole pass; no partial image is produced.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvalError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {node_id} has nothing connected to {port}")]
    Disconnected { node_id: NodeId, port: PortId },

    #[error("{link_id} comes from {port}, which no node owns")]
    DanglingLink { link_id: LinkId, port: PortId },

    #[error("Load node {node_id} has no source path")]
    MissingInput { node_id: NodeId },

    #[error("Failed to load '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Cycle detected while evaluating node {node_id}")]
    CycleDetected { node_id: NodeId },

    #[error("{kind} node {node_id} failed: {reason}")]
    OperationFailed {
        node_id: NodeId,
        kind: NodeKind,
        reason: String,
    },

    #[error("Evaluation cancelled")]
    Cancelled,
}

impl EvalError {
    /// Get the node ID that caused this error, if applicable.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            EvalError::NodeNotFound(node_id)
            | EvalError::Disconnected { node_id, .. }
            | EvalError::MissingInput { node_id }
            | EvalError::CycleDetected { node_id }
            | EvalError::OperationFailed { node_id, .. } => Some(*node_id),
            _ => None,
        }
    }

    /// Whether the graph itself is malformed, as opposed to an image or file problem.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EvalError::NodeNotFound(_)
                | EvalError::Disconnected { .. }
                | EvalError::DanglingLink { .. }
                | EvalError::CycleDetected { .. }
        )
    }
}

/// Failures reported by the image operations library.
#[derive(Error, Debug)]
pub enum OpError {
    /// The operation cannot be applied to this input (e.g. channel layout).
    #[error("not applicable: {0}")]
    NotApplicable(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("cannot read '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot write '{path}': {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Result type alias for Pixgraph operations.
pub type PixgraphResult<T> = Result<T, PixgraphError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for parameter writes.
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Result type alias for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Result type alias for image operations.
pub type OpResult<T> = Result<T, OpError>;

// ============================================================================
// Recoverable conditions
// ============================================================================

/// A parameter that evaluation replaced with a usable value.
///
/// Returned alongside a successful result so callers can tell the user
/// the image was produced with different settings than requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalWarning {
    /// Node whose parameter was replaced.
    pub node_id: NodeId,
    /// Kind of that node.
    pub kind: NodeKind,
    /// Parameter name.
    pub parameter: String,
    /// The stored value.
    pub requested: String,
    /// The value actually used.
    pub used: String,
}

impl fmt::Display for EvalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} node {}: '{}' = {} is unusable, used {}",
            self.kind, self.node_id, self.parameter, self.requested, self.used
        )
    }
}

// ============================================================================
// Validation Report
// ============================================================================

/// Problems found by the validation pipeline.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Cycle through nodes {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("{link_id} references {port}, which no node owns")]
    DanglingLink { link_id: LinkId, port: PortId },

    #[error("Missing required input {port} on node {node_id}")]
    MissingRequiredInput { node_id: NodeId, port: PortId },

    #[error("Parameter '{parameter}' on node {node_id} is not set")]
    MissingParameter { node_id: NodeId, parameter: String },

    #[error("Resource not found: {resource} (referenced by node {node_id})")]
    ResourceNotFound { node_id: NodeId, resource: String },
}

impl ValidationError {
    /// Check if this is a fatal error that should stop validation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::CycleDetected { .. })
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ValidationError::CycleDetected { .. } => {
                Some("Remove one of the links that closes the loop".to_string())
            }
            ValidationError::MissingRequiredInput { port, .. } => {
                Some(format!("Connect an output to {}", port))
            }
            ValidationError::MissingParameter { parameter, .. } => {
                Some(format!("Set '{}'", parameter))
            }
            ValidationError::ResourceNotFound { resource, .. } => {
                Some(format!("Check that the file '{}' exists", resource))
            }
            ValidationError::DanglingLink { .. } => None,
        }
    }

    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            ValidationError::CycleDetected { nodes } => nodes.clone(),
            ValidationError::MissingRequiredInput { node_id, .. }
            | ValidationError::MissingParameter { node_id, .. }
            | ValidationError::ResourceNotFound { node_id, .. } => vec![*node_id],
            ValidationError::DanglingLink { .. } => vec![],
        }
    }
}

/// Non-fatal validation warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning message.
    pub message: String,
    /// Node that triggered the warning, if applicable.
    pub node_id: Option<NodeId>,
    /// Suggestion for addressing the warning.
    pub suggestion: Option<String>,
}

/// Comprehensive validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed without errors.
    pub success: bool,
    /// List of errors found.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<ValidationWarning>,
    /// Time taken for validation in milliseconds.
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Add a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            if self.warnings.is_empty() {
                "✓ Graph is valid".to_string()
            } else {
                format!("✓ Graph is valid with {} warning(s)", self.warnings.len())
            }
        } else {
            format!("✗ Validation failed with {} error(s)", self.errors.len())
        }
    }

    /// Get detailed error messages with suggestions.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, error)| {
                let mut msg = format!("{}. {}", i + 1, error);
                if let Some(fix) = error.suggested_fix() {
                    msg.push_str(&format!("\n   → Suggestion: {}", fix));
                }
                msg
            })
            .collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
        assert_eq!(PortId(3).to_string(), "port 3");
        assert_eq!(LinkId(0).to_string(), "link 0");
    }

    #[test]
    fn test_eval_error_node_id() {
        let error = EvalError::Disconnected {
            node_id: NodeId(4),
            port: PortId(9),
        };
        assert_eq!(error.node_id(), Some(NodeId(4)));
        assert!(error.is_structural());

        let error = EvalError::LoadFailed {
            path: "missing.png".to_string(),
            reason: "no such file".to_string(),
        };
        assert_eq!(error.node_id(), None);
        assert!(!error.is_structural());
    }

    #[test]
    fn test_eval_error_serializes_for_frontend() {
        let error = EvalError::CycleDetected { node_id: NodeId(2) };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("CycleDetected"));

        let back: EvalError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, error);
    }

    #[test]
    fn test_graph_error_wraps_parameter_error() {
        let error = GraphError::InvalidParameter {
            node_id: NodeId(1),
            source: ParameterError::EmptyValue("path".to_string()),
        };
        assert!(error.to_string().contains("'path' must not be empty"));

        let top: PixgraphError = error.into();
        assert!(matches!(top, PixgraphError::Graph(_)));
    }

    #[test]
    fn test_validation_report() {
        let mut report = ValidationReport::new();
        assert!(report.success);

        report.add_error(ValidationError::MissingRequiredInput {
            node_id: NodeId(1),
            port: PortId(2),
        });
        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert!(report.detailed_errors()[0].contains("Suggestion"));
    }
}
