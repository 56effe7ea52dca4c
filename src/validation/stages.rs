//! Individual validation stages.
//!
//! Each stage checks for a specific category of problems.

use crate::core::error::{ValidationError, ValidationWarning};
use crate::core::node::NodeKind;
use crate::core::params::Parameters;
use crate::graph::structure::ProcessingGraph;
use crate::graph::topology::TopologyAnalyzer;
use crate::ops::pending_coercion;
use std::path::Path;

/// Trait for validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Validate the graph.
    ///
    /// Returns Ok with warnings, or Err with errors.
    fn validate(
        &self,
        graph: &ProcessingGraph,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>>;
}

fn finish(
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(errors)
    }
}

/// Structural validation - checks graph structure.
///
/// Verifies:
/// - No group of nodes feeds itself
/// - Every link still has both endpoints
pub struct StructuralValidation;

impl ValidationStage for StructuralValidation {
    fn name(&self) -> &str {
        "Structural Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // Empty graph warning (not error - might be intentional)
        if graph.is_empty() {
            warnings.push(ValidationWarning {
                message: "Graph is empty".to_string(),
                node_id: None,
                suggestion: Some("Add a Load node to start a pipeline".to_string()),
            });
            return Ok(warnings);
        }

        for link in graph.links() {
            for port in [link.from, link.to] {
                if graph.port(port).is_none() {
                    errors.push(ValidationError::DanglingLink {
                        link_id: link.id,
                        port,
                    });
                }
            }
        }

        for nodes in TopologyAnalyzer::new(graph).find_cycles() {
            errors.push(ValidationError::CycleDetected { nodes });
        }

        finish(errors, warnings)
    }
}

/// Connectivity validation.
///
/// Every input port needs a link. Results that nothing consumes are
/// reported as warnings.
pub struct ConnectivityValidation;

impl ValidationStage for ConnectivityValidation {
    fn name(&self) -> &str {
        "Connectivity Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for node in graph.nodes() {
            for &port in node.input_ports() {
                if !graph.is_input_connected(port) {
                    errors.push(ValidationError::MissingRequiredInput {
                        node_id: node.id,
                        port,
                    });
                }
            }

            if node.kind.produces_output() && graph.links_from(node.id).next().is_none() {
                warnings.push(ValidationWarning {
                    message: format!("Result of {} is never used", node.display_name()),
                    node_id: Some(node.id),
                    suggestion: Some("Connect it to an Output node".to_string()),
                });
            }
        }

        finish(errors, warnings)
    }
}

/// Parameter validation.
///
/// Checks:
/// - Load nodes name a file that exists
/// - Output paths point into an existing directory
/// - Values that evaluation would have to replace
pub struct ParameterValidation;

impl ValidationStage for ParameterValidation {
    fn name(&self) -> &str {
        "Parameter Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for node in graph.nodes() {
            match node.parameters() {
                Parameters::Load { path } if path.is_empty() => {
                    errors.push(ValidationError::MissingParameter {
                        node_id: node.id,
                        parameter: "path".to_string(),
                    });
                }
                Parameters::Load { path } if !Path::new(path).is_file() => {
                    errors.push(ValidationError::ResourceNotFound {
                        node_id: node.id,
                        resource: path.clone(),
                    });
                }
                Parameters::Output { path: Some(path) } => {
                    if let Some(parent) = Path::new(path).parent() {
                        if !parent.as_os_str().is_empty() && !parent.exists() {
                            warnings.push(ValidationWarning {
                                message: format!(
                                    "Output directory does not exist: {}",
                                    parent.display()
                                ),
                                node_id: Some(node.id),
                                suggestion: Some("Create the directory before saving".to_string()),
                            });
                        }
                    }
                }
                parameters => {
                    if let Some(coercion) = pending_coercion(parameters) {
                        warnings.push(ValidationWarning {
                            message: format!(
                                "'{}' = {} on {} will be replaced by {}",
                                coercion.parameter,
                                coercion.requested,
                                node.display_name(),
                                coercion.used
                            ),
                            node_id: Some(node.id),
                            suggestion: Some(default_hint(node.kind).to_string()),
                        });
                    }
                }
            }
        }

        finish(errors, warnings)
    }
}

fn default_hint(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Blur => "Use a positive odd kernel size",
        NodeKind::Convolution => "Set a kernel with at least one weight",
        _ => "Set a value inside the accepted range",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PortId;

    #[test]
    fn test_structural_validation_empty_graph() {
        let graph = ProcessingGraph::new();
        let warnings = StructuralValidation.validate(&graph).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_structural_reports_cycles_and_dangling_links() {
        let mut graph = ProcessingGraph::new();
        let a = graph.add_node(NodeKind::Brightness, "a");
        let b = graph.add_node(NodeKind::Contrast, "b");
        let c = graph.add_node(NodeKind::Blur, "c");
        graph.connect_nodes(a, b).unwrap();
        graph.connect_nodes(b, a).unwrap();
        let c_in = graph.get_node(c).unwrap().input_port().unwrap();
        let dangling = graph.insert_link_unchecked(PortId(500), c_in);

        let errors = StructuralValidation.validate(&graph).unwrap_err();

        assert!(errors.contains(&ValidationError::CycleDetected { nodes: vec![a, b] }));
        assert!(errors.contains(&ValidationError::DanglingLink {
            link_id: dangling,
            port: PortId(500)
        }));
    }

    #[test]
    fn test_connectivity_reports_each_open_port() {
        let mut graph = ProcessingGraph::new();
        let blend = graph.add_node(NodeKind::Blend, "");
        let ports = graph.get_node(blend).unwrap().input_ports().to_vec();

        let errors = ConnectivityValidation.validate(&graph).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::MissingRequiredInput {
                    node_id: blend,
                    port: ports[0]
                },
                ValidationError::MissingRequiredInput {
                    node_id: blend,
                    port: ports[1]
                },
            ]
        );
    }

    #[test]
    fn test_unused_result_is_a_warning() {
        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let warnings = ConnectivityValidation.validate(&graph).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].node_id, Some(load));
    }

    #[test]
    fn test_load_paths() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png").display().to_string();

        let mut graph = ProcessingGraph::new();
        let unset = graph.add_node(NodeKind::Load, "");
        let absent = graph.add_node(NodeKind::Load, "");
        graph.set_parameter(absent, "path", missing.as_str()).unwrap();

        let errors = ParameterValidation.validate(&graph).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ValidationError::MissingParameter {
                    node_id: unset,
                    parameter: "path".to_string()
                },
                ValidationError::ResourceNotFound {
                    node_id: absent,
                    resource: missing
                },
            ]
        );
    }

    #[test]
    fn test_coercible_values_warn() {
        let mut graph = ProcessingGraph::new();
        let conv = graph.add_node(NodeKind::Convolution, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        graph.get_node_mut(blur).unwrap().parameters = Parameters::Blur { kernel_size: 0 };

        let warnings = ParameterValidation.validate(&graph).unwrap();

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].node_id, Some(conv));
        assert_eq!(warnings[1].node_id, Some(blur));
    }
}
