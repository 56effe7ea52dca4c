//! Ordered collection of validation stages.

use crate::core::error::ValidationReport;
use crate::graph::structure::ProcessingGraph;
use crate::validation::stages::{
    ConnectivityValidation, ParameterValidation, StructuralValidation, ValidationStage,
};
use log::debug;
use std::time::Instant;

/// Runs stages in order over a graph and merges their findings into one
/// [`ValidationReport`].
///
/// Evaluation never requires a report; a front end uses it to show
/// problems before anyone asks for an image.
pub struct ValidationPipeline {
    checks: Vec<Box<dyn ValidationStage>>,
}

impl ValidationPipeline {
    /// A pipeline with no stages. Every graph passes.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// Structure, connectivity and parameter checks, in that order.
    pub fn standard() -> Self {
        Self::empty()
            .with_stage(StructuralValidation)
            .with_stage(ConnectivityValidation)
            .with_stage(ParameterValidation)
    }

    /// Only the structural checks (cycles, dangling links).
    pub fn structural_only() -> Self {
        Self::empty().with_stage(StructuralValidation)
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: impl ValidationStage + 'static) -> Self {
        self.checks.push(Box::new(stage));
        self
    }

    /// Names of the stages in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.checks.iter().map(|s| s.name()).collect()
    }

    /// Run every stage against `graph`.
    ///
    /// A cycle leaves the later stages nothing reliable to inspect, so the
    /// run stops at the first stage reporting one.
    pub fn validate(&self, graph: &ProcessingGraph) -> ValidationReport {
        let began = Instant::now();
        let mut report = ValidationReport::new();

        for check in &self.checks {
            let outcome = check.validate(graph);
            let stop = match outcome {
                Ok(found) => {
                    debug!("{} passed with {} warning(s)", check.name(), found.len());
                    found.into_iter().for_each(|w| report.add_warning(w));
                    false
                }
                Err(problems) => {
                    debug!("{} failed with {} error(s)", check.name(), problems.len());
                    let stop = problems.iter().any(|p| p.is_fatal());
                    problems.into_iter().for_each(|p| report.add_error(p));
                    stop
                }
            };
            if stop {
                debug!("stopping validation after {}", check.name());
                break;
            }
        }

        report.duration_ms = began.elapsed().as_millis() as u64;
        report
    }

    /// True when no stage reports an error.
    pub fn is_valid(&self, graph: &ProcessingGraph) -> bool {
        self.validate(graph).success
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;
    use crate::core::node::NodeKind;

    #[test]
    fn test_standard_stage_order() {
        assert_eq!(
            ValidationPipeline::standard().stage_names(),
            vec![
                "Structural Validation",
                "Connectivity Validation",
                "Parameter Validation"
            ]
        );
        assert!(ValidationPipeline::empty().stage_names().is_empty());
    }

    #[test]
    fn test_empty_graph_only_warns() {
        let report = ValidationPipeline::standard().validate(&ProcessingGraph::new());

        assert!(report.success);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_load_blur_output_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        image::DynamicImage::new_rgb8(2, 2).save(&path).unwrap();

        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        let output = graph.add_node(NodeKind::Output, "");
        graph
            .set_parameter(load, "path", path.display().to_string())
            .unwrap();
        graph.connect_nodes(load, blur).unwrap();
        graph.connect_nodes(blur, output).unwrap();

        let pipeline = ValidationPipeline::default();
        let report = pipeline.validate(&graph);

        assert!(report.success, "{:?}", report.detailed_errors());
        assert!(report.warnings.is_empty());
        assert!(pipeline.is_valid(&graph));
    }

    #[test]
    fn test_cycle_stops_later_stages() {
        let mut graph = ProcessingGraph::new();
        let a = graph.add_node(NodeKind::Brightness, "");
        let b = graph.add_node(NodeKind::Brightness, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        graph.connect_nodes(a, b).unwrap();
        graph.connect_nodes(b, a).unwrap();

        let report = ValidationPipeline::standard().validate(&graph);

        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], ValidationError::CycleDetected { .. }));
        assert!(!report.errors.iter().any(|e| e.affected_nodes().contains(&blur)));
    }

    #[test]
    fn test_structural_only_ignores_open_inputs() {
        let mut graph = ProcessingGraph::new();
        graph.add_node(NodeKind::Blend, "");

        assert!(ValidationPipeline::structural_only().is_valid(&graph));
        assert!(!ValidationPipeline::standard().is_valid(&graph));
    }
}
