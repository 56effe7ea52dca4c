//! Evaluation engine implementation.
//!
//! Evaluation is pull-based: asking for a target node recursively resolves
//! the nodes feeding it, depth first, memoizing every image for the rest of
//! the pass. A node reached again while it is still being resolved means
//! the graph contains a cycle and the pass fails with
//! [`EvalError::CycleDetected`] instead of recursing forever.
//!
//! A pass only reads the graph. [`ExecutionEngine::run`] additionally
//! commits the produced images as the nodes' cached results.

use crate::core::error::{EvalError, EvalResult, EvalWarning, NodeId, OpError, OpResult, PortId};
use crate::core::params::Parameters;
use crate::core::types::Image;
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use crate::graph::structure::{GraphNode, ProcessingGraph};
use crate::ops::{Coercion, ImageOps, OpInput, OperationTable, StandardOps};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Evaluation options.
#[derive(Clone, Default)]
pub struct EvalOptions {
    /// Progress callback.
    pub progress_callback: Option<ProgressCallback>,
    /// Checked before every node; setting it stops the pass.
    pub cancel_flag: Option<Arc<AtomicBool>>,
    /// Whether Output nodes with a path write their image to disk.
    pub write_outputs: bool,
}

impl std::fmt::Debug for EvalOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalOptions")
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .field("cancel_flag", &self.cancel_flag)
            .field("write_outputs", &self.write_outputs)
            .finish()
    }
}

impl EvalOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Enable/disable writing Output nodes' images to their paths.
    pub fn with_write_outputs(mut self, write: bool) -> Self {
        self.write_outputs = write;
        self
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The node that was asked for.
    pub target: NodeId,
    /// Its image.
    pub image: Image,
    /// Every image produced during the pass, by node.
    pub node_results: HashMap<NodeId, Image>,
    /// Parameters that had to be replaced to produce the image.
    pub warnings: Vec<EvalWarning>,
    /// Pass statistics.
    pub stats: EvalStats,
    /// [`ProcessingGraph::generation`] of the graph the pass read.
    pub generation: u64,
}

impl Evaluation {
    /// Image produced by `node_id` during this pass, if it was needed.
    pub fn result_for(&self, node_id: NodeId) -> Option<&Image> {
        self.node_results.get(&node_id)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Evaluation statistics.
#[derive(Debug, Clone, Default)]
pub struct EvalStats {
    /// Total pass time.
    pub total_duration: Duration,
    /// Number of nodes computed.
    pub nodes_evaluated: usize,
    /// Number of times a memoized image was reused.
    pub memo_hits: usize,
}

/// The evaluation engine.
pub struct ExecutionEngine {
    /// Pixel work.
    ops: Arc<dyn ImageOps>,
    /// Transform per node kind.
    table: OperationTable,
    /// Default evaluation options.
    default_options: EvalOptions,
}

impl ExecutionEngine {
    /// Create an engine backed by [`StandardOps`].
    pub fn new() -> Self {
        Self {
            ops: Arc::new(StandardOps),
            table: OperationTable::standard(),
            default_options: EvalOptions::default(),
        }
    }

    /// Replace the image operations implementation.
    pub fn with_ops(mut self, ops: Arc<dyn ImageOps>) -> Self {
        self.ops = ops;
        self
    }

    /// Replace the transform table.
    pub fn with_table(mut self, table: OperationTable) -> Self {
        self.table = table;
        self
    }

    /// Set default options.
    pub fn with_default_options(mut self, options: EvalOptions) -> Self {
        self.default_options = options;
        self
    }

    /// The image operations in use.
    pub fn ops(&self) -> &dyn ImageOps {
        self.ops.as_ref()
    }

    /// Evaluate `target` with the default options.
    pub fn evaluate(&self, graph: &ProcessingGraph, target: NodeId) -> EvalResult<Evaluation> {
        self.evaluate_with(graph, target, &self.default_options)
    }

    /// Evaluate `target`.
    ///
    /// Fails as a whole on the first error; no partial image is returned.
    pub fn evaluate_with(
        &self,
        graph: &ProcessingGraph,
        target: NodeId,
        options: &EvalOptions,
    ) -> EvalResult<Evaluation> {
        let start_time = Instant::now();
        let generation = graph.generation();

        let mut tracker = ProgressTracker::new();
        if let Some(callback) = &options.progress_callback {
            tracker = tracker.with_callback(callback.clone());
        }
        if let Some(flag) = &options.cancel_flag {
            tracker = tracker.with_cancel_flag(flag.clone());
        }
        tracker.start(target, graph.node_count());

        let mut pass = Pass {
            graph,
            ops: self.ops.as_ref(),
            table: &self.table,
            write_outputs: options.write_outputs,
            memo: HashMap::new(),
            visiting: HashSet::new(),
            warnings: Vec::new(),
            tracker: &tracker,
        };

        match pass.resolve(target) {
            Ok(image) => {
                let stats = EvalStats {
                    total_duration: start_time.elapsed(),
                    nodes_evaluated: tracker.nodes_evaluated(),
                    memo_hits: tracker.memo_hits(),
                };
                tracker.complete();
                info!(
                    "evaluated node {} in {:?} ({} computed, {} memo hits, {} warning(s))",
                    target,
                    stats.total_duration,
                    stats.nodes_evaluated,
                    stats.memo_hits,
                    pass.warnings.len()
                );
                Ok(Evaluation {
                    target,
                    image,
                    node_results: pass.memo,
                    warnings: pass.warnings,
                    stats,
                    generation,
                })
            }
            Err(EvalError::Cancelled) => {
                info!("evaluation of node {} cancelled", target);
                tracker.report_cancelled();
                Err(EvalError::Cancelled)
            }
            Err(error) => {
                debug!("evaluation of node {} failed: {}", target, error);
                tracker.report_error(error.node_id(), error.to_string());
                Err(error)
            }
        }
    }

    /// Evaluate `target` and store every produced image as the producing
    /// node's cached result. A failed pass leaves the caches untouched.
    pub fn run(&self, graph: &mut ProcessingGraph, target: NodeId) -> EvalResult<Evaluation> {
        let evaluation = self.evaluate(graph, target)?;
        graph.commit_results(evaluation.generation, &evaluation.node_results);
        Ok(evaluation)
    }

    /// Write an image with the engine's operations.
    pub fn save(&self, image: &Image, path: &Path) -> OpResult<()> {
        self.ops.save(image, path)
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("table", &self.table)
            .field("default_options", &self.default_options)
            .finish()
    }
}

// ============================================================================
// Single pass
// ============================================================================

/// State of one evaluation pass. Dropped when the pass ends.
struct Pass<'a> {
    graph: &'a ProcessingGraph,
    ops: &'a dyn ImageOps,
    table: &'a OperationTable,
    write_outputs: bool,
    /// Images already produced in this pass.
    memo: HashMap<NodeId, Image>,
    /// Nodes whose resolution is in progress.
    visiting: HashSet<NodeId>,
    warnings: Vec<EvalWarning>,
    tracker: &'a ProgressTracker,
}

impl<'a> Pass<'a> {
    fn resolve(&mut self, id: NodeId) -> EvalResult<Image> {
        if let Some(image) = self.memo.get(&id) {
            self.tracker.memo_hit(id);
            return Ok(image.clone());
        }
        if self.tracker.is_cancelled() {
            return Err(EvalError::Cancelled);
        }

        let graph = self.graph;
        let node = graph
            .find_node_by_id(id)
            .ok_or(EvalError::NodeNotFound(id))?;

        if !self.visiting.insert(id) {
            return Err(EvalError::CycleDetected { node_id: id });
        }
        self.tracker.node_started(id, node.kind, node.display_name());
        let started = Instant::now();
        let result = self.compute(node);
        self.visiting.remove(&id);
        let image = result?;

        if image.is_empty() {
            return Err(EvalError::OperationFailed {
                node_id: id,
                kind: node.kind,
                reason: "operation produced an empty image".to_string(),
            });
        }

        let elapsed = started.elapsed();
        debug!(
            "{} node {} -> {}x{} in {:?}",
            node.kind,
            id,
            image.width(),
            image.height(),
            elapsed
        );
        self.tracker.node_completed(id, elapsed.as_millis() as u64);
        self.memo.insert(id, image.clone());
        Ok(image)
    }

    fn compute(&mut self, node: &'a GraphNode) -> EvalResult<Image> {
        match node.parameters() {
            Parameters::Load { path } => self.load(node, path),
            Parameters::Output { path } => {
                let image = self.upstream(node, 0)?;
                if let (true, Some(path)) = (self.write_outputs, path) {
                    self.ops
                        .save(&image, Path::new(path))
                        .map_err(|e| operation_failed(node, e))?;
                    info!("wrote {}", path);
                }
                Ok(image)
            }
            parameters => {
                let images = (0..node.input_ports().len())
                    .map(|slot| self.upstream(node, slot))
                    .collect::<EvalResult<Vec<Image>>>()?;

                let transform = self.table.get(node.kind).ok_or_else(|| {
                    EvalError::OperationFailed {
                        node_id: node.id,
                        kind: node.kind,
                        reason: "no operation registered for this kind".to_string(),
                    }
                })?;
                let input = OpInput {
                    images: &images,
                    parameters,
                    seed: u64::from(node.id.0),
                };
                let transformed =
                    transform(self.ops, &input).map_err(|e| operation_failed(node, e))?;

                if let Some(coercion) = transformed.coercion {
                    self.record_coercion(node, coercion);
                }
                Ok(transformed.image)
            }
        }
    }

    fn load(&self, node: &GraphNode, path: &str) -> EvalResult<Image> {
        if path.is_empty() {
            return Err(EvalError::MissingInput { node_id: node.id });
        }
        let image = self.ops.load(Path::new(path)).map_err(|e| EvalError::LoadFailed {
            path: path.to_string(),
            reason: match e {
                OpError::Load { source, .. } => source.to_string(),
                other => other.to_string(),
            },
        })?;
        if image.is_empty() {
            return Err(EvalError::LoadFailed {
                path: path.to_string(),
                reason: "empty image".to_string(),
            });
        }
        Ok(image)
    }

    /// Resolve the node feeding input `slot` of `node`.
    fn upstream(&mut self, node: &GraphNode, slot: usize) -> EvalResult<Image> {
        let port: PortId = node
            .input_ports()
            .get(slot)
            .copied()
            .ok_or_else(|| EvalError::OperationFailed {
                node_id: node.id,
                kind: node.kind,
                reason: format!("no input slot {}", slot),
            })?;

        let graph = self.graph;
        let link = graph
            .find_link_into_input_port(port)
            .ok_or(EvalError::Disconnected {
                node_id: node.id,
                port,
            })?;
        let source = graph
            .find_node_by_output_port(link.from)
            .ok_or(EvalError::DanglingLink {
                link_id: link.id,
                port: link.from,
            })?;

        self.resolve(source.id)
    }

    fn record_coercion(&mut self, node: &GraphNode, coercion: Coercion) {
        let warning = EvalWarning {
            node_id: node.id,
            kind: node.kind,
            parameter: coercion.parameter.to_string(),
            requested: coercion.requested,
            used: coercion.used,
        };
        warn!("{}", warning);
        self.tracker.parameter_coerced(&warning);
        self.warnings.push(warning);
    }
}

fn operation_failed(node: &GraphNode, error: OpError) -> EvalError {
    EvalError::OperationFailed {
        node_id: node.id,
        kind: node.kind,
        reason: error.to_string(),
    }
}
