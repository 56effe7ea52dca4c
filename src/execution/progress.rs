//! Progress reporting and cooperative cancellation for evaluation passes.

use crate::core::error::{EvalWarning, NodeId};
use crate::core::node::NodeKind;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// A pass has started.
    Started {
        target: NodeId,
        graph_nodes: usize,
    },
    /// A node is about to be computed (its inputs are resolved first).
    NodeStarted {
        node_id: NodeId,
        kind: NodeKind,
        node_name: String,
    },
    /// A node has produced its image.
    NodeCompleted {
        node_id: NodeId,
        duration_ms: u64,
        evaluated: usize,
    },
    /// A node was needed again and served from the pass memo.
    MemoHit {
        node_id: NodeId,
    },
    /// A parameter was replaced with a usable value.
    ParameterCoerced {
        warning: EvalWarning,
    },
    /// The pass has completed.
    Completed {
        total_duration_ms: u64,
        nodes_evaluated: usize,
        memo_hits: usize,
    },
    /// The pass was cancelled.
    Cancelled,
    /// The pass failed.
    Error {
        node_id: Option<NodeId>,
        message: String,
    },
}

/// Callback type for progress updates.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks one evaluation pass and exposes its cancellation flag.
pub struct ProgressTracker {
    /// Nodes computed so far.
    evaluated: AtomicU64,
    /// Memo lookups that avoided recomputation.
    memo_hits: AtomicU64,
    /// Set by the host to stop the pass.
    cancelled: Arc<AtomicBool>,
    /// Start time.
    start_time: Option<Instant>,
    /// Progress callback.
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Create a tracker with its own cancellation flag.
    pub fn new() -> Self {
        Self {
            evaluated: AtomicU64::new(0),
            memo_hits: AtomicU64::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
            start_time: None,
            callback: None,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Observe a flag shared with the host instead of a private one.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Start tracking.
    pub fn start(&mut self, target: NodeId, graph_nodes: usize) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            target,
            graph_nodes,
        });
    }

    /// Report that a node is about to be computed.
    pub fn node_started(&self, node_id: NodeId, kind: NodeKind, node_name: &str) {
        self.send_update(ProgressUpdate::NodeStarted {
            node_id,
            kind,
            node_name: node_name.to_string(),
        });
    }

    /// Report that a node has produced its image.
    pub fn node_completed(&self, node_id: NodeId, duration_ms: u64) {
        let evaluated = self.evaluated.fetch_add(1, Ordering::Relaxed) as usize + 1;
        self.send_update(ProgressUpdate::NodeCompleted {
            node_id,
            duration_ms,
            evaluated,
        });
    }

    /// Report a memo hit.
    pub fn memo_hit(&self, node_id: NodeId) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::MemoHit { node_id });
    }

    /// Report a coerced parameter.
    pub fn parameter_coerced(&self, warning: &EvalWarning) {
        self.send_update(ProgressUpdate::ParameterCoerced {
            warning: warning.clone(),
        });
    }

    /// Check if the pass should stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Report that the pass stopped on request.
    pub fn report_cancelled(&self) {
        self.send_update(ProgressUpdate::Cancelled);
    }

    /// Report an error.
    pub fn report_error(&self, node_id: Option<NodeId>, message: String) {
        self.send_update(ProgressUpdate::Error { node_id, message });
    }

    /// Complete tracking.
    pub fn complete(&self) {
        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: self.elapsed_ms(),
            nodes_evaluated: self.nodes_evaluated(),
            memo_hits: self.memo_hits(),
        });
    }

    pub fn nodes_evaluated(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed) as usize
    }

    pub fn memo_hits(&self) -> usize {
        self.memo_hits.load(Ordering::Relaxed) as usize
    }

    /// Milliseconds since [`start`](Self::start).
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
