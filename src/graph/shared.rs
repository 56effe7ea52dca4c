//! A graph shared between threads.
//!
//! A pass reads the graph from start to finish, so it holds a read lock for
//! its whole duration. Structural edits take the write lock and therefore
//! never interleave with a pass. Several passes may run at once.

use crate::core::error::{EvalResult, NodeId};
use crate::execution::engine::{EvalOptions, Evaluation, ExecutionEngine};
use crate::graph::structure::ProcessingGraph;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Cloneable handle to a lock-protected [`ProcessingGraph`].
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<ProcessingGraph>>,
}

impl SharedGraph {
    pub fn new(graph: ProcessingGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Evaluate `target` under a read lock.
    pub fn evaluate(&self, engine: &ExecutionEngine, target: NodeId) -> EvalResult<Evaluation> {
        engine.evaluate(&self.inner.read(), target)
    }

    /// Evaluate `target` with explicit options under a read lock.
    pub fn evaluate_with(
        &self,
        engine: &ExecutionEngine,
        target: NodeId,
        options: &EvalOptions,
    ) -> EvalResult<Evaluation> {
        engine.evaluate_with(&self.inner.read(), target, options)
    }

    /// Evaluate under a read lock, then commit the results under a write lock.
    ///
    /// The read lock is released before the write lock is taken. If another
    /// handle edited the graph in between, the results are stale and are not
    /// stored; the evaluation is still returned.
    pub fn run(&self, engine: &ExecutionEngine, target: NodeId) -> EvalResult<Evaluation> {
        let evaluation = self.evaluate(engine, target)?;
        self.inner
            .write()
            .commit_results(evaluation.generation, &evaluation.node_results);
        Ok(evaluation)
    }

    /// Shared access for inspection.
    pub fn read(&self) -> RwLockReadGuard<'_, ProcessingGraph> {
        self.inner.read()
    }

    /// Exclusive access for edits.
    pub fn write(&self) -> RwLockWriteGuard<'_, ProcessingGraph> {
        self.inner.write()
    }
}

impl From<ProcessingGraph> for SharedGraph {
    fn from(graph: ProcessingGraph) -> Self {
        Self::new(graph)
    }
}
