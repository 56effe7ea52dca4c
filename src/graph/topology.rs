//! Topological analysis of graphs.
//!
//! Provides algorithms for:
//! - Cycle detection (strongly connected components)
//! - Topological ordering
//! - Source and sink discovery
//!
//! Evaluation itself never needs a global ordering; these are used by the
//! validation pipeline and by callers who want to inspect a graph before
//! running it.

use crate::core::error::NodeId;
use crate::graph::structure::ProcessingGraph;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// Analyzer for graph topology.
pub struct TopologyAnalyzer<'a> {
    graph: &'a ProcessingGraph,
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer for the given graph.
    pub fn new(graph: &'a ProcessingGraph) -> Self {
        Self { graph }
    }

    /// Node-level view of the graph: one edge per link.
    pub fn dependency_graph(&self) -> DiGraphMap<NodeId, ()> {
        let mut deps = DiGraphMap::new();
        for id in self.graph.node_ids() {
            deps.add_node(id);
        }
        for id in self.graph.node_ids() {
            for next in self.graph.successors(id) {
                deps.add_edge(id, next, ());
            }
        }
        deps
    }

    /// Every group of nodes that feed each other.
    ///
    /// Each inner list is one strongly connected component with more than
    /// one member, sorted by id.
    pub fn find_cycles(&self) -> Vec<Vec<NodeId>> {
        let deps = self.dependency_graph();
        tarjan_scc(&deps)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort();
                component
            })
            .collect()
    }

    /// Check if the graph has any cycles.
    pub fn has_cycle(&self) -> bool {
        !self.find_cycles().is_empty()
    }

    /// Nodes ordered so every node comes after the nodes feeding it.
    ///
    /// Returns `None` when the graph contains a cycle.
    pub fn topological_sort(&self) -> Option<Vec<NodeId>> {
        toposort(&self.dependency_graph(), None).ok()
    }

    /// Nodes with no incoming links.
    pub fn sources(&self) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .filter(|id| self.graph.links_to(*id).next().is_none())
            .collect()
    }

    /// Nodes with no outgoing links.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.graph
            .node_ids()
            .filter(|id| self.graph.links_from(*id).next().is_none())
            .collect()
    }

    /// Length of the longest chain of links ending at `node_id`.
    ///
    /// Returns `None` if the node does not exist or sits on a cycle.
    pub fn node_depth(&self, node_id: NodeId) -> Option<usize> {
        if !self.graph.has_node(node_id) {
            return None;
        }
        let order = self.topological_sort()?;

        let mut depth: HashMap<NodeId, usize> = HashMap::new();
        for id in order {
            let d = self
                .graph
                .predecessors(id)
                .iter()
                .filter_map(|p| depth.get(p))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(id, d);
            if id == node_id {
                return Some(d);
            }
        }
        None
    }

    /// Find all disconnected subgraphs.
    pub fn find_subgraphs(&self) -> Vec<HashSet<NodeId>> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut subgraphs = Vec::new();

        for node_id in self.graph.node_ids() {
            if !visited.contains(&node_id) {
                let subgraph = self.flood_fill(node_id);
                visited.extend(&subgraph);
                subgraphs.push(subgraph);
            }
        }

        subgraphs
    }

    /// Flood fill ignoring link direction.
    fn flood_fill(&self, start: NodeId) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                queue.extend(self.graph.successors(current));
                queue.extend(self.graph.predecessors(current));
            }
        }

        visited
    }
}
