//! Graph structure and node management.
//!
//! The ProcessingGraph is the central data structure that holds all nodes,
//! their ports and the links between them. It owns the id counters for all
//! three, so independent graphs never share ids and tests are deterministic.

use crate::core::error::{GraphError, GraphResult, LinkId, NodeId, PortId};
use crate::core::node::NodeKind;
use crate::core::params::Parameters;
use crate::core::port::{Port, PortDirection};
use crate::core::types::{Image, Value};
use crate::graph::connection::Link;
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};

/// A node instance in the graph.
///
/// Contains the kind, ports, parameter and the result of the last
/// successful evaluation that included it.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Unique identifier
    pub id: NodeId,
    /// What the node does
    pub kind: NodeKind,
    /// Display label; has no effect on evaluation
    pub name: String,
    inputs: Vec<PortId>,
    output: Option<PortId>,
    pub(crate) parameters: Parameters,
    cached: Option<Image>,
}

impl GraphNode {
    /// Get the display name (label or kind name).
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.kind.display_name()
        } else {
            &self.name
        }
    }

    /// Input ports in slot order. Blend has `[base, overlay]`.
    pub fn input_ports(&self) -> &[PortId] {
        &self.inputs
    }

    /// The first input port, if the node has any.
    pub fn input_port(&self) -> Option<PortId> {
        self.inputs.first().copied()
    }

    pub fn output_port(&self) -> Option<PortId> {
        self.output
    }

    /// Whether `port` belongs to this node.
    pub fn owns_port(&self, port: PortId) -> bool {
        self.output == Some(port) || self.inputs.contains(&port)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Get a parameter value by name.
    pub fn get_parameter(&self, name: &str) -> Option<Value> {
        self.parameters.get(name)
    }

    /// The image this node produced in the last committed evaluation.
    pub fn cached_result(&self) -> Option<&Image> {
        self.cached.as_ref()
    }

    fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.inputs.iter().copied().chain(self.output)
    }
}

/// The main processing graph structure.
///
/// Uses IndexMap to maintain insertion order for consistent iteration.
#[derive(Debug, Clone, Default)]
pub struct ProcessingGraph {
    /// All nodes in the graph, indexed by ID.
    nodes: IndexMap<NodeId, GraphNode>,
    /// All links in the graph.
    links: Vec<Link>,
    /// Every live port, indexed by ID.
    ports: HashMap<PortId, Port>,
    next_node_id: u32,
    next_port_id: u32,
    next_link_id: u32,
    /// Bumped by every mutation; results are only committed against the
    /// generation they were computed from.
    generation: u64,
}

impl ProcessingGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a node of `kind` with its ports and default parameter.
    pub fn add_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let inputs: Vec<PortId> = (0..kind.input_count())
            .map(|_| {
                let port = self.allocate_port();
                self.ports.insert(port, Port::input(port, id));
                port
            })
            .collect();

        let output = kind.produces_output().then(|| {
            let port = self.allocate_port();
            self.ports.insert(port, Port::output(port, id));
            port
        });

        let node = GraphNode {
            id,
            kind,
            name: name.into(),
            inputs,
            output,
            parameters: Parameters::default_for(kind),
            cached: None,
        };
        debug!("added {} node {} ({})", kind, id, node.display_name());
        self.nodes.insert(id, node);
        self.generation += 1;
        id
    }

    fn allocate_port(&mut self) -> PortId {
        let port = PortId(self.next_port_id);
        self.next_port_id += 1;
        port
    }

    /// Remove a node from the graph.
    ///
    /// Also removes every link touching one of its ports and clears all
    /// cached results.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))?;

        let before = self.links.len();
        self.links
            .retain(|link| !node.owns_port(link.from) && !node.owns_port(link.to));
        for port in node.ports() {
            self.ports.remove(&port);
        }
        debug!(
            "removed node {} and {} incident link(s)",
            id,
            before - self.links.len()
        );

        self.generation += 1;
        self.invalidate_all();
        Ok(node)
    }

    /// Get a reference to a node.
    pub fn get_node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Mutable access bypasses parameter validation and cache invalidation.
    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> GraphResult<&mut GraphNode> {
        self.generation += 1;
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find a node by id.
    pub fn find_node_by_id(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Find the node whose output port is `port`.
    pub fn find_node_by_output_port(&self, port: PortId) -> Option<&GraphNode> {
        self.ports
            .get(&port)
            .filter(|p| p.is_output())
            .and_then(|p| self.nodes.get(&p.node_id))
    }

    /// Find the link feeding the input port `port`.
    pub fn find_link_into_input_port(&self, port: PortId) -> Option<&Link> {
        self.links.iter().find(|link| link.to == port)
    }

    /// Look up a port.
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    // ========================================================================
    // Link Management
    // ========================================================================

    /// Link an output port to an input port.
    ///
    /// Every input port accepts at most one link; connecting to an input that
    /// is already fed fails with [`GraphError::PortAlreadyConnected`] and
    /// leaves the existing link in place. Output ports fan out freely.
    pub fn connect(&mut self, from: PortId, to: PortId) -> GraphResult<LinkId> {
        let source = *self.ports.get(&from).ok_or(GraphError::PortNotFound(from))?;
        if !source.is_output() {
            return Err(GraphError::WrongPortDirection {
                port: from,
                expected: PortDirection::Output,
            });
        }

        let target = *self.ports.get(&to).ok_or(GraphError::PortNotFound(to))?;
        if !target.is_input() {
            return Err(GraphError::WrongPortDirection {
                port: to,
                expected: PortDirection::Input,
            });
        }

        if source.node_id == target.node_id {
            return Err(GraphError::SelfConnection(source.node_id));
        }

        if let Some(existing) = self.find_link_into_input_port(to) {
            return Err(GraphError::PortAlreadyConnected {
                port: to,
                existing: existing.id,
            });
        }

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        self.links.push(Link::new(id, from, to));
        debug!(
            "{}: node {} {} -> node {} {}",
            id, source.node_id, from, target.node_id, to
        );

        self.generation += 1;
        self.invalidate_all();
        Ok(id)
    }

    /// Link `from`'s output to the first unconnected input of `to`.
    pub fn connect_nodes(&mut self, from: NodeId, to: NodeId) -> GraphResult<LinkId> {
        let output = self
            .get_node(from)?
            .output_port()
            .ok_or(GraphError::NoOutputPort(from))?;
        let input = self
            .get_node(to)?
            .input_ports()
            .iter()
            .copied()
            .find(|port| !self.is_input_connected(*port))
            .ok_or(GraphError::NoFreeInput(to))?;
        self.connect(output, input)
    }

    /// Remove a link by ID.
    pub fn disconnect(&mut self, id: LinkId) -> GraphResult<Link> {
        let pos = self
            .links
            .iter()
            .position(|link| link.id == id)
            .ok_or(GraphError::LinkNotFound(id))?;

        let link = self.links.remove(pos);
        debug!("removed {}", id);
        self.generation += 1;
        self.invalidate_all();
        Ok(link)
    }

    /// Get a link by ID.
    pub fn get_link(&self, id: LinkId) -> GraphResult<&Link> {
        self.links
            .iter()
            .find(|link| link.id == id)
            .ok_or(GraphError::LinkNotFound(id))
    }

    /// Get all links.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Links leaving a node's output port.
    pub fn links_from(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        let output = self.nodes.get(&node_id).and_then(GraphNode::output_port);
        self.links
            .iter()
            .filter(move |link| Some(link.from) == output)
    }

    /// Links arriving at any of a node's input ports.
    pub fn links_to(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        let inputs: Vec<PortId> = self
            .nodes
            .get(&node_id)
            .map(|node| node.inputs.clone())
            .unwrap_or_default();
        self.links
            .iter()
            .filter(move |link| inputs.contains(&link.to))
    }

    /// Check if an input port is already connected.
    pub fn is_input_connected(&self, port: PortId) -> bool {
        self.find_link_into_input_port(port).is_some()
    }

    /// Get the number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Test-only escape hatch for links the public API refuses to create.
    #[cfg(test)]
    pub(crate) fn insert_link_unchecked(&mut self, from: PortId, to: PortId) -> LinkId {
        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        self.links.push(Link::new(id, from, to));
        self.generation += 1;
        id
    }

    // ========================================================================
    // Parameters and cached results
    // ========================================================================

    /// Set a parameter on a node.
    ///
    /// Out-of-range values are rejected and the stored value is kept. On
    /// success the node's cached result and everything downstream of it is
    /// cleared.
    pub fn set_parameter(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        let node = self.get_node_mut(id)?;
        node.parameters
            .set(name, value.into())
            .map_err(|source| GraphError::InvalidParameter {
                node_id: id,
                source,
            })?;

        node.cached = None;
        for downstream in self.get_downstream(id) {
            if let Some(node) = self.nodes.get_mut(&downstream) {
                node.cached = None;
            }
        }
        Ok(())
    }

    /// Counter that changes whenever the graph is mutated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Store the images of a successful pass as each node's cached result.
    ///
    /// `generation` is the value of [`generation`](Self::generation) the
    /// pass read. If the graph has changed since, the results are stale and
    /// nothing is stored. Returns whether the results were stored.
    pub fn commit_results(&mut self, generation: u64, results: &HashMap<NodeId, Image>) -> bool {
        if generation != self.generation {
            debug!(
                "discarding {} result(s) from generation {} (graph is at {})",
                results.len(),
                generation,
                self.generation
            );
            return false;
        }
        for (id, image) in results {
            if let Some(node) = self.nodes.get_mut(id) {
                node.cached = Some(image.clone());
            }
        }
        true
    }

    /// Get a node's cached result.
    pub fn cached_result(&self, id: NodeId) -> Option<&Image> {
        self.nodes.get(&id).and_then(GraphNode::cached_result)
    }

    /// Clear every node's cached result.
    pub fn invalidate_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.cached = None;
        }
    }

    // ========================================================================
    // Graph Analysis
    // ========================================================================

    /// Nodes directly fed by `node_id`.
    pub fn successors(&self, node_id: NodeId) -> Vec<NodeId> {
        self.links_from(node_id)
            .filter_map(|link| self.ports.get(&link.to).map(|p| p.node_id))
            .collect()
    }

    /// Nodes directly feeding `node_id`.
    pub fn predecessors(&self, node_id: NodeId) -> Vec<NodeId> {
        self.links_to(node_id)
            .filter_map(|link| self.ports.get(&link.from).map(|p| p.node_id))
            .collect()
    }

    /// Get all nodes that depend on the given node (downstream).
    pub fn get_downstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.walk(node_id, |graph, id| graph.successors(id))
    }

    /// Get all nodes that the given node depends on (upstream).
    pub fn get_upstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.walk(node_id, |graph, id| graph.predecessors(id))
    }

    fn walk(&self, start: NodeId, next: impl Fn(&Self, NodeId) -> Vec<NodeId>) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<NodeId> = next(self, start).into();

        while let Some(current) = queue.pop_front() {
            if current != start && visited.insert(current) {
                result.push(current);
                queue.extend(next(self, current));
            }
        }

        result
    }

    /// Clear all nodes and links. Id counters keep counting.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.ports.clear();
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut ProcessingGraph, kinds: &[NodeKind]) -> Vec<NodeId> {
        let ids: Vec<NodeId> = kinds.iter().map(|k| graph.add_node(*k, "")).collect();
        for pair in ids.windows(2) {
            graph.connect_nodes(pair[0], pair[1]).unwrap();
        }
        ids
    }

    #[test]
    fn test_add_node_allocates_ports_from_shared_counter() {
        let mut graph = ProcessingGraph::new();

        let load = graph.add_node(NodeKind::Load, "source");
        let blur = graph.add_node(NodeKind::Blur, "soften");
        let blend = graph.add_node(NodeKind::Blend, "mix");
        let output = graph.add_node(NodeKind::Output, "view");

        assert_eq!(load, NodeId(0));
        assert_eq!(output, NodeId(3));

        let load = graph.get_node(load).unwrap();
        assert!(load.input_ports().is_empty());
        assert_eq!(load.output_port(), Some(PortId(0)));

        let blur = graph.get_node(blur).unwrap();
        assert_eq!(blur.input_ports(), &[PortId(1)]);
        assert_eq!(blur.output_port(), Some(PortId(2)));

        let blend = graph.get_node(blend).unwrap();
        assert_eq!(blend.input_ports(), &[PortId(3), PortId(4)]);
        assert_eq!(blend.output_port(), Some(PortId(5)));

        let output = graph.get_node(output).unwrap();
        assert_eq!(output.input_ports(), &[PortId(6)]);
        assert_eq!(output.output_port(), None);
    }

    #[test]
    fn test_independent_graphs_have_independent_ids() {
        let mut a = ProcessingGraph::new();
        let mut b = ProcessingGraph::new();
        a.add_node(NodeKind::Load, "");
        a.add_node(NodeKind::Load, "");

        assert_eq!(b.add_node(NodeKind::Load, ""), NodeId(0));
    }

    #[test]
    fn test_connect_validates_ports() {
        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        let load_out = graph.get_node(load).unwrap().output_port().unwrap();
        let blur_in = graph.get_node(blur).unwrap().input_port().unwrap();
        let blur_out = graph.get_node(blur).unwrap().output_port().unwrap();

        assert_eq!(
            graph.connect(blur_in, blur_in),
            Err(GraphError::WrongPortDirection {
                port: blur_in,
                expected: PortDirection::Output
            })
        );
        assert_eq!(
            graph.connect(load_out, load_out),
            Err(GraphError::WrongPortDirection {
                port: load_out,
                expected: PortDirection::Input
            })
        );
        assert_eq!(
            graph.connect(load_out, PortId(99)),
            Err(GraphError::PortNotFound(PortId(99)))
        );
        assert_eq!(
            graph.connect(blur_out, blur_in),
            Err(GraphError::SelfConnection(blur))
        );

        assert!(graph.connect(load_out, blur_in).is_ok());
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn test_input_accepts_single_link() {
        let mut graph = ProcessingGraph::new();
        let a = graph.add_node(NodeKind::Load, "a");
        let b = graph.add_node(NodeKind::Load, "b");
        let noise = graph.add_node(NodeKind::Noise, "");
        let a_out = graph.get_node(a).unwrap().output_port().unwrap();
        let b_out = graph.get_node(b).unwrap().output_port().unwrap();
        let noise_in = graph.get_node(noise).unwrap().input_port().unwrap();

        let first = graph.connect(a_out, noise_in).unwrap();
        let second = graph.connect(b_out, noise_in);

        assert_eq!(
            second,
            Err(GraphError::PortAlreadyConnected {
                port: noise_in,
                existing: first
            })
        );
        assert_eq!(graph.link_count(), 1);
        let link = graph.get_link(first).unwrap();
        assert_eq!((link.from, link.to), (a_out, noise_in));
    }

    #[test]
    fn test_output_fans_out() {
        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        let contrast = graph.add_node(NodeKind::Contrast, "");

        graph.connect_nodes(load, blur).unwrap();
        graph.connect_nodes(load, contrast).unwrap();

        assert_eq!(graph.links_from(load).count(), 2);
        assert_eq!(graph.successors(load), vec![blur, contrast]);
    }

    #[test]
    fn test_connect_nodes_fills_blend_slots_in_order() {
        let mut graph = ProcessingGraph::new();
        let a = graph.add_node(NodeKind::Load, "");
        let b = graph.add_node(NodeKind::Load, "");
        let c = graph.add_node(NodeKind::Load, "");
        let blend = graph.add_node(NodeKind::Blend, "");
        let output = graph.add_node(NodeKind::Output, "");

        let base = graph.connect_nodes(a, blend).unwrap();
        graph.connect_nodes(b, blend).unwrap();
        let ports = graph.get_node(blend).unwrap().input_ports().to_vec();
        assert_eq!(graph.get_link(base).unwrap().to, ports[0]);

        assert_eq!(graph.connect_nodes(c, blend), Err(GraphError::NoFreeInput(blend)));
        assert_eq!(graph.connect_nodes(output, a), Err(GraphError::NoOutputPort(output)));
    }

    #[test]
    fn test_remove_node_cascades_links() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(
            &mut graph,
            &[NodeKind::Load, NodeKind::Brightness, NodeKind::Blur, NodeKind::Output],
        );
        let removed = graph.remove_node(ids[1]).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 1);
        for link in graph.links() {
            assert!(!removed.owns_port(link.from));
            assert!(!removed.owns_port(link.to));
        }
        for port in removed.input_ports().iter().chain(removed.output_port().iter()) {
            assert!(graph.port(*port).is_none());
        }
        assert_eq!(graph.remove_node(ids[1]).unwrap_err(), GraphError::NodeNotFound(ids[1]));
    }

    #[test]
    fn test_disconnect() {
        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        let link = graph.connect_nodes(load, blur).unwrap();

        graph.disconnect(link).unwrap();
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.disconnect(link), Err(GraphError::LinkNotFound(link)));
    }

    #[test]
    fn test_lookups_return_none_when_missing() {
        let mut graph = ProcessingGraph::new();
        let load = graph.add_node(NodeKind::Load, "");
        let blur = graph.add_node(NodeKind::Blur, "");
        let load_out = graph.get_node(load).unwrap().output_port().unwrap();
        let blur_in = graph.get_node(blur).unwrap().input_port().unwrap();

        assert!(graph.find_node_by_id(NodeId(42)).is_none());
        assert!(graph.find_node_by_output_port(blur_in).is_none());
        assert!(graph.find_link_into_input_port(blur_in).is_none());
        assert_eq!(graph.find_node_by_output_port(load_out).map(|n| n.id), Some(load));
    }

    #[test]
    fn test_set_parameter_rejects_and_keeps_value() {
        let mut graph = ProcessingGraph::new();
        let bright = graph.add_node(NodeKind::Brightness, "");

        graph.set_parameter(bright, "offset", 40).unwrap();
        let err = graph.set_parameter(bright, "offset", 400).unwrap_err();

        assert!(matches!(err, GraphError::InvalidParameter { node_id, .. } if node_id == bright));
        assert_eq!(
            graph.get_node(bright).unwrap().get_parameter("offset"),
            Some(Value::Integer(40))
        );
    }

    #[test]
    fn test_parameter_change_invalidates_downstream_only() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(
            &mut graph,
            &[NodeKind::Load, NodeKind::Brightness, NodeKind::Blur, NodeKind::Output],
        );
        let image = Image::new(image::DynamicImage::new_rgb8(1, 1));
        let results: HashMap<NodeId, Image> =
            ids.iter().map(|id| (*id, image.clone())).collect();
        assert!(graph.commit_results(graph.generation(), &results));

        graph.set_parameter(ids[1], "offset", 10).unwrap();

        assert!(graph.cached_result(ids[0]).is_some());
        assert!(graph.cached_result(ids[1]).is_none());
        assert!(graph.cached_result(ids[2]).is_none());
        assert!(graph.cached_result(ids[3]).is_none());
    }

    #[test]
    fn test_structural_change_invalidates_everything() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(&mut graph, &[NodeKind::Load, NodeKind::Blur]);
        let extra = graph.add_node(NodeKind::Contrast, "");
        let image = Image::new(image::DynamicImage::new_rgb8(1, 1));
        let results: HashMap<NodeId, Image> =
            ids.iter().map(|id| (*id, image.clone())).collect();
        assert!(graph.commit_results(graph.generation(), &results));

        graph.connect_nodes(ids[1], extra).unwrap();

        assert!(graph.nodes().all(|n| n.cached_result().is_none()));
    }

    #[test]
    fn test_disconnect_invalidates_everything() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(&mut graph, &[NodeKind::Load, NodeKind::Blur, NodeKind::Output]);
        let image = Image::new(image::DynamicImage::new_rgb8(1, 1));
        let results: HashMap<NodeId, Image> =
            ids.iter().map(|id| (*id, image.clone())).collect();
        assert!(graph.commit_results(graph.generation(), &results));
        assert!(ids.iter().all(|id| graph.cached_result(*id).is_some()));

        let last = graph.links().last().unwrap().id;
        graph.disconnect(last).unwrap();

        assert!(ids.iter().all(|id| graph.cached_result(*id).is_none()));
    }

    #[test]
    fn test_remove_node_invalidates_everything() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(&mut graph, &[NodeKind::Load, NodeKind::Blur, NodeKind::Output]);
        let image = Image::new(image::DynamicImage::new_rgb8(1, 1));
        let results: HashMap<NodeId, Image> =
            ids.iter().map(|id| (*id, image.clone())).collect();
        assert!(graph.commit_results(graph.generation(), &results));

        graph.remove_node(ids[2]).unwrap();

        assert!(graph.cached_result(ids[0]).is_none());
        assert!(graph.cached_result(ids[1]).is_none());
        assert!(graph.nodes().all(|n| n.cached_result().is_none()));
    }

    #[test]
    fn test_results_from_an_older_generation_are_discarded() {
        let mut graph = ProcessingGraph::new();
        let bright = graph.add_node(NodeKind::Brightness, "");
        let before = graph.generation();
        let image = Image::new(image::DynamicImage::new_rgb8(1, 1));
        let results = HashMap::from([(bright, image)]);

        graph.set_parameter(bright, "offset", 90).unwrap();
        assert_ne!(graph.generation(), before);

        assert!(!graph.commit_results(before, &results));
        assert!(graph.cached_result(bright).is_none());
    }

    #[test]
    fn test_upstream_downstream() {
        let mut graph = ProcessingGraph::new();
        let ids = chain(&mut graph, &[NodeKind::Load, NodeKind::Blur, NodeKind::Output]);

        let downstream = graph.get_downstream(ids[0]);
        assert_eq!(downstream.len(), 2);
        assert!(downstream.contains(&ids[1]));
        assert!(downstream.contains(&ids[2]));

        let upstream = graph.get_upstream(ids[2]);
        assert_eq!(upstream.len(), 2);
        assert!(upstream.contains(&ids[0]));
        assert!(upstream.contains(&ids[1]));
    }

    #[test]
    fn test_downstream_terminates_on_cycle() {
        let mut graph = ProcessingGraph::new();
        let a = graph.add_node(NodeKind::Brightness, "a");
        let b = graph.add_node(NodeKind::Brightness, "b");
        graph.connect_nodes(a, b).unwrap();
        graph.connect_nodes(b, a).unwrap();

        assert_eq!(graph.get_downstream(a), vec![b]);
    }
}
