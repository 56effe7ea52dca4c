//! Link type for the graph.

use crate::core::error::{LinkId, PortId};
use serde::{Deserialize, Serialize};

/// A directed edge from an output port to an input port.
///
/// A link does not own its endpoints; it only names their ports. The graph
/// removes a link whenever the node owning either port is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier for this link.
    pub id: LinkId,
    /// Source (output) port.
    pub from: PortId,
    /// Target (input) port.
    pub to: PortId,
}

impl Link {
    /// Create a new link.
    pub fn new(id: LinkId, from: PortId, to: PortId) -> Self {
        Self { id, from, to }
    }

    /// Whether either endpoint is `port`.
    pub fn touches(&self, port: PortId) -> bool {
        self.from == port || self.to == port
    }
}
