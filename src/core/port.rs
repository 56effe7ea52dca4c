//! Ports: the attachment points links connect to.
//!
//! A port only exists as part of its owning node. The graph keeps an index
//! from [`PortId`] to [`Port`] so links can be resolved without scanning nodes.

use crate::core::error::{NodeId, PortId};
use serde::{Deserialize, Serialize};

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// A port owned by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    /// Graph-wide unique id.
    pub id: PortId,
    /// Input or output.
    pub direction: PortDirection,
    /// The node this port belongs to.
    pub node_id: NodeId,
}

impl Port {
    /// Create an input port.
    pub fn input(id: PortId, node_id: NodeId) -> Self {
        Self {
            id,
            direction: PortDirection::Input,
            node_id,
        }
    }

    /// Create an output port.
    pub fn output(id: PortId, node_id: NodeId) -> Self {
        Self {
            id,
            direction: PortDirection::Output,
            node_id,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }
}
