//! Directed wires between nodes.
//!
//! An edge feeds the output of one node into a specific parameter slot
//! of another. The graph holds at most one edge per `(to, to_index)`
//! pair; a parameter can only be driven by one producer.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// A directed wire: `from`'s output feeds `to`'s parameter at position
/// `to_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub to_index: u16,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(from: NodeId, to: NodeId, to_index: u16) -> Self {
        Edge { from, to, to_index }
    }

    /// Returns `true` if the edge touches `id` on either endpoint.
    pub fn touches(&self, id: NodeId) -> bool {
        self.from == id || self.to == id
    }
}
