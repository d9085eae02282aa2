//! Structural error types for the graph model.
//!
//! Uses `thiserror` for structured, matchable error variants. Every
//! variant is fatal to a compile: the graph is produced by an editor, so
//! each error here is an upstream invariant violation rather than a
//! recoverable condition.

use crate::id::NodeId;
use thiserror::Error;

/// Structural errors produced by the wirescript-core graph model.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node id was not found in the graph.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// More than one node shares an id.
    #[error("duplicate node id: NodeId({id})", id = id.0)]
    DuplicateId { id: NodeId },

    /// An edge references a nonexistent node.
    #[error("dangling edge: {from} -> {to}")]
    DanglingEdge { from: NodeId, to: NodeId },

    /// A reference chain failed to terminate at a function node.
    #[error("broken reference chain starting at NodeId({id})", id = id.0)]
    BrokenReference { id: NodeId },

    /// The data-flow edge set contains a cycle.
    #[error("cycle detected through NodeId({id})", id = id.0)]
    CyclicGraph { id: NodeId },
}
