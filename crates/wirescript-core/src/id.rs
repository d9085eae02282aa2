//! Stable ID newtype for graph nodes.
//!
//! `NodeId` is a newtype wrapper over `u32`, providing type safety so that
//! a node id cannot be accidentally confused with a parameter index or any
//! other integer floating through the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier, unique within a graph snapshot.
///
/// Ids are assigned by [`Graph`](crate::graph::Graph) as
/// max-existing-id + 1, so they survive arbitrary node removal without
/// reuse inside a single editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
