//! Core graph data model for wirescript.
//!
//! A wirescript program is a DAG of function, reference, and constant
//! nodes wired together by indexed edges. This crate owns the node/edge
//! types, the [`graph::Graph`] container with its builder and query
//! methods, and structural validation. Turning a graph into runnable
//! source text lives in `wirescript-codegen`.

pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;

// Re-export commonly used types
pub use edge::Edge;
pub use error::GraphError;
pub use graph::Graph;
pub use id::NodeId;
pub use node::{ConstantNode, FunctionNode, Node, ReferenceNode};
