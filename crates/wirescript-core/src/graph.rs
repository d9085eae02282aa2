//! The wiring graph: node/edge collections with lookup, classification,
//! and structural validation.
//!
//! [`Graph`] is the single entry point for constructing and querying a
//! program. All mutations go through its builder methods so the model
//! invariants hold: fresh ids are max-existing-id + 1, a `(to, to_index)`
//! parameter slot carries at most one edge, and removing a node cascades
//! to its edges and to every reference aliasing it.
//!
//! The compiler downstream treats a `Graph` as an immutable snapshot; it
//! only uses the read-only queries and the validation pass.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::error::GraphError;
use crate::id::NodeId;
use crate::node::{ConstantNode, FunctionNode, Node, ReferenceNode};

/// A snapshot of the visual program: typed nodes plus directed wires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Graph::default()
    }

    /// Constructs a graph from already-built parts, e.g. a deserialized
    /// editor snapshot. No invariants are checked here; callers run
    /// [`Graph::validate`] (the compiler always does).
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Graph { nodes, edges }
    }

    // -----------------------------------------------------------------------
    // Node builders
    // -----------------------------------------------------------------------

    /// The id the next inserted node will receive.
    pub fn next_node_id(&self) -> NodeId {
        NodeId(
            self.nodes
                .iter()
                .map(|n| n.id().0)
                .max()
                .map_or(0, |max| max + 1),
        )
    }

    fn insert(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id();
        node.set_id(id);
        self.nodes.push(node);
        id
    }

    /// Adds a function definition node.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        is_async: bool,
    ) -> NodeId {
        self.insert(Node::Function(FunctionNode {
            id: NodeId(0),
            name: name.into(),
            code: code.into(),
            is_async,
        }))
    }

    /// Adds a constant (literal source) node.
    pub fn add_constant(&mut self, name: impl Into<String>, value: impl Into<String>) -> NodeId {
        self.insert(Node::Constant(ConstantNode {
            id: NodeId(0),
            name: name.into(),
            value: value.into(),
        }))
    }

    /// Adds a reference node aliasing `target`.
    ///
    /// Referencing a reference flattens one hop: the new node points at
    /// the existing node's own target, keeping chains shallow. The
    /// target must exist and must not be a constant.
    pub fn add_reference(&mut self, target: NodeId) -> Result<NodeId, GraphError> {
        let reference = match self.node(target)? {
            Node::Function(_) => target,
            Node::Reference(r) => r.reference,
            Node::Constant(_) => return Err(GraphError::BrokenReference { id: target }),
        };
        Ok(self.insert(Node::Reference(ReferenceNode {
            id: NodeId(0),
            reference,
        })))
    }

    /// Copies a node under a fresh id. Wiring is not copied.
    pub fn duplicate_node(&mut self, id: NodeId) -> Result<NodeId, GraphError> {
        let copy = self.node(id)?.clone();
        Ok(self.insert(copy))
    }

    /// Removes a node, every edge touching it, and (recursively) every
    /// reference node aliasing it.
    pub fn remove_node(&mut self, id: NodeId) {
        self.nodes.retain(|n| n.id() != id);
        self.edges.retain(|e| !e.touches(id));

        let dependents: Vec<NodeId> = self
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Reference(r) if r.reference == id => Some(r.id),
                _ => None,
            })
            .collect();
        for dependent in dependents {
            self.remove_node(dependent);
        }
    }

    // -----------------------------------------------------------------------
    // Edge builders
    // -----------------------------------------------------------------------

    /// Wires `from`'s output into `to`'s parameter slot `to_index`.
    ///
    /// Both endpoints must exist. If the `(to, to_index)` slot is
    /// already driven, the call is a no-op and returns `false`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, to_index: u16) -> Result<bool, GraphError> {
        self.node(from)?;
        self.node(to)?;
        if self.edge_into(to, to_index).is_some() {
            return Ok(false);
        }
        self.edges.push(Edge::new(from, to, to_index));
        Ok(true)
    }

    /// Removes every edge leaving `from`.
    pub fn remove_edges_from(&mut self, from: NodeId) {
        self.edges.retain(|e| e.from != from);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Looks up the node with the given id.
    ///
    /// Errors with [`GraphError::DuplicateId`] if more than one node
    /// carries the id; a snapshot built through the builder methods
    /// never does, but deserialized input can.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        let mut found = None;
        for node in &self.nodes {
            if node.id() == id {
                if found.is_some() {
                    return Err(GraphError::DuplicateId { id });
                }
                found = Some(node);
            }
        }
        found.ok_or(GraphError::NodeNotFound { id })
    }

    /// Mutable lookup, with the same duplicate handling as [`Graph::node`].
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        let mut found = None;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id() == id {
                if found.is_some() {
                    return Err(GraphError::DuplicateId { id });
                }
                found = Some(i);
            }
        }
        match found {
            Some(i) => Ok(&mut self.nodes[i]),
            None => Err(GraphError::NodeNotFound { id }),
        }
    }

    /// Edges arriving at `id`, in insertion order.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// The edge driving parameter slot `(to, to_index)`, if any.
    pub fn edge_into(&self, to: NodeId, to_index: u16) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.to == to && e.to_index == to_index)
    }

    /// Follows a reference chain to the function definition it aliases.
    ///
    /// A function node resolves to itself. A chain that revisits a node,
    /// reaches a constant, or dangles is a broken reference.
    pub fn resolve_origin(&self, id: NodeId) -> Result<&FunctionNode, GraphError> {
        let mut visited = HashSet::new();
        let mut current = id;
        loop {
            if !visited.insert(current) {
                return Err(GraphError::BrokenReference { id });
            }
            let node = match self.node(current) {
                Ok(node) => node,
                // The chain start not existing is the caller's lookup error;
                // a later hop missing means the chain itself is broken.
                Err(GraphError::NodeNotFound { .. }) if current != id => {
                    return Err(GraphError::BrokenReference { id })
                }
                Err(err) => return Err(err),
            };
            match node {
                Node::Function(f) => return Ok(f),
                Node::Reference(r) => current = r.reference,
                Node::Constant(_) => return Err(GraphError::BrokenReference { id }),
            }
        }
    }

    /// Returns `name`, or `name2`, `name3`, ... -- the first variant no
    /// existing node uses.
    pub fn unique_name(&self, base: &str) -> String {
        let taken = |candidate: &str| self.nodes.iter().any(|n| n.name() == Some(candidate));
        if !taken(base) {
            return base.to_string();
        }
        let mut count = 2;
        loop {
            let candidate = format!("{base}{count}");
            if !taken(&candidate) {
                return candidate;
            }
            count += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Errors if any id is carried by more than one node.
    pub fn ensure_unique_ids(&self) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id()) {
                return Err(GraphError::DuplicateId { id: node.id() });
            }
        }
        Ok(())
    }

    /// Errors if any edge endpoint fails to resolve to exactly one node.
    pub fn ensure_edges_resolve(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            for endpoint in [edge.from, edge.to] {
                if let Err(err) = self.node(endpoint) {
                    return Err(match err {
                        GraphError::NodeNotFound { .. } => GraphError::DanglingEdge {
                            from: edge.from,
                            to: edge.to,
                        },
                        other => other,
                    });
                }
            }
        }
        Ok(())
    }

    /// Errors if the edge set contains a cycle.
    ///
    /// Builds a petgraph view of the wiring and topologically sorts it;
    /// the reported id is one node on the offending cycle.
    pub fn ensure_acyclic(&self) -> Result<(), GraphError> {
        let mut view = DiGraph::<NodeId, ()>::new();
        let mut indices: HashMap<NodeId, NodeIndex<u32>> = HashMap::new();
        for node in &self.nodes {
            indices
                .entry(node.id())
                .or_insert_with(|| view.add_node(node.id()));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (indices.get(&edge.from), indices.get(&edge.to)) {
                view.add_edge(from, to, ());
            }
        }
        match toposort(&view, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(GraphError::CyclicGraph {
                id: view[cycle.node_id()],
            }),
        }
    }

    /// Runs the full structural validation pass: unique ids, resolvable
    /// edge endpoints, acyclic wiring.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.ensure_unique_ids()?;
        self.ensure_edges_resolve()?;
        self.ensure_acyclic()
    }
}
