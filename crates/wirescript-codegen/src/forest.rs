//! Forest building: decomposing the wiring DAG into evaluation trees.
//!
//! Each terminal (sink) node -- incoming edges present, no outgoing
//! edges -- becomes the root of an independent evaluation tree, built by
//! walking incoming edges backward. A node feeding several consumers is
//! expanded independently inside each consumer's tree, so its statement
//! runs once per consumer; sharing is per-tree-path, not global.

use std::collections::HashSet;

use wirescript_core::error::GraphError;
use wirescript_core::graph::Graph;
use wirescript_core::id::NodeId;

/// One position in an evaluation tree.
///
/// `id` names the graph node occupying this position (a reference keeps
/// its own id here; resolution to the origin happens at emission).
/// `to_index` is the parameter slot this subtree feeds in its parent,
/// `None` at the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub to_index: Option<u16>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Folds the tree bottom-up: children first, then `f` on this node
    /// with the already-folded child values. The first error aborts the
    /// whole fold.
    pub fn try_fold<S, E>(
        &self,
        f: &mut impl FnMut(&TreeNode, Vec<S>) -> Result<S, E>,
    ) -> Result<S, E> {
        let mut folded = Vec::with_capacity(self.children.len());
        for child in &self.children {
            folded.push(child.try_fold(f)?);
        }
        f(self, folded)
    }

    /// Number of tree positions, this node included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Builds one evaluation tree per terminal node, in node-list order
/// (root-discovery order).
///
/// Runs the structural validation pass first, so a malformed snapshot
/// (duplicate ids, dangling edges, cyclic wiring) fails here rather
/// than during emission. Isolated nodes appear in no tree.
pub fn build_forest(graph: &Graph) -> Result<Vec<TreeNode>, GraphError> {
    graph.validate()?;

    let mut forest = Vec::new();
    for node in graph.nodes() {
        let id = node.id();
        let is_root = graph.outgoing(id).next().is_none() && graph.incoming(id).next().is_some();
        if is_root {
            let mut path = HashSet::new();
            forest.push(expand(graph, id, None, &mut path)?);
        }
    }
    Ok(forest)
}

fn expand(
    graph: &Graph,
    id: NodeId,
    to_index: Option<u16>,
    path: &mut HashSet<NodeId>,
) -> Result<TreeNode, GraphError> {
    // Visit bound: validation already rejects cyclic wiring, but a raw
    // snapshot must never be able to recurse without limit.
    if !path.insert(id) {
        return Err(GraphError::CyclicGraph { id });
    }

    let mut incoming: Vec<_> = graph.incoming(id).collect();
    incoming.sort_by_key(|e| e.to_index);

    let mut children = Vec::with_capacity(incoming.len());
    for edge in incoming {
        children.push(expand(graph, edge.from, Some(edge.to_index), path)?);
    }

    path.remove(&id);
    Ok(TreeNode {
        id,
        to_index,
        children,
    })
}
