//! Node variants of the wiring graph.
//!
//! A graph node is one of three things: a reusable function definition
//! ([`FunctionNode`]), an alias to one ([`ReferenceNode`]), or a literal
//! source ([`ConstantNode`]). The enum is serde-tagged so persisted
//! graphs carry an explicit `"type"` discriminator.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// A reusable function definition placed on the canvas.
///
/// `code` is the function expression's source text exactly as the user
/// wrote it; the declared parameter list (and therefore the arity) is
/// recovered from it by the introspector, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub id: NodeId,
    pub name: String,
    pub code: String,
    /// Whether the function returns a promise-like deferred value.
    #[serde(default)]
    pub is_async: bool,
}

/// An alias sharing another node's code and arity.
///
/// A reference owns independent wiring and its own tree identity; only
/// the definition is shared. References may chain, but resolution must
/// terminate at a [`FunctionNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub id: NodeId,
    pub reference: NodeId,
}

/// A zero-input literal source.
///
/// `value` is spliced into the generated text verbatim, so it must be a
/// literal of the host scripting language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantNode {
    pub id: NodeId,
    pub name: String,
    pub value: String,
}

/// Any node of the wiring graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Function(FunctionNode),
    Reference(ReferenceNode),
    Constant(ConstantNode),
}

impl Node {
    /// Returns the node's id.
    pub fn id(&self) -> NodeId {
        match self {
            Node::Function(n) => n.id,
            Node::Reference(n) => n.id,
            Node::Constant(n) => n.id,
        }
    }

    /// Overwrites the node's id. Used by the graph builder when
    /// allocating fresh ids.
    pub(crate) fn set_id(&mut self, id: NodeId) {
        match self {
            Node::Function(n) => n.id = id,
            Node::Reference(n) => n.id = id,
            Node::Constant(n) => n.id = id,
        }
    }

    /// Returns the node's display name, if it has one of its own.
    /// References carry no name; they borrow their origin's.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Function(n) => Some(&n.name),
            Node::Reference(_) => None,
            Node::Constant(n) => Some(&n.name),
        }
    }

    /// Returns the node kind as a short label.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Function(_) => "function",
            Node::Reference(_) => "reference",
            Node::Constant(_) => "constant",
        }
    }

    /// Returns `true` if this node is a function definition.
    pub fn is_function(&self) -> bool {
        matches!(self, Node::Function(_))
    }

    /// Returns `true` if this node is a reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, Node::Reference(_))
    }

    /// Returns `true` if this node is a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accessors() {
        let f = Node::Function(FunctionNode {
            id: NodeId(3),
            name: "add".into(),
            code: "(a, b) => a + b".into(),
            is_async: false,
        });
        assert_eq!(f.id(), NodeId(3));
        assert_eq!(f.name(), Some("add"));
        assert_eq!(f.kind(), "function");
        assert!(f.is_function());
        assert!(!f.is_reference());

        let r = Node::Reference(ReferenceNode {
            id: NodeId(4),
            reference: NodeId(3),
        });
        assert_eq!(r.id(), NodeId(4));
        assert_eq!(r.name(), None);
        assert!(r.is_reference());

        let c = Node::Constant(ConstantNode {
            id: NodeId(5),
            name: "two".into(),
            value: "2".into(),
        });
        assert_eq!(c.name(), Some("two"));
        assert!(c.is_constant());
    }

    #[test]
    fn serde_uses_type_tag() {
        let c = Node::Constant(ConstantNode {
            id: NodeId(1),
            name: "greeting".into(),
            value: "\"hello\"".into(),
        });
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"type\":\"Constant\""));

        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn is_async_defaults_to_false() {
        let json = r#"{"type":"Function","id":0,"name":"f","code":"x => x"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        match node {
            Node::Function(f) => assert!(!f.is_async),
            _ => panic!("expected function node"),
        }
    }
}
