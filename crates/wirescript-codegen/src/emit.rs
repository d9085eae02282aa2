//! Code emission: bottom-up fold over evaluation trees into JavaScript.
//!
//! Each folded tree position supplies three things upward: the name of
//! the variable holding its result, whether that result is pending (a
//! promise resolving later), and the statements already needed to
//! produce it. A parent concatenates its children's statements, appends
//! its own call, and passes the bundle on; a root's bundle is the whole
//! tree's statement sequence.
//!
//! Function declarations are collected on the side, one per distinct
//! resolved definition in first-appearance order, and assembled ahead
//! of the statements.

use std::collections::HashMap;

use indexmap::IndexMap;

use wirescript_core::graph::Graph;
use wirescript_core::id::NodeId;
use wirescript_core::node::{ConstantNode, FunctionNode, Node};

use crate::error::CompileError;
use crate::forest::{build_forest, TreeNode};
use crate::introspect;
use crate::CompileOptions;

/// Compiles a graph snapshot to runnable source text.
///
/// Pure and deterministic: the same snapshot always yields byte-identical
/// text. Any error leaves no partial output.
pub fn compile(graph: &Graph, options: &CompileOptions) -> Result<String, CompileError> {
    let forest = build_forest(graph)?;

    let mut emitter = Emitter::new(graph, options);
    let mut statements: Vec<String> = Vec::new();
    for tree in &forest {
        let folded = tree.try_fold(&mut |node, children| emitter.emit_node(node, children))?;
        statements.extend(folded.statements);
    }

    let declarations: Vec<String> = emitter
        .declarations
        .values()
        .map(|d| format!("const {} = {}", d.var, d.code))
        .collect();

    Ok(format!(
        "{}\n\n{}",
        declarations.join("\n"),
        statements.join("\n")
    ))
}

/// Validates a graph without emitting: structure (ids, edges, cycles),
/// reference chains, and introspection of every function definition.
pub fn check(graph: &Graph) -> Result<(), CompileError> {
    graph.validate()?;
    for node in graph.nodes() {
        match node {
            Node::Constant(_) => {}
            Node::Function(f) => {
                introspect::parameter_names(&f.code)?;
            }
            Node::Reference(r) => {
                let origin = graph.resolve_origin(r.id)?;
                introspect::parameter_names(&origin.code)?;
            }
        }
    }
    Ok(())
}

/// A folded tree position: what a parent needs to consume this result.
struct Emitted {
    /// Result name without the pending suffix; what a continuation binds.
    name: String,
    /// The parameter slot this result feeds, copied from the tree.
    to_index: Option<u16>,
    /// Whether the result is a promise resolving later.
    pending: bool,
    /// Statements producing this result, dependencies first.
    statements: Vec<String>,
}

impl Emitted {
    /// The declared variable name: pending results carry a `_p` suffix.
    fn var(&self) -> String {
        if self.pending {
            format!("{}_p", self.name)
        } else {
            self.name.clone()
        }
    }
}

struct Declaration {
    var: String,
    code: String,
}

struct Emitter<'a> {
    graph: &'a Graph,
    options: &'a CompileOptions,
    /// One declaration per distinct resolved definition, keyed by the
    /// origin's id; insertion order is first-appearance order.
    declarations: IndexMap<NodeId, Declaration>,
    /// Occurrence counts per result-variable base, so fan-out
    /// duplication of a node still yields distinct `const` bindings.
    result_names: HashMap<String, u32>,
}

impl<'a> Emitter<'a> {
    fn new(graph: &'a Graph, options: &'a CompileOptions) -> Self {
        Emitter {
            graph,
            options,
            declarations: IndexMap::new(),
            result_names: HashMap::new(),
        }
    }

    fn emit_node(
        &mut self,
        tree: &TreeNode,
        children: Vec<Emitted>,
    ) -> Result<Emitted, CompileError> {
        match self.graph.node(tree.id)? {
            Node::Constant(constant) => {
                let constant = constant.clone();
                Ok(self.emit_constant(&constant, tree))
            }
            Node::Function(_) | Node::Reference(_) => self.emit_call(tree, children),
        }
    }

    fn emit_constant(&mut self, constant: &ConstantNode, tree: &TreeNode) -> Emitted {
        let name = self.result_name(&constant.name, constant.id);
        let statements = vec![format!("const {} = {}", name, constant.value)];
        Emitted {
            name,
            to_index: tree.to_index,
            pending: false,
            statements,
        }
    }

    fn emit_call(
        &mut self,
        tree: &TreeNode,
        children: Vec<Emitted>,
    ) -> Result<Emitted, CompileError> {
        let graph = self.graph;
        let origin = graph.resolve_origin(tree.id)?;
        let arity = introspect::parameter_names(&origin.code)?.len();

        let func_var = self.function_var(origin);
        let name = self.result_name(&origin.name, tree.id);

        // One argument expression per declared parameter; unwired slots
        // stay `undefined`. Inside a continuation every pending input is
        // referred to by its resolved (suffix-free) name, which is also
        // what the combinator binds.
        let mut waits: Vec<&Emitted> = Vec::new();
        let mut args: Vec<&str> = Vec::with_capacity(arity);
        for index in 0..arity as u16 {
            match children.iter().find(|c| c.to_index == Some(index)) {
                Some(child) => {
                    if child.pending {
                        waits.push(child);
                    }
                    args.push(&child.name);
                }
                None => args.push("undefined"),
            }
        }

        let pending = origin.is_async || !waits.is_empty();
        let call = format!("{}({})", func_var, args.join(", "));
        let result_var = if pending {
            format!("{name}_p")
        } else {
            name.clone()
        };
        let statement = if waits.is_empty() {
            format!("const {result_var} = {call}")
        } else {
            let waited = if waits.len() == 1 {
                waits[0].var()
            } else {
                let vars: Vec<String> = waits.iter().map(|c| c.var()).collect();
                format!("Promise.all([{}])", vars.join(", "))
            };
            let binders = if waits.len() == 1 {
                waits[0].name.clone()
            } else {
                let names: Vec<&str> = waits.iter().map(|c| c.name.as_str()).collect();
                format!("([{}])", names.join(", "))
            };
            format!("const {result_var} = {waited}.then({binders} =>\n  {call}\n)")
        };

        let mut statements: Vec<String> = Vec::new();
        for child in &children {
            statements.extend_from_slice(&child.statements);
        }
        statements.push(statement);

        Ok(Emitted {
            name,
            to_index: tree.to_index,
            pending,
            statements,
        })
    }

    /// The declared variable for a resolved definition, registering the
    /// declaration on first sight.
    ///
    /// Preferred name is the definition's own; a reserved identifier
    /// gets the `__` prefix, and a clash with another definition's
    /// variable is disambiguated with the origin id.
    fn function_var(&mut self, origin: &FunctionNode) -> String {
        if let Some(declaration) = self.declarations.get(&origin.id) {
            return declaration.var.clone();
        }

        let base = identifier_fragment(&origin.name);
        let mut var = if base.is_empty() {
            format!("func{}", origin.id)
        } else {
            base
        };
        if self.options.reserved_globals.contains(&var) {
            var = format!("__{var}");
        }
        if self.declarations.values().any(|d| d.var == var) {
            var = format!("{var}_{}", origin.id);
        }

        self.declarations.insert(
            origin.id,
            Declaration {
                var: var.clone(),
                code: origin.code.clone(),
            },
        );
        var
    }

    /// Result-variable base for one tree position: the resolved name
    /// plus the position's own node id, with an occurrence counter when
    /// fan-out expands the same node more than once.
    fn result_name(&mut self, label: &str, id: NodeId) -> String {
        let fragment = identifier_fragment(label);
        let base = if fragment.is_empty() {
            format!("node_out{id}")
        } else {
            format!("{fragment}_out{id}")
        };
        let count = self.result_names.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        }
    }
}

/// Reduces a display name to identifier characters. May return an empty
/// string; callers supply their own fallback.
fn identifier_fragment(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    match kept.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{kept}"),
        _ => kept,
    }
}
