//! Compile error types.
//!
//! The compiler either returns the full generated text or one of these
//! errors; there is no partial output and no structured diagnostics
//! object. Structural problems keep their `GraphError` identity, and a
//! failed introspection keeps its own type, so callers can match on the
//! exact failure.

use thiserror::Error;
use wirescript_core::error::GraphError;

/// A node's code does not parse into a function expression.
///
/// No function variable can be declared from such text, so this aborts
/// compilation of the whole graph.
#[derive(Debug, Clone, Error)]
#[error("not a function expression: {code}")]
pub struct MalformedFunctionExpression {
    /// The offending source text.
    pub code: String,
}

/// Errors surfaced by the graph-to-code compiler.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Structural problem in the input graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A node's code could not be introspected.
    #[error(transparent)]
    MalformedFunction(#[from] MalformedFunctionExpression),
}
