//! Graph-to-code compilation for wirescript programs.
//!
//! This crate turns a `wirescript-core` graph snapshot into
//! dependency-ordered, runnable JavaScript text.
//!
//! # Modules
//!
//! - [`introspect`] -- Parameter-name recovery from function source text
//! - [`forest`] -- DAG decomposition into per-sink evaluation trees
//! - [`emit`] -- Bottom-up statement emission and assembly
//! - [`error`] -- Error types for all compilation failure modes

pub mod emit;
pub mod error;
pub mod forest;
pub mod introspect;

pub use emit::{check, compile};
pub use error::{CompileError, MalformedFunctionExpression};
pub use forest::{build_forest, TreeNode};
pub use introspect::{input_names, parameter_names};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifiers the emitter must not shadow with a function variable:
/// host globals the generated code is expected to call, plus keywords.
/// Collisions are escaped with a `__` prefix.
const DEFAULT_RESERVED_GLOBALS: &[&str] = &[
    // Host globals
    "alert",
    "clearInterval",
    "clearTimeout",
    "confirm",
    "console",
    "document",
    "eval",
    "fetch",
    "globalThis",
    "prompt",
    "setInterval",
    "setTimeout",
    "window",
    // Standard built-ins
    "Array",
    "Boolean",
    "Date",
    "Infinity",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Set",
    "String",
    "Symbol",
    // Keywords and keyword-like literals
    "async",
    "await",
    "class",
    "const",
    "delete",
    "else",
    "false",
    "for",
    "function",
    "if",
    "in",
    "let",
    "new",
    "null",
    "of",
    "return",
    "this",
    "true",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "yield",
];

/// Options controlling code emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Identifiers a function variable must not take verbatim. Injected
    /// rather than read from a live global namespace, so emission stays
    /// pure and deterministic.
    pub reserved_globals: BTreeSet<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            reserved_globals: DEFAULT_RESERVED_GLOBALS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CompileOptions {
    /// Extends the reserved set with additional identifiers.
    pub fn reserve(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.reserved_globals.extend(names);
        self
    }
}
