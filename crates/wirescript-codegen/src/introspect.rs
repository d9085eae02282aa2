//! Function introspection: recovering parameter names from source text.
//!
//! A node's arity is never stored; it is derived from the function
//! expression the user wrote. This module understands the expression
//! forms the editor produces -- arrow functions (`x => ...`,
//! `(a, b) => ...`) and `function` expressions, optionally `async` --
//! and extracts the ordered parameter names from the head. Bodies are
//! never analyzed.

use std::sync::OnceLock;

use regex::Regex;

use wirescript_core::graph::Graph;
use wirescript_core::id::NodeId;
use wirescript_core::node::Node;

use crate::error::{CompileError, MalformedFunctionExpression};

fn comment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*|/\*(?s:.*?)\*/").unwrap())
}

fn identifier_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap())
}

/// Returns the ordered parameter names declared by `code`.
///
/// The count is the node's arity. Text that does not parse into a
/// function expression raises [`MalformedFunctionExpression`].
pub fn parameter_names(code: &str) -> Result<Vec<String>, MalformedFunctionExpression> {
    let stripped = comment_pattern().replace_all(code, "");
    let text = stripped.trim();
    let malformed = || MalformedFunctionExpression {
        code: code.to_string(),
    };

    let text = match text.strip_prefix("async") {
        Some(rest) if rest.starts_with(|c: char| c.is_whitespace()) || rest.starts_with('(') => {
            rest.trim_start()
        }
        _ => text,
    };

    // `function` expression, possibly named, possibly a generator.
    if let Some(rest) = text.strip_prefix("function") {
        if rest.starts_with(|c: char| c.is_whitespace())
            || rest.starts_with('(')
            || rest.starts_with('*')
        {
            let mut rest = rest.strip_prefix('*').unwrap_or(rest).trim_start();
            if let Some(m) = identifier_pattern().find(rest) {
                if m.start() == 0 {
                    rest = rest[m.end()..].trim_start();
                }
            }
            if !rest.starts_with('(') {
                return Err(malformed());
            }
            let (inner, _) = take_paren_group(rest).ok_or_else(malformed)?;
            return parse_parameter_list(inner, code);
        }
    }

    // Parenthesized arrow head: `(a, b) => ...`
    if text.starts_with('(') {
        let (inner, tail) = take_paren_group(text).ok_or_else(malformed)?;
        if !tail.trim_start().starts_with("=>") {
            return Err(malformed());
        }
        return parse_parameter_list(inner, code);
    }

    // Bare-identifier arrow: `x => ...`
    if let Some(m) = identifier_pattern().find(text) {
        if m.start() == 0 && text[m.end()..].trim_start().starts_with("=>") {
            return Ok(vec![m.as_str().to_string()]);
        }
    }

    Err(malformed())
}

/// Parameter names of the function a node resolves to; what the editor
/// shows as the node's input pins. Constants have no inputs.
pub fn input_names(graph: &Graph, id: NodeId) -> Result<Vec<String>, CompileError> {
    match graph.node(id)? {
        Node::Constant(_) => Ok(Vec::new()),
        _ => {
            let origin = graph.resolve_origin(id)?;
            Ok(parameter_names(&origin.code)?)
        }
    }
}

/// Extracts the group opened by the leading `(`, returning the inner
/// text and the remainder after the matching `)`. Nested brackets and
/// string literals (with escapes) are skipped over.
fn take_paren_group(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            },
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        if ch != ')' {
                            return None;
                        }
                        return Some((&text[1..i], &text[i + 1..]));
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Splits `inner` on commas at bracket depth zero, outside strings.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (i, ch) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => match ch {
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            },
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&inner[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&inner[start..]);
    parts
}

fn parse_parameter_list(
    inner: &str,
    source: &str,
) -> Result<Vec<String>, MalformedFunctionExpression> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(inner)
        .into_iter()
        .map(|segment| {
            // The name is the first identifier in the segment; this
            // drops default-value and rest syntax, and picks the first
            // binding out of a destructuring pattern.
            identifier_pattern()
                .find(segment)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| MalformedFunctionExpression {
                    code: source.to_string(),
                })
        })
        .collect()
}
