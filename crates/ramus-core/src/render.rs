//! String rendering of expression trees.
//!
//! Arithmetic binary operators render infix and parenthesized; everything
//! else renders prefix as `name(arg)` / `name(arg1, arg2)`. The `safe_*`
//! operator names rewrite to their plain mathematical names. Rendering is
//! total: an operator index missing from the registry renders as
//! `unary_k` / `binary_k`, because error messages rely on rendering never
//! failing.

use std::fmt::Write;

use crate::element::Element;
use crate::node::{Node, NodeId};
use crate::registry::OperatorSet;
use crate::tree::Tree;

/// Operator names rendered in infix position.
const INFIX: [&str; 5] = ["+", "-", "*", "/", "^"];

/// Canonical display rewrites for the builtin safe operator names.
fn display_name(name: &str) -> &str {
    match name {
        "safe_log" => "log",
        "safe_log2" => "log2",
        "safe_log10" => "log10",
        "safe_log1p" => "log1p",
        "safe_acosh" => "acosh",
        "safe_sqrt" => "sqrt",
        "safe_pow" => "^",
        other => other,
    }
}

/// Renders a tree against a registry's operator names.
///
/// Variables render as `xK`, or as `var_names[K-1]` when a name table is
/// supplied and long enough; constants render through their [`Element`]
/// `Display` form. The registry's element type is irrelevant here — only
/// operator names are read — so a tree may be rendered against a registry
/// of any element type, which the generic evaluator's error path uses.
#[must_use]
pub fn string_tree<T: Element, O>(
    tree: &Tree<T>,
    ops: &OperatorSet<O>,
    var_names: Option<&[&str]>,
) -> String {
    let mut out = String::new();
    render_at(tree, tree.root_id(), ops, var_names, &mut out);
    out
}

fn render_at<T: Element, O>(
    tree: &Tree<T>,
    id: NodeId,
    ops: &OperatorSet<O>,
    var_names: Option<&[&str]>,
    out: &mut String,
) {
    match *tree.get(id) {
        Node::Constant(ref value) => {
            let _ = write!(out, "{value}");
        }
        Node::Variable(feature) => match var_names.and_then(|names| names.get(usize::from(feature) - 1)) {
            Some(name) => out.push_str(name),
            None => {
                let _ = write!(out, "x{feature}");
            }
        },
        Node::Unary { op, child } => {
            let name = ops
                .get_unary(op)
                .map_or_else(|| format!("unary_{op}"), |u| display_name(u.name()).to_string());
            out.push_str(&name);
            out.push('(');
            render_at(tree, child, ops, var_names, out);
            out.push(')');
        }
        Node::Binary { op, left, right } => {
            let name = ops
                .get_binary(op)
                .map_or_else(|| format!("binary_{op}"), |b| display_name(b.name()).to_string());
            if INFIX.contains(&name.as_str()) {
                out.push('(');
                render_at(tree, left, ops, var_names, out);
                let _ = write!(out, " {name} ");
                render_at(tree, right, ops, var_names, out);
                out.push(')');
            } else {
                out.push_str(&name);
                out.push('(');
                render_at(tree, left, ops, var_names, out);
                out.push_str(", ");
                render_at(tree, right, ops, var_names, out);
                out.push(')');
            }
        }
    }
}
