//! The fast vectorized evaluator.
//!
//! Evaluation is a post-order recursion specialized three ways:
//!
//! 1. A subtree with no variable leaf is evaluated once to a scalar and
//!    broadcast.
//! 2. Dispatch near the root selects fused kernels for the common small
//!    shapes — unary over a unary of a leaf, unary over a binary of two
//!    leaves, binary over leaves — reading constants and feature rows
//!    directly instead of materializing intermediate buffers.
//! 3. Per-element kernels substitute `+∞` for a non-finite element; one
//!    scan of the finished output decides the completeness flag. Kernels
//!    that pre-read a leaf constant return early when it is non-finite.
//!
//! Every specialized path computes exactly what the naive recursion
//! would on all-finite inputs.

use num_traits::Float;

use ramus_core::{Element, Matrix, Node, NodeId, OperatorSet, Tree, UnaryOp};

/// Evaluates `tree` column-wise over `x`, resolving operator indices
/// against `ops`.
///
/// Returns one value per sample column together with the completeness
/// flag. When the flag is false the output buffer may be partially
/// filled and must not be relied upon.
///
/// # Panics
///
/// Panics if the tree references an operator index missing from `ops` or
/// a feature row missing from `x`; both are programming errors, not data
/// errors.
#[must_use]
pub fn eval_tree<T>(tree: &Tree<T>, x: &Matrix<T>, ops: &OperatorSet<T>) -> (Vec<T>, bool)
where
    T: Element + Float,
{
    let mut out = vec![T::zero(); x.num_cols()];
    if !eval_into(tree, tree.root_id(), x, ops, &mut out) {
        return (out, false);
    }
    let complete = out.iter().all(|value| value.is_finite());
    (out, complete)
}

/// Evaluates a tree whose element type differs from the data's by
/// promoting the tree first.
///
/// Emits one `log::warn!` diagnostic per call; a search loop that hits
/// this path is converting on every candidate and should promote its
/// trees up front instead.
#[must_use]
pub fn eval_tree_promoted<T, U>(tree: &Tree<T>, x: &Matrix<U>, ops: &OperatorSet<U>) -> (Vec<U>, bool)
where
    T: Element,
    U: Element + Float + From<T>,
{
    log::warn!("tree element type differs from data element type; promoting the tree before evaluation");
    eval_tree(&tree.convert::<U>(), x, ops)
}

#[inline]
fn finite_or_inf<T: Float>(value: T) -> T {
    if value.is_finite() {
        value
    } else {
        T::infinity()
    }
}

#[inline]
fn feature_row<'a, T: Clone>(x: &'a Matrix<T>, feature: u16) -> &'a [T] {
    x.row(usize::from(feature) - 1)
}

/// Evaluates the subtree at `id` into `out`. Returns false only when an
/// early-return path fired; the final finiteness scan is the caller's.
fn eval_into<T>(tree: &Tree<T>, id: NodeId, x: &Matrix<T>, ops: &OperatorSet<T>, out: &mut [T]) -> bool
where
    T: Element + Float,
{
    // Constant-subtree fast path: one scalar evaluation, then broadcast.
    if !tree.any_at(id, Node::is_variable) {
        return match eval_constant(tree, id, ops) {
            Some(value) => {
                out.fill(value);
                true
            }
            None => false,
        };
    }
    match *tree.get(id) {
        Node::Constant(value) => {
            out.fill(value);
            true
        }
        Node::Variable(feature) => {
            out.copy_from_slice(feature_row(x, feature));
            true
        }
        Node::Unary { op, child } => eval_unary(tree, op, child, x, ops, out),
        Node::Binary { op, left, right } => eval_binary(tree, op, left, right, x, ops, out),
    }
}

/// Scalar recursion for variable-free subtrees. `None` marks a
/// non-finite intermediate.
fn eval_constant<T>(tree: &Tree<T>, id: NodeId, ops: &OperatorSet<T>) -> Option<T>
where
    T: Element + Float,
{
    match *tree.get(id) {
        Node::Constant(value) => value.is_finite().then_some(value),
        // Callers only enter on variable-free subtrees.
        Node::Variable(_) => None,
        Node::Unary { op, child } => {
            let value = ops.unary(op).call(eval_constant(tree, child, ops)?);
            value.is_finite().then_some(value)
        }
        Node::Binary { op, left, right } => {
            let left = eval_constant(tree, left, ops)?;
            let right = eval_constant(tree, right, ops)?;
            let value = ops.binary(op).call(left, right);
            value.is_finite().then_some(value)
        }
    }
}

fn eval_unary<T>(
    tree: &Tree<T>,
    op: u16,
    child: NodeId,
    x: &Matrix<T>,
    ops: &OperatorSet<T>,
    out: &mut [T],
) -> bool
where
    T: Element + Float,
{
    let outer = ops.unary(op);
    match *tree.get(child) {
        // Fused g(f(c)) / g(f(x_k)): read the grandchild leaf directly.
        Node::Unary {
            op: inner,
            child: grandchild,
        } if tree.get(grandchild).is_leaf() => {
            let inner = ops.unary(inner);
            match *tree.get(grandchild) {
                Node::Constant(c) => {
                    if !c.is_finite() {
                        return false;
                    }
                    let value = outer.call(inner.call(c));
                    if !value.is_finite() {
                        return false;
                    }
                    out.fill(value);
                    true
                }
                Node::Variable(k) => {
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(outer.call(inner.call(v)));
                    }
                    true
                }
                _ => unreachable!("guarded by is_leaf"),
            }
        }
        // Fused g(h(a, b)) over two leaves.
        Node::Binary {
            op: inner,
            left,
            right,
        } if tree.get(left).is_leaf() && tree.get(right).is_leaf() => {
            let inner = ops.binary(inner);
            let compose = |a: T, b: T| outer.call(inner.call(a, b));
            match (tree.get(left), tree.get(right)) {
                (&Node::Constant(c1), &Node::Constant(c2)) => {
                    if !c1.is_finite() || !c2.is_finite() {
                        return false;
                    }
                    let value = compose(c1, c2);
                    if !value.is_finite() {
                        return false;
                    }
                    out.fill(value);
                    true
                }
                (&Node::Constant(c), &Node::Variable(k)) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(compose(c, v));
                    }
                    true
                }
                (&Node::Variable(k), &Node::Constant(c)) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(compose(v, c));
                    }
                    true
                }
                (&Node::Variable(k1), &Node::Variable(k2)) => {
                    let row1 = feature_row(x, k1);
                    let row2 = feature_row(x, k2);
                    for ((o, &a), &b) in out.iter_mut().zip(row1).zip(row2) {
                        *o = finite_or_inf(compose(a, b));
                    }
                    true
                }
                _ => unreachable!("guarded by is_leaf"),
            }
        }
        // General shape: recurse, then apply in place.
        _ => {
            if !eval_into(tree, child, x, ops, out) {
                return false;
            }
            apply_unary_in_place(outer, out);
            true
        }
    }
}

fn apply_unary_in_place<T: Float>(op: &UnaryOp<T>, out: &mut [T]) {
    for o in out.iter_mut() {
        *o = finite_or_inf(op.call(*o));
    }
}

fn eval_binary<T>(
    tree: &Tree<T>,
    op: u16,
    left: NodeId,
    right: NodeId,
    x: &Matrix<T>,
    ops: &OperatorSet<T>,
    out: &mut [T],
) -> bool
where
    T: Element + Float,
{
    let operator = ops.binary(op);
    match (tree.get(left).is_leaf(), tree.get(right).is_leaf()) {
        // Both children are leaves: one loop, no intermediate buffer.
        (true, true) => {
            let compose = |a: T, b: T| operator.call(a, b);
            match (tree.get(left), tree.get(right)) {
                (&Node::Constant(c1), &Node::Constant(c2)) => {
                    if !c1.is_finite() || !c2.is_finite() {
                        return false;
                    }
                    out.fill(finite_or_inf(compose(c1, c2)));
                    true
                }
                (&Node::Constant(c), &Node::Variable(k)) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(compose(c, v));
                    }
                    true
                }
                (&Node::Variable(k), &Node::Constant(c)) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(compose(v, c));
                    }
                    true
                }
                (&Node::Variable(k1), &Node::Variable(k2)) => {
                    let row1 = feature_row(x, k1);
                    let row2 = feature_row(x, k2);
                    for ((o, &a), &b) in out.iter_mut().zip(row1).zip(row2) {
                        *o = finite_or_inf(compose(a, b));
                    }
                    true
                }
                _ => unreachable!("guarded by is_leaf"),
            }
        }
        // Left child is a leaf: evaluate the right side, combine in place.
        (true, false) => {
            if !eval_into(tree, right, x, ops, out) {
                return false;
            }
            match *tree.get(left) {
                Node::Constant(c) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for o in out.iter_mut() {
                        *o = finite_or_inf(operator.call(c, *o));
                    }
                }
                Node::Variable(k) => {
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(operator.call(v, *o));
                    }
                }
                _ => unreachable!("guarded by is_leaf"),
            }
            true
        }
        // Right child is a leaf: symmetric.
        (false, true) => {
            if !eval_into(tree, left, x, ops, out) {
                return false;
            }
            match *tree.get(right) {
                Node::Constant(c) => {
                    if !c.is_finite() {
                        return false;
                    }
                    for o in out.iter_mut() {
                        *o = finite_or_inf(operator.call(*o, c));
                    }
                }
                Node::Variable(k) => {
                    for (o, &v) in out.iter_mut().zip(feature_row(x, k)) {
                        *o = finite_or_inf(operator.call(*o, v));
                    }
                }
                _ => unreachable!("guarded by is_leaf"),
            }
            true
        }
        // General shape: two buffers, then combine.
        (false, false) => {
            if !eval_into(tree, left, x, ops, out) {
                return false;
            }
            let mut buffer = vec![T::zero(); out.len()];
            if !eval_into(tree, right, x, ops, &mut buffer) {
                return false;
            }
            for (o, &v) in out.iter_mut().zip(&buffer) {
                *o = finite_or_inf(operator.call(*o, v));
            }
            true
        }
    }
}
