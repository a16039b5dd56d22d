//! The generic evaluator for arbitrary element domains.
//!
//! Where the fast evaluator is pinned to floating-point columns, this one
//! composes operators over whatever value domain the data source yields:
//! strings, vectors, domain objects. There is no finiteness tracking and
//! no structural specialization — one plain post-order recursion.

use thiserror::Error;

use ramus_core::{string_tree, Element, Matrix, Node, NodeId, OperatorSet, Tree};

/// A source of feature values, selected along the data's first axis.
///
/// This is the seam that gives the generic evaluator its shape
/// polymorphism: a flat slice yields scalar feature values, a
/// [`Matrix`] yields one row vector per feature.
pub trait FeatureSource {
    /// The value domain features are drawn from.
    type Value: Clone;

    /// Number of features the data carries.
    fn num_features(&self) -> usize;

    /// Selects the value of a 1-based feature, if present.
    fn feature(&self, feature: u16) -> Option<Self::Value>;
}

impl<V: Clone> FeatureSource for [V] {
    type Value = V;

    fn num_features(&self) -> usize {
        self.len()
    }

    fn feature(&self, feature: u16) -> Option<V> {
        usize::from(feature)
            .checked_sub(1)
            .and_then(|i| self.get(i).cloned())
    }
}

impl<T: Clone> FeatureSource for Matrix<T> {
    type Value = Vec<T>;

    fn num_features(&self) -> usize {
        self.num_rows()
    }

    fn feature(&self, feature: u16) -> Option<Vec<T>> {
        let i = usize::from(feature).checked_sub(1)?;
        if i < self.num_rows() {
            Some(self.row(i).to_vec())
        } else {
            None
        }
    }
}

/// A dispatch failure while evaluating generically.
///
/// Messages carry the rendered tree, since the caller typically built it
/// programmatically and cannot otherwise see which candidate failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenericEvalError {
    /// A variable leaf referenced a feature the data does not have.
    #[error("feature x{feature} is not present in the data while evaluating `{tree}`")]
    FeatureOutOfRange {
        /// The 1-based feature index.
        feature: u16,
        /// The rendered tree.
        tree: String,
    },

    /// An operator index had no entry of the required arity.
    #[error("{arity} operator index {op} is not registered while evaluating `{tree}`")]
    UnknownOperator {
        /// `"unary"` or `"binary"`.
        arity: &'static str,
        /// The 1-based operator index.
        op: u16,
        /// The rendered tree.
        tree: String,
    },
}

/// Evaluates `tree` over `data`, composing operators from `ops` in the
/// data's value domain. Constant leaves enter the domain via `Into`.
///
/// With `throw_errors` set, dispatch failures surface as
/// [`GenericEvalError`]; otherwise they fold into `Ok(None)`, the
/// generic counterpart of an incomplete evaluation.
///
/// # Errors
///
/// Only dispatch failures, and only when `throw_errors` is set.
pub fn eval_tree_generic<T, V, D>(
    tree: &Tree<T>,
    data: &D,
    ops: &OperatorSet<V>,
    throw_errors: bool,
) -> Result<Option<V>, GenericEvalError>
where
    T: Element + Into<V>,
    V: Clone,
    D: FeatureSource<Value = V> + ?Sized,
{
    match eval_at(tree, tree.root_id(), data, ops) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            if throw_errors {
                Err(error)
            } else {
                Ok(None)
            }
        }
    }
}

fn eval_at<T, V, D>(
    tree: &Tree<T>,
    id: NodeId,
    data: &D,
    ops: &OperatorSet<V>,
) -> Result<V, GenericEvalError>
where
    T: Element + Into<V>,
    V: Clone,
    D: FeatureSource<Value = V> + ?Sized,
{
    match tree.get(id) {
        Node::Constant(value) => Ok(value.clone().into()),
        Node::Variable(feature) => {
            data.feature(*feature)
                .ok_or_else(|| GenericEvalError::FeatureOutOfRange {
                    feature: *feature,
                    tree: string_tree(tree, ops, None),
                })
        }
        Node::Unary { op, child } => {
            let operand = eval_at(tree, *child, data, ops)?;
            let operator = ops
                .get_unary(*op)
                .ok_or_else(|| GenericEvalError::UnknownOperator {
                    arity: "unary",
                    op: *op,
                    tree: string_tree(tree, ops, None),
                })?;
            Ok(operator.call(operand))
        }
        Node::Binary { op, left, right } => {
            let lhs = eval_at(tree, *left, data, ops)?;
            let rhs = eval_at(tree, *right, data, ops)?;
            let operator = ops
                .get_binary(*op)
                .ok_or_else(|| GenericEvalError::UnknownOperator {
                    arity: "binary",
                    op: *op,
                    tree: string_tree(tree, ops, None),
                })?;
            Ok(operator.call(lhs, rhs))
        }
    }
}
