//! Integration tests for the evaluators: seed scenarios and the
//! specialization-equivalence property.

use std::f64::consts::PI;

use ramus_core::{string_tree, Matrix, Node, NodeId, OperatorSet, Tree};

use crate::eval::{eval_tree, eval_tree_promoted};
use crate::generic::{eval_tree_generic, GenericEvalError};

/// Unary `[cos]`, binary `[+, -, *]`.
fn trig_ops() -> OperatorSet<f64> {
    OperatorSet::new()
        .with_unary("cos", |x: f64| x.cos())
        .with_binary("+", |a, b| a + b)
        .with_binary("-", |a, b| a - b)
        .with_binary("*", |a, b| a * b)
}

/// `x1 * cos(x2 - 3.2)` against `trig_ops`.
fn trig_tree() -> Tree<f64> {
    Tree::binary(
        3,
        Tree::variable(1),
        Tree::unary(1, Tree::binary(2, Tree::variable(2), Tree::constant(3.2))),
    )
}

#[test]
fn scenario_full_expression_over_three_columns() {
    let x = Matrix::from_rows(vec![vec![1.0, 2.0, 0.5], vec![0.0, PI, 3.2]]);
    let (output, complete) = eval_tree(&trig_tree(), &x, &trig_ops());

    assert!(complete);
    let expected = [
        1.0 * (0.0_f64 - 3.2).cos(),
        2.0 * (PI - 3.2).cos(),
        0.5 * (3.2_f64 - 3.2).cos(),
    ];
    assert_eq!(output.len(), 3);
    for (got, want) in output.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{got} != {want}");
    }
    assert!((output[2] - 0.5).abs() < 1e-12);
}

#[test]
fn scenario_division_by_zero_is_incomplete() {
    let ops = OperatorSet::new()
        .with_binary("/", |a: f64, b: f64| a / b)
        .with_binary("-", |a, b| a - b);
    // 1.0 / (x1 - x1)
    let tree = Tree::binary(
        1,
        Tree::constant(1.0),
        Tree::binary(2, Tree::variable(1), Tree::variable(1)),
    );
    let x = Matrix::from_rows(vec![vec![0.5, 2.0, -3.0]]);

    let (output, complete) = eval_tree(&tree, &x, &ops);
    assert!(!complete);
    assert_eq!(output.len(), 3);
}

#[test]
fn scenario_constant_subtree_broadcasts() {
    let ops = OperatorSet::new().with_binary("+", |a: f64, b: f64| a + b);
    let tree = Tree::binary(1, Tree::constant(3.0), Tree::constant(4.0));
    let x = Matrix::filled(0.0_f64, 1, 5);

    let (output, complete) = eval_tree(&tree, &x, &ops);
    assert!(complete);
    assert_eq!(output, vec![7.0; 5]);
}

#[test]
fn scenario_rendering_with_default_and_custom_names() {
    let ops = trig_ops();
    let tree = Tree::<f64>::binary(3, Tree::variable(1), Tree::variable(2));
    assert_eq!(string_tree(&tree, &ops, None), "(x1 * x2)");
    assert_eq!(string_tree(&tree, &ops, Some(&["a", "b"])), "(a * b)");
}

#[test]
fn scenario_generic_string_concatenation() {
    let ops = OperatorSet::<String>::new()
        .with_unary("greet", |s: String| format!("Hello {s}"))
        .with_binary("*", |a: String, b: String| format!("{a}{b}"));
    // x1 * " World!"
    let tree = Tree::binary(
        1,
        Tree::<String>::variable(1),
        Tree::constant(" World!".to_string()),
    );
    let data = vec!["Hello".to_string(), "Me?".to_string()];

    let result = eval_tree_generic(&tree, data.as_slice(), &ops, true).unwrap();
    assert_eq!(result, Some("Hello World!".to_string()));
}

#[test]
fn generic_errors_surface_or_fold_per_flag() {
    let ops = OperatorSet::<String>::new().with_binary("*", |a: String, b: String| format!("{a}{b}"));
    let tree = Tree::binary(
        1,
        Tree::<String>::variable(5),
        Tree::constant("!".to_string()),
    );
    let data = vec!["one".to_string(), "two".to_string()];

    let err = eval_tree_generic(&tree, data.as_slice(), &ops, true).unwrap_err();
    match &err {
        GenericEvalError::FeatureOutOfRange { feature, tree } => {
            assert_eq!(*feature, 5);
            assert_eq!(tree.as_str(), "(x5 * !)");
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(eval_tree_generic(&tree, data.as_slice(), &ops, false), Ok(None));
}

#[test]
fn matrix_features_select_whole_rows() {
    use crate::generic::FeatureSource;

    let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![10.0, 20.0]]);
    assert_eq!(x.num_features(), 2);
    assert_eq!(x.feature(2), Some(vec![10.0, 20.0]));
    assert_eq!(x.feature(3), None);
    assert_eq!(x.feature(0), None);

    let flat = ["a".to_string(), "b".to_string()];
    assert_eq!(flat.as_slice().feature(1), Some("a".to_string()));
    assert_eq!(flat.as_slice().feature(3), None);
}

#[test]
fn promoted_evaluation_matches_explicit_conversion() {
    let ops64 = trig_ops();
    let tree32 = Tree::binary(
        3,
        Tree::variable(1),
        Tree::unary(1, Tree::binary(2, Tree::variable(2), Tree::constant(3.2_f32))),
    );
    let x = Matrix::from_rows(vec![vec![1.0, 2.0, 0.5], vec![0.0, PI, 3.2]]);

    let (promoted, complete_p) = eval_tree_promoted(&tree32, &x, &ops64);
    let (converted, complete_c) = eval_tree(&tree32.convert::<f64>(), &x, &ops64);
    assert_eq!(complete_p, complete_c);
    assert_eq!(promoted, converted);
}

#[test]
fn set_node_redirects_evaluation() {
    let ops = trig_ops();
    let x = Matrix::from_rows(vec![vec![1.0, 2.0, 0.5], vec![0.0, PI, 3.2]]);

    let mut spliced = trig_tree();
    let replacement = Tree::binary(1, Tree::variable(2), Tree::constant(0.25));
    let grafted = spliced.graft(&replacement);
    let root = spliced.root_id();
    spliced.set_node(root, grafted);

    let (got, complete) = eval_tree(&spliced, &x, &ops);
    let (want, _) = eval_tree(&replacement, &x, &ops);
    assert!(complete);
    assert_eq!(got, want);
}

#[test]
fn incomplete_output_still_has_one_slot_per_column() {
    let ops = OperatorSet::new().with_unary("safe_log", ramus_core::operators::safe_log::<f64>);
    // log(-1) is NaN on the constant path: early return.
    let tree = Tree::unary(1, Tree::constant(-1.0_f64));
    let x = Matrix::filled(1.0_f64, 1, 4);

    let (output, complete) = eval_tree(&tree, &x, &ops);
    assert!(!complete);
    assert_eq!(output.len(), 4);
}

/// The naive reference recursion: no specialization, no fast path.
mod naive {
    use super::{Matrix, Node, NodeId, OperatorSet, Tree};

    pub(crate) fn eval(tree: &Tree<f64>, x: &Matrix<f64>, ops: &OperatorSet<f64>) -> Vec<f64> {
        eval_at(tree, tree.root_id(), x, ops)
    }

    fn eval_at(tree: &Tree<f64>, id: NodeId, x: &Matrix<f64>, ops: &OperatorSet<f64>) -> Vec<f64> {
        match *tree.get(id) {
            Node::Constant(value) => vec![value; x.num_cols()],
            Node::Variable(feature) => x.row(usize::from(feature) - 1).to_vec(),
            Node::Unary { op, child } => {
                let operator = ops.unary(op);
                eval_at(tree, child, x, ops)
                    .into_iter()
                    .map(|v| operator.call(v))
                    .collect()
            }
            Node::Binary { op, left, right } => {
                let operator = ops.binary(op);
                let lhs = eval_at(tree, left, x, ops);
                let rhs = eval_at(tree, right, x, ops);
                lhs.into_iter()
                    .zip(rhs)
                    .map(|(a, b)| operator.call(a, b))
                    .collect()
            }
        }
    }
}

mod specialization_equivalence {
    use proptest::prelude::*;

    use super::naive;
    use super::{eval_tree, Matrix, OperatorSet, Tree};

    fn search_ops() -> OperatorSet<f64> {
        OperatorSet::new()
            .with_unary("cos", |x: f64| x.cos())
            .with_unary("exp", |x: f64| x.exp())
            .with_binary("+", |a, b| a + b)
            .with_binary("-", |a, b| a - b)
            .with_binary("*", |a, b| a * b)
            .with_binary("/", |a, b| a / b)
    }

    fn arb_tree() -> impl Strategy<Value = Tree<f64>> {
        let leaf = prop_oneof![
            (-4.0..4.0_f64).prop_map(Tree::constant),
            (1_u16..=3).prop_map(Tree::variable),
        ];
        leaf.prop_recursive(5, 40, 2, |inner| {
            prop_oneof![
                (1_u16..=2, inner.clone()).prop_map(|(op, child)| Tree::unary(op, child)),
                (1_u16..=4, inner.clone(), inner)
                    .prop_map(|(op, left, right)| Tree::binary(op, left, right)),
            ]
        })
    }

    proptest! {
        /// Every specialized path must agree with the naive recursion
        /// whenever evaluation completes.
        #[test]
        fn specialized_matches_naive_on_complete_outputs(tree in arb_tree()) {
            let x = Matrix::from_rows(vec![
                vec![1.0, -0.5, 2.0, 0.25],
                vec![0.0, 3.0, -1.0, 1.5],
                vec![-2.0, 0.5, 4.0, -0.75],
            ]);
            let ops = search_ops();

            let (output, complete) = eval_tree(&tree, &x, &ops);
            prop_assert_eq!(output.len(), x.num_cols());

            if complete {
                prop_assert!(output.iter().all(|v| v.is_finite()));
                // The +Inf substitution is allowed to rewrite history when
                // the naive result is itself non-finite, so equivalence is
                // asserted exactly where an all-finite result exists.
                let reference = naive::eval(&tree, &x, &ops);
                if reference.iter().all(|v| v.is_finite()) {
                    for (got, want) in output.iter().zip(&reference) {
                        prop_assert_eq!(got, want);
                    }
                }
            }
        }

        /// Variable-free trees broadcast a single scalar.
        #[test]
        fn constant_subtrees_yield_uniform_output(a in -3.0..3.0_f64, b in -3.0..3.0_f64) {
            let ops = search_ops();
            let tree = Tree::binary(3, Tree::constant(a), Tree::binary(1, Tree::constant(b), Tree::constant(1.0)));
            let x = Matrix::filled(9.9_f64, 1, 6);

            let (output, complete) = eval_tree(&tree, &x, &ops);
            if complete {
                prop_assert!(output.windows(2).all(|w| w[0] == w[1]));
                prop_assert_eq!(output[0], a * (b + 1.0));
            }
        }

        /// Promotion invariance: evaluating a converted tree agrees with
        /// evaluating the original against promoted data.
        #[test]
        fn conversion_does_not_change_results(k in 1_u16..=2, c in -2.0..2.0_f32) {
            let ops = search_ops();
            let tree32 = Tree::binary(1, Tree::variable(k), Tree::constant(c));
            let tree64 = tree32.convert::<f64>();
            let x = Matrix::from_rows(vec![vec![0.5, -1.5, 2.5], vec![1.0, 0.0, -2.0]]);

            let (output, complete) = eval_tree(&tree64, &x, &ops);
            prop_assert!(complete);
            let row = x.row(usize::from(k) - 1);
            for (got, &xv) in output.iter().zip(row) {
                prop_assert_eq!(*got, xv + f64::from(c));
            }
        }
    }
}
