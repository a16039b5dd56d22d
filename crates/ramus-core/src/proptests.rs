//! Property-based tests for the structural tree operations.

use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::tree::Tree;

fn structural_hash<T: crate::Element>(tree: &Tree<T>) -> u64 {
    let mut hasher = DefaultHasher::new();
    tree.hash(&mut hasher);
    hasher.finish()
}

/// Random trees over features x1..x3 and operator indices 1..=2 (unary)
/// and 1..=4 (binary).
fn arb_tree() -> impl Strategy<Value = Tree<f64>> {
    let leaf = prop_oneof![
        (-10.0..10.0_f64).prop_map(Tree::constant),
        (1_u16..=3).prop_map(Tree::variable),
    ];
    leaf.prop_recursive(6, 48, 2, |inner| {
        prop_oneof![
            (1_u16..=2, inner.clone()).prop_map(|(op, child)| Tree::unary(op, child)),
            (1_u16..=4, inner.clone(), inner)
                .prop_map(|(op, left, right)| Tree::binary(op, left, right)),
        ]
    })
}

fn arb_tree_f32() -> impl Strategy<Value = Tree<f32>> {
    let leaf = prop_oneof![
        (-10.0..10.0_f32).prop_map(Tree::constant),
        (1_u16..=3).prop_map(Tree::variable),
    ];
    leaf.prop_recursive(5, 24, 2, |inner| {
        prop_oneof![
            (1_u16..=2, inner.clone()).prop_map(|(op, child)| Tree::unary(op, child)),
            (1_u16..=4, inner.clone(), inner)
                .prop_map(|(op, left, right)| Tree::binary(op, left, right)),
        ]
    })
}

proptest! {
    #[test]
    fn deep_copy_preserves_structure_and_hash(tree in arb_tree()) {
        let copy = tree.deep_copy();
        prop_assert_eq!(&tree, &copy);
        prop_assert_eq!(structural_hash(&tree), structural_hash(&copy));
    }

    #[test]
    fn sharing_preserving_copy_agrees_with_flat_copy(tree in arb_tree()) {
        let shared = tree.deep_copy_preserving_sharing();
        prop_assert_eq!(&tree, &shared);
        prop_assert_eq!(tree.len(), shared.len());
    }

    #[test]
    fn len_agrees_with_fold_and_collect(tree in arb_tree()) {
        let folded: usize = tree.fold(
            |_| 1,
            |own, children| own + children.into_iter().sum::<usize>(),
        );
        prop_assert_eq!(tree.len(), folded);
        prop_assert_eq!(tree.len(), tree.collect_nodes().len());
        prop_assert_eq!(tree.len(), tree.iter().count());
    }

    #[test]
    fn node_at_covers_exactly_the_preorder_range(tree in arb_tree()) {
        let len = tree.len();
        prop_assert!(tree.node_at(0).is_none());
        for i in 1..=len {
            prop_assert!(tree.node_at(i).is_some());
        }
        prop_assert!(tree.node_at(len + 1).is_none());
    }

    #[test]
    fn constant_roundtrip_is_identity(tree in arb_tree()) {
        let mut edited = tree.clone();
        let constants = tree.constants();
        edited.set_constants(&constants).unwrap();
        prop_assert_eq!(&tree, &edited);
        prop_assert_eq!(tree.count_constants(), constants.len());
    }

    #[test]
    fn conversion_preserves_shape(tree in arb_tree_f32()) {
        let converted = tree.convert::<f64>();
        prop_assert_eq!(tree.len(), converted.len());
        prop_assert_eq!(tree.depth(), converted.depth());
        // Leaf kinds survive conversion at every pre-order position.
        for (a, b) in tree.iter().zip(converted.iter()) {
            prop_assert_eq!(a.1.degree(), b.1.degree());
            prop_assert_eq!(a.1.is_constant(), b.1.is_constant());
        }
    }

    #[test]
    fn independently_built_equal_trees_share_hashes(
        op in 1_u16..=4,
        left in 1_u16..=3,
        right in 1_u16..=3,
    ) {
        let a = Tree::<f64>::binary(op, Tree::variable(left), Tree::variable(right));
        let b = Tree::<f64>::binary(op, Tree::variable(left), Tree::variable(right));
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(structural_hash(&a), structural_hash(&b));
    }
}
