//! # Ramus
//!
//! Dynamic symbolic expression trees for symbolic-regression search loops.
//!
//! Ramus provides runtime-mutable expression trees over a user-declared
//! operator alphabet, evaluated column-wise over tabular numeric input at
//! close to hand-written-kernel speed.
//!
//! ## Features
//!
//! - **Compact Mutable Trees**: arena-backed nodes with 32-bit handles,
//!   in-place node replacement, DAG-sharing-aware copies
//! - **Closed Operator World**: ordered function-pointer registries,
//!   dispatched by index
//! - **Fast Evaluation**: constant-subtree broadcasting, fused kernels for
//!   common shapes, non-finite tracking via a completeness flag
//! - **Generic Evaluation**: the same trees over strings, vectors, or any
//!   other value domain
//!
//! ## Quick Start
//!
//! ```rust
//! use ramus::prelude::*;
//!
//! let ops = OperatorSet::<f64>::arithmetic().with_unary("cos", |x: f64| x.cos());
//! // x1 * cos(x2 - 3.2)
//! let tree = Tree::binary(
//!     3,
//!     Tree::variable(1),
//!     Tree::unary(1, Tree::binary(2, Tree::variable(2), Tree::constant(3.2))),
//! );
//! let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![0.0, 1.0]]);
//! let (output, complete) = eval_tree(&tree, &x, &ops);
//! assert!(complete);
//! assert_eq!(output.len(), 2);
//! assert_eq!(string_tree(&tree, &ops, None), "(x1 * cos((x2 - 3.2)))");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use ramus_core as core;
pub use ramus_eval as eval;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use ramus_core::{
        string_tree, Element, Matrix, Node, NodeId, OperatorSet, Tree, TreeError,
    };
    pub use ramus_eval::{
        eval_tree, eval_tree_generic, eval_tree_promoted, FeatureSource, GenericEvalError,
    };
}
