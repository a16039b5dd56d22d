//! # ramus-eval
//!
//! Tree evaluators for the Ramus dynamic expression engine.
//!
//! This crate provides:
//! - [`eval_tree`]: the fast vectorized evaluator for floating-point
//!   element types, with a constant-subtree fast path, fused kernels for
//!   common small tree shapes, and non-finite tracking through a
//!   completeness flag
//! - [`eval_tree_promoted`]: the same evaluator behind an element-type
//!   promotion, with a diagnostic
//! - [`eval_tree_generic`]: a naive evaluator for arbitrary element
//!   domains (strings, vectors, domain objects) selected through the
//!   [`FeatureSource`] seam
//!
//! ## Completeness
//!
//! The fast evaluator never fails on data. It returns `(output, complete)`
//! where `complete == false` records that a non-finite value was observed:
//! either an early return fired (constant subtrees, pre-read leaf
//! constants) and the output is not to be relied upon, or the final scan
//! of the output found NaN or ±∞.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod eval;
pub mod generic;

#[cfg(test)]
mod tests;

pub use eval::{eval_tree, eval_tree_promoted};
pub use generic::{eval_tree_generic, FeatureSource, GenericEvalError};
