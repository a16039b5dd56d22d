//! # ramus-core
//!
//! Expression tree core for the Ramus dynamic expression engine.
//!
//! This crate provides:
//! - A compact, mutable, arena-backed expression tree generic over its
//!   scalar element type
//! - A closed, value-level registry of unary and binary operators
//! - Pre-order traversal, folding, structural equality and hashing
//! - Deep copy and element-type conversion, with optional DAG-sharing
//!   preservation
//! - A row-major input matrix and infix/prefix string rendering
//!
//! ## Design Principles
//!
//! - **Data-Oriented Design**: nodes stored contiguously per tree, addressed
//!   by 32-bit handles
//! - **Closed Operator World**: operators are ordered tables of function
//!   pointers, dispatched by index with no per-node virtual calls
//! - **Mutation-Friendly**: slots are never interned, so in-place node
//!   replacement is always sound

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod data;
pub mod element;
pub mod error;
pub mod node;
pub mod operators;
pub mod registry;
pub mod render;
pub mod tree;

mod traverse;

#[cfg(test)]
mod proptests;

pub use data::Matrix;
pub use element::Element;
pub use error::TreeError;
pub use node::{Node, NodeId};
pub use registry::{BinaryOp, OperatorSet, UnaryOp};
pub use render::string_tree;
pub use traverse::PreorderIter;
pub use tree::Tree;
