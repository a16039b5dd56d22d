//! Expression node types and handles.
//!
//! Nodes live in a per-tree arena and reference their children through
//! 32-bit [`NodeId`] handles, keeping each node small and traversal
//! cache-friendly.

use std::fmt;

use smallvec::SmallVec;

/// A handle to a node slot within a [`Tree`](crate::Tree) arena.
///
/// Handles are lightweight 32-bit indices that can be copied freely.
/// A handle is only meaningful against the tree that produced it; slots
/// are never deduplicated, so two handles are equal exactly when they
/// name the same slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a handle from a raw slot index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single expression node.
///
/// The variant is the node's degree tag: leaves have degree 0, unary
/// applications degree 1, binary applications degree 2. Operator and
/// feature indices are 1-based, matching the public surface of the
/// operator registry and the input matrix.
#[derive(Clone, Debug, PartialEq)]
pub enum Node<T> {
    /// A constant leaf holding an element value.
    Constant(T),
    /// A variable leaf holding a 1-based feature index.
    Variable(u16),
    /// A unary operator application.
    Unary {
        /// 1-based index into the registry's unary table.
        op: u16,
        /// The operand subtree.
        child: NodeId,
    },
    /// A binary operator application.
    Binary {
        /// 1-based index into the registry's binary table.
        op: u16,
        /// The left operand subtree.
        left: NodeId,
        /// The right operand subtree.
        right: NodeId,
    },
}

impl<T> Node<T> {
    /// Returns the arity tag of this node: 0, 1, or 2.
    #[must_use]
    pub fn degree(&self) -> u8 {
        match self {
            Node::Constant(_) | Node::Variable(_) => 0,
            Node::Unary { .. } => 1,
            Node::Binary { .. } => 2,
        }
    }

    /// Returns true for degree-0 nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.degree() == 0
    }

    /// Returns true for constant leaves.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    /// Returns true for variable leaves.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable(_))
    }

    /// Returns the children of this node, left before right.
    #[must_use]
    pub fn children(&self) -> SmallVec<[NodeId; 2]> {
        match *self {
            Node::Constant(_) | Node::Variable(_) => SmallVec::new(),
            Node::Unary { child, .. } => smallvec::smallvec![child],
            Node::Binary { left, right, .. } => smallvec::smallvec![left, right],
        }
    }
}
