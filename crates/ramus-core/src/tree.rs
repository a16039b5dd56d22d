//! The arena-backed expression tree.
//!
//! A [`Tree`] owns a contiguous arena of [`Node`] slots plus a root handle.
//! Slots are never interned or deduplicated: in-place mutation through
//! [`Tree::set_node`] must stay sound, so structural identity is a property
//! of the reachable shape, not of slot indices. Slots left unreachable by a
//! mutation are ignored by every structural operation and compacted away by
//! the deep-copy family.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::element::Element;
use crate::error::TreeError;
use crate::node::{Node, NodeId};

/// A mutable expression tree over element type `T`.
///
/// Operator indices stored in the tree are resolved against whatever
/// operator registry the caller supplies at evaluation or rendering time;
/// the tree itself carries no registry reference.
#[derive(Clone, Debug)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

fn push_node<T>(nodes: &mut Vec<Node<T>>, node: Node<T>) -> NodeId {
    let index = nodes.len();
    assert!(index < u32::MAX as usize, "tree capacity exceeded");
    nodes.push(node);
    NodeId::new(index as u32)
}

fn shift_node<T>(node: Node<T>, offset: u32) -> Node<T> {
    let shift = |id: NodeId| NodeId::new(id.index() + offset);
    match node {
        leaf @ (Node::Constant(_) | Node::Variable(_)) => leaf,
        Node::Unary { op, child } => Node::Unary {
            op,
            child: shift(child),
        },
        Node::Binary { op, left, right } => Node::Binary {
            op,
            left: shift(left),
            right: shift(right),
        },
    }
}

impl<T: Element> Tree<T> {
    // === Constructors ===

    /// Creates a constant leaf tree.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            nodes: vec![Node::Constant(value)],
            root: NodeId::new(0),
        }
    }

    /// Creates a variable leaf tree referencing the given 1-based feature.
    ///
    /// # Panics
    ///
    /// Panics if `feature` is 0; feature indices are 1-based.
    #[must_use]
    pub fn variable(feature: u16) -> Self {
        assert!(feature >= 1, "feature indices are 1-based");
        Self {
            nodes: vec![Node::Variable(feature)],
            root: NodeId::new(0),
        }
    }

    /// Creates a variable leaf from a default-form name such as `"x3"`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MalformedVariable`] unless the name is `x`
    /// followed by a decimal feature index of at least 1.
    pub fn parse_variable(name: &str) -> Result<Self, TreeError> {
        let malformed = || TreeError::MalformedVariable(name.to_string());
        let digits = name.strip_prefix('x').ok_or_else(malformed)?;
        let feature: u16 = digits.parse().map_err(|_| malformed())?;
        if feature == 0 {
            return Err(malformed());
        }
        Ok(Self::variable(feature))
    }

    /// Creates a variable leaf whose feature index is 1 plus the position
    /// of `name` in `var_names`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownVariable`] if no entry matches and
    /// [`TreeError::AmbiguousVariable`] if more than one does.
    ///
    /// # Panics
    ///
    /// Panics if the name table has more than `u16::MAX` entries.
    pub fn named_variable<S: AsRef<str>>(name: &str, var_names: &[S]) -> Result<Self, TreeError> {
        let mut matches = var_names
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.as_ref() == name);
        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => Err(TreeError::AmbiguousVariable(name.to_string())),
            (Some((position, _)), None) => {
                assert!(
                    position < usize::from(u16::MAX),
                    "variable table capacity exceeded"
                );
                Ok(Self::variable(position as u16 + 1))
            }
            (None, _) => Err(TreeError::UnknownVariable(name.to_string())),
        }
    }

    /// Wraps a tree in a unary application. `op` is the 1-based index into
    /// the registry's unary table.
    #[must_use]
    pub fn unary(op: u16, child: Self) -> Self {
        let mut tree = child;
        let child_root = tree.root;
        tree.root = push_node(&mut tree.nodes, Node::Unary {
            op,
            child: child_root,
        });
        tree
    }

    /// Combines two trees under a binary application. `op` is the 1-based
    /// index into the registry's binary table.
    ///
    /// The right tree's arena is appended to the left one with all handles
    /// relocated; both operands keep their internal sharing.
    #[must_use]
    pub fn binary(op: u16, left: Self, right: Self) -> Self {
        let mut nodes = left.nodes;
        assert!(
            nodes.len() + right.nodes.len() < u32::MAX as usize,
            "tree capacity exceeded"
        );
        let offset = nodes.len() as u32;
        nodes.extend(right.nodes.into_iter().map(|n| shift_node(n, offset)));
        let right_root = NodeId::new(right.root.index() + offset);
        let root = push_node(&mut nodes, Node::Binary {
            op,
            left: left.root,
            right: right_root,
        });
        Self { nodes, root }
    }

    // === Slot access ===

    /// Returns the root handle.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Returns the node at the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not name a slot of this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index() as usize]
    }

    /// Returns a mutable reference to the node at the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not name a slot of this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index() as usize]
    }

    /// Number of arena slots, including any left unreachable by mutation.
    /// Structural size is [`Tree::len`].
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.nodes.len()
    }

    // === Mutation ===

    /// Overwrites the slot at `target` with a shallow copy of the node at
    /// `source`: afterwards `target` has the source's degree and references
    /// the same children.
    ///
    /// The target's previous children may become unreachable, and the
    /// source's children gain an extra parent; reading such shared subtrees
    /// is fine, mutating them mutates every occurrence.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not name a slot of this tree.
    pub fn set_node(&mut self, target: NodeId, source: NodeId) {
        let node = self.get(source).clone();
        *self.get_mut(target) = node;
    }

    /// Copies another tree's reachable nodes into this arena, preserving
    /// the source's internal sharing, and returns the handle of the copied
    /// root. Combine with [`Tree::set_node`] to splice a foreign subtree
    /// over an existing node.
    pub fn graft(&mut self, other: &Self) -> NodeId {
        let mut memo = FxHashMap::default();
        graft_rec(other, other.root, &mut self.nodes, &mut memo)
    }

    // === Copy and conversion ===

    /// Structure-preserving deep copy; shared subtrees are duplicated.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.convert_impl(false)
    }

    /// Deep copy that reproduces DAG sharing: each reachable slot is copied
    /// once, via an identity-keyed side table.
    #[must_use]
    pub fn deep_copy_preserving_sharing(&self) -> Self {
        self.convert_impl(true)
    }

    /// Recursively converts every constant leaf to element type `U`;
    /// variable and operator fields are preserved. Shared subtrees are
    /// duplicated.
    #[must_use]
    pub fn convert<U>(&self) -> Tree<U>
    where
        U: Element + From<T>,
    {
        self.convert_impl(false)
    }

    /// Like [`Tree::convert`], but reproduces DAG sharing so each reachable
    /// slot is converted exactly once.
    #[must_use]
    pub fn convert_preserving_sharing<U>(&self) -> Tree<U>
    where
        U: Element + From<T>,
    {
        self.convert_impl(true)
    }

    fn convert_impl<U>(&self, preserve_sharing: bool) -> Tree<U>
    where
        U: Element + From<T>,
    {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut memo = FxHashMap::default();
        let root = convert_rec(self, self.root, &mut nodes, &mut memo, preserve_sharing);
        Tree { nodes, root }
    }

    // === Constant editing ===

    /// Returns the values of the constant leaves in pre-order.
    ///
    /// Shared constant slots appear once, at their first pre-order
    /// occurrence.
    #[must_use]
    pub fn constants(&self) -> Vec<T> {
        self.constant_slots()
            .into_iter()
            .map(|id| match self.get(id) {
                Node::Constant(value) => value.clone(),
                _ => unreachable!("constant_slots yields constant leaves only"),
            })
            .collect()
    }

    /// Overwrites the constant leaves, in pre-order, with the given values.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ConstantCount`] if `values` does not have one
    /// entry per constant leaf.
    pub fn set_constants(&mut self, values: &[T]) -> Result<(), TreeError> {
        let slots = self.constant_slots();
        if slots.len() != values.len() {
            return Err(TreeError::ConstantCount {
                expected: slots.len(),
                got: values.len(),
            });
        }
        for (id, value) in slots.into_iter().zip(values) {
            *self.get_mut(id) = Node::Constant(value.clone());
        }
        Ok(())
    }

    /// Number of distinct constant leaves.
    #[must_use]
    pub fn count_constants(&self) -> usize {
        self.constant_slots().len()
    }

    /// Returns true if any reachable leaf is a constant.
    #[must_use]
    pub fn has_constants(&self) -> bool {
        self.any(Node::is_constant)
    }

    /// Returns true if the tree is more than a single leaf.
    #[must_use]
    pub fn has_operators(&self) -> bool {
        !self.get(self.root).is_leaf()
    }

    fn constant_slots(&self) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        let mut slots = Vec::new();
        for (id, node) in self.iter() {
            if node.is_constant() && seen.insert(id) {
                slots.push(id);
            }
        }
        slots
    }

    pub(crate) fn eq_at(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        match (self.get(a), other.get(b)) {
            (Node::Constant(x), Node::Constant(y)) => x == y,
            (Node::Variable(i), Node::Variable(j)) => i == j,
            (
                Node::Unary { op: f, child: c },
                Node::Unary {
                    op: g,
                    child: d,
                },
            ) => f == g && self.eq_at(*c, other, *d),
            (
                Node::Binary {
                    op: f,
                    left: l1,
                    right: r1,
                },
                Node::Binary {
                    op: g,
                    left: l2,
                    right: r2,
                },
            ) => f == g && self.eq_at(*l1, other, *l2) && self.eq_at(*r1, other, *r2),
            _ => false,
        }
    }

    fn hash_at<H: Hasher>(&self, id: NodeId, state: &mut H) {
        match self.get(id) {
            Node::Constant(value) => {
                state.write_u8(0);
                value.hash_element(state);
            }
            Node::Variable(feature) => {
                state.write_u8(1);
                state.write_u16(*feature);
            }
            Node::Unary { op, child } => {
                state.write_u8(2);
                state.write_u16(*op);
                self.hash_at(*child, state);
            }
            Node::Binary { op, left, right } => {
                state.write_u8(3);
                state.write_u16(*op);
                self.hash_at(*left, state);
                self.hash_at(*right, state);
            }
        }
    }
}

fn convert_rec<T, U>(
    tree: &Tree<T>,
    id: NodeId,
    out: &mut Vec<Node<U>>,
    memo: &mut FxHashMap<NodeId, NodeId>,
    preserve_sharing: bool,
) -> NodeId
where
    T: Element,
    U: Element + From<T>,
{
    if preserve_sharing {
        if let Some(&mapped) = memo.get(&id) {
            return mapped;
        }
    }
    let copied = match tree.get(id) {
        Node::Constant(value) => push_node(out, Node::Constant(U::from(value.clone()))),
        Node::Variable(feature) => push_node(out, Node::Variable(*feature)),
        Node::Unary { op, child } => {
            let child = convert_rec(tree, *child, out, memo, preserve_sharing);
            push_node(out, Node::Unary { op: *op, child })
        }
        Node::Binary { op, left, right } => {
            let left = convert_rec(tree, *left, out, memo, preserve_sharing);
            let right = convert_rec(tree, *right, out, memo, preserve_sharing);
            push_node(out, Node::Binary {
                op: *op,
                left,
                right,
            })
        }
    };
    if preserve_sharing {
        memo.insert(id, copied);
    }
    copied
}

fn graft_rec<T: Element>(
    source: &Tree<T>,
    id: NodeId,
    out: &mut Vec<Node<T>>,
    memo: &mut FxHashMap<NodeId, NodeId>,
) -> NodeId {
    if let Some(&mapped) = memo.get(&id) {
        return mapped;
    }
    let copied = match source.get(id) {
        leaf @ (Node::Constant(_) | Node::Variable(_)) => push_node(out, leaf.clone()),
        Node::Unary { op, child } => {
            let child = graft_rec(source, *child, out, memo);
            push_node(out, Node::Unary { op: *op, child })
        }
        Node::Binary { op, left, right } => {
            let left = graft_rec(source, *left, out, memo);
            let right = graft_rec(source, *right, out, memo);
            push_node(out, Node::Binary {
                op: *op,
                left,
                right,
            })
        }
    };
    memo.insert(id, copied);
    copied
}

/// Structural equality: same degree, same constant/feature/operator data,
/// recursively equal children left-before-right. Slot layout, sharing and
/// garbage slots do not participate.
impl<T: Element> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_at(self.root, other, other.root)
    }
}

/// Structural hash, consistent with [`PartialEq`]. Constant and variable
/// leaves hash distinct tag bytes, so a constant `3` and feature `3` do
/// not collide.
impl<T: Element> Hash for Tree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_at(self.root, state);
    }
}
