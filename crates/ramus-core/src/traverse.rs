//! Tree traversal: pre-order iteration, folding, searching.
//!
//! Pre-order — parent before children, left child before right — is the
//! canonical order for every flat view of a tree: iteration, node
//! indexing, constant collection. Shared subtrees are visited once per
//! occurrence, so a DAG traverses exactly like its unfolded tree.

use smallvec::SmallVec;

use crate::element::Element;
use crate::node::{Node, NodeId};
use crate::tree::Tree;

/// Pre-order iterator over a tree's reachable nodes.
///
/// Yields `(handle, node)` pairs. Created by [`Tree::iter`].
pub struct PreorderIter<'a, T> {
    tree: &'a Tree<T>,
    stack: SmallVec<[NodeId; 32]>,
}

impl<'a, T: Element> Iterator for PreorderIter<'a, T> {
    type Item = (NodeId, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id);
        match *node {
            Node::Constant(_) | Node::Variable(_) => {}
            Node::Unary { child, .. } => self.stack.push(child),
            Node::Binary { left, right, .. } => {
                self.stack.push(right);
                self.stack.push(left);
            }
        }
        Some((id, node))
    }
}

impl<T: Element> Tree<T> {
    /// Iterates the reachable nodes in pre-order.
    pub fn iter(&self) -> PreorderIter<'_, T> {
        PreorderIter {
            tree: self,
            stack: smallvec::smallvec![self.root_id()],
        }
    }

    /// Folds the tree depth-first: `f` maps every node, `combine` merges a
    /// node's mapped value with its children's results (one or two,
    /// left before right). A leaf contributes `f(leaf)` directly.
    pub fn fold<R, F, C>(&self, mut f: F, mut combine: C) -> R
    where
        F: FnMut(&Node<T>) -> R,
        C: FnMut(R, SmallVec<[R; 2]>) -> R,
    {
        self.fold_at(self.root_id(), &mut f, &mut combine)
    }

    fn fold_at<R, F, C>(&self, id: NodeId, f: &mut F, combine: &mut C) -> R
    where
        F: FnMut(&Node<T>) -> R,
        C: FnMut(R, SmallVec<[R; 2]>) -> R,
    {
        let node = self.get(id);
        let own = f(node);
        match *node {
            Node::Constant(_) | Node::Variable(_) => own,
            Node::Unary { child, .. } => {
                let child = self.fold_at(child, f, combine);
                combine(own, smallvec::smallvec![child])
            }
            Node::Binary { left, right, .. } => {
                let left = self.fold_at(left, f, combine);
                let right = self.fold_at(right, f, combine);
                combine(own, smallvec::smallvec![left, right])
            }
        }
    }

    /// Short-circuit disjunction of `predicate` over the whole tree in
    /// pre-order.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&Node<T>) -> bool,
    {
        self.any_at(self.root_id(), predicate)
    }

    /// Short-circuit disjunction of `predicate` over the subtree rooted at
    /// `id`, in pre-order.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a slot of this tree.
    pub fn any_at<P>(&self, id: NodeId, mut predicate: P) -> bool
    where
        P: FnMut(&Node<T>) -> bool,
    {
        let mut stack: SmallVec<[NodeId; 32]> = smallvec::smallvec![id];
        while let Some(id) = stack.pop() {
            let node = self.get(id);
            if predicate(node) {
                return true;
            }
            match *node {
                Node::Constant(_) | Node::Variable(_) => {}
                Node::Unary { child, .. } => stack.push(child),
                Node::Binary { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        false
    }

    /// Collects references to the reachable nodes in pre-order. Filtering
    /// and mapping are [`Tree::iter`] plus the standard adapters.
    #[must_use]
    pub fn collect_nodes(&self) -> Vec<&Node<T>> {
        self.iter().map(|(_, node)| node).collect()
    }

    /// Number of reachable nodes, counting shared subtrees once per
    /// occurrence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `i`-th node in pre-order, 1-based.
    #[must_use]
    pub fn node_at(&self, i: usize) -> Option<&Node<T>> {
        if i == 0 {
            return None;
        }
        self.iter().nth(i - 1).map(|(_, node)| node)
    }

    /// Maximum number of nodes on a root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.fold(
            |_| 1_usize,
            |own, children| own + children.into_iter().max().unwrap_or(0),
        )
    }
}
