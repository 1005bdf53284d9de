//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and reference each other by [`NodeId`].
//! A child is always allocated after its parent, so releasing the arena from
//! the back frees every child before its parent.

use crate::mcts::move_space::MoveIndex;
use crate::mcts::node::{Node, NodeId};
use crate::{CivMctsError, Result};
use std::fmt::Debug;

/// MCTS tree with arena-based node storage
#[derive(Debug, Clone)]
pub struct SearchTree<P, U, M> {
    nodes: Vec<Node<P, U, M>>,
}

impl<P: Copy + Debug, U, M> SearchTree<P, U, M> {
    /// Create a tree holding a single uninitialized root
    pub fn new(root_player: P) -> Self {
        Self {
            nodes: vec![Node::new_root(root_player)],
        }
    }

    /// Root node ID (always the first arena slot)
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<P, U, M> {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<P, U, M> {
        &mut self.nodes[id.0]
    }

    /// Look up a node that may not exist
    pub fn try_get(&self, id: NodeId) -> Result<&Node<P, U, M>> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| CivMctsError::InconsistentTree(format!("unknown node {:?}", id)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a child of `parent` for `move_index`; `player_index` moves next.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        move_index: MoveIndex,
        player_index: P,
    ) -> Result<NodeId> {
        let moved_by = self.try_get(parent)?.player_index;
        let child_id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new_child(player_index, moved_by, move_index, parent));
        self.get_mut(parent).children.push(child_id);
        Ok(child_id)
    }

    /// Nodes from `id` up to the root, inclusive
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        self.path_to_root(id).len() - 1
    }

    /// Release every node, children before parents, together with their
    /// move lists. Returns the number of nodes freed.
    pub fn teardown(&mut self) -> usize {
        let mut freed = 0;
        while let Some(node) = self.nodes.pop() {
            drop(node);
            freed += 1;
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcts::move_space::UnitMoves;

    type TestTree = SearchTree<u8, u32, char>;

    #[test]
    fn test_new_tree_has_single_root() {
        let tree = TestTree::new(0);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(tree.root()).is_root());
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = TestTree::new(0);
        let root = tree.root();
        let a = tree.add_child(root, 4, 1).unwrap();
        let b = tree.add_child(root, 2, 1).unwrap();
        let grandchild = tree.add_child(a, 0, 0).unwrap();

        assert_eq!(tree.get(root).children, vec![a, b]);
        assert_eq!(tree.get(a).parent, Some(root));
        assert_eq!(tree.get(a).moved_by, Some(0));
        assert_eq!(tree.get(grandchild).moved_by, Some(1));
        assert_eq!(tree.path_to_root(grandchild), vec![grandchild, a, root]);
        assert_eq!(tree.depth(grandchild), 2);
        assert_eq!(tree.depth(root), 0);
    }

    #[test]
    fn test_add_child_to_unknown_parent_fails() {
        let mut tree = TestTree::new(0);
        assert!(tree.add_child(NodeId(9), 0, 1).is_err());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_teardown_frees_everything() {
        let mut tree = TestTree::new(0);
        let root = tree.root();
        tree.get_mut(root)
            .initialize(vec![UnitMoves::new(1, vec!['x', 'y'])], 2, vec![0, 1]);
        let child = tree.add_child(root, 0, 1).unwrap();
        tree.add_child(child, 0, 0).unwrap();

        assert_eq!(tree.teardown(), 3);
        assert!(tree.is_empty());
        assert_eq!(tree.teardown(), 0);
    }
}
