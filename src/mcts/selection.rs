//! Selection policies.
//!
//! - Descent: UCT (Upper Confidence bound applied to Trees)
//! - Final move: robust child, i.e. the most visited root child
//!
//! Ties are never broken explicitly: a later child only wins with a strictly
//! greater value, so the earliest created child wins among equals.

use crate::mcts::node::{Node, NodeId};
use crate::mcts::tree::SearchTree;
use crate::{CivMctsError, Result};
use std::fmt::Debug;

/// UCT value of `child` under a parent visited `parent_visits` times
///
/// Formula: score / visits + c × sqrt(ln(N_parent) / visits)
pub fn uct_score<P, U, M>(child: &Node<P, U, M>, parent_visits: u32, c: f64) -> f64 {
    let visits = child.visits as f64;
    let exploitation = child.score as f64 / visits;
    let exploration = c * ((parent_visits as f64).ln() / visits).sqrt();
    exploitation + exploration
}

/// Picks the child of `node_id` with the highest UCT value.
///
/// Fails on a childless node and on a child that was never simulated; both
/// mean the stage machine descended where it should not have.
pub fn select_uct_child<P: Copy + Debug, U, M>(
    tree: &SearchTree<P, U, M>,
    node_id: NodeId,
    c: f64,
) -> Result<NodeId> {
    let node = tree.try_get(node_id)?;
    if node.children.is_empty() {
        return Err(CivMctsError::InconsistentTree(format!(
            "selection on childless node {:?}",
            node_id
        )));
    }

    let mut best: Option<(NodeId, f64)> = None;
    for &child_id in &node.children {
        let child = tree.get(child_id);
        if child.visits == 0 {
            return Err(CivMctsError::InconsistentTree(format!(
                "child {:?} of {:?} selected before being simulated",
                child_id, node_id
            )));
        }
        let score = uct_score(child, node.visits, c);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child_id, score)),
        }
    }

    best.map(|(id, _)| id).ok_or_else(|| {
        CivMctsError::InconsistentTree(format!("no selectable child under {:?}", node_id))
    })
}

/// Most visited child of `node_id`, or `None` when it has no children
pub fn select_robust_child<P: Copy + Debug, U, M>(
    tree: &SearchTree<P, U, M>,
    node_id: NodeId,
) -> Option<NodeId> {
    let mut best: Option<(NodeId, u32)> = None;
    for &child_id in &tree.get(node_id).children {
        let visits = tree.get(child_id).visits;
        match best {
            Some((_, best_visits)) if visits <= best_visits => {}
            _ => best = Some((child_id, visits)),
        }
    }
    best.map(|(id, _)| id)
}
