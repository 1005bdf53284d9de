//! Expansion with branch limiting.
//!
//! The joint move space is exponential in the number of units, so a node does
//! not enumerate it: at initialization it draws at most `branch_limit`
//! distinct move numbers, and each expansion turns one of them into a child.
//! Without branch limiting the set is still capped at [`MAX_UNTRIED_MOVES`].

use crate::mcts::move_space::MoveIndex;
use crate::mcts::node::NodeId;
use crate::mcts::tree::SearchTree;
use crate::{CivMctsError, Result};
use log::warn;
use rand::prelude::*;
use std::collections::HashSet;
use std::fmt::Debug;

/// Most untried moves a node ever holds, with or without branch limiting
pub const MAX_UNTRIED_MOVES: usize = 100_000;

/// Draws the untried set of a node whose move space has `total` entries.
///
/// Returns `min(total, cap)` distinct indices, where `cap` is `limit` (or
/// [`MAX_UNTRIED_MOVES`] without one, and never more than it). A space that
/// fits under the cap is kept whole; a larger one is sampled uniformly
/// without replacement.
pub fn sample_untried_moves(
    total: MoveIndex,
    limit: Option<usize>,
    rng: &mut StdRng,
) -> Vec<MoveIndex> {
    let cap = limit.unwrap_or(MAX_UNTRIED_MOVES).min(MAX_UNTRIED_MOVES);
    if total <= cap as u64 {
        return (0..total).collect();
    }
    if limit.is_none() {
        warn!(
            "enumerating {} joint moves is not feasible, sampling {}",
            total, cap
        );
    }

    let mut seen = HashSet::with_capacity(cap);
    let mut sampled = Vec::with_capacity(cap);
    while sampled.len() < cap {
        let candidate = rng.random_range(0..total);
        if seen.insert(candidate) {
            sampled.push(candidate);
        }
    }
    sampled
}

/// Removes one untried move of `node_id`, drawn uniformly, and returns it
pub fn take_untried_move<P: Copy + Debug, U, M>(
    tree: &mut SearchTree<P, U, M>,
    node_id: NodeId,
    rng: &mut StdRng,
) -> Result<MoveIndex> {
    let node = tree.get_mut(node_id);
    if node.untried_moves.is_empty() {
        return Err(CivMctsError::InconsistentTree(format!(
            "expansion of {:?} with no untried moves",
            node_id
        )));
    }
    let pick = rng.random_range(0..node.untried_moves.len());
    Ok(node.untried_moves.swap_remove(pick))
}

/// Turns `move_index` of `node_id` into a child owned by `next_player`.
///
/// The move must already have been taken out of the untried set, and
/// `next_player` looked up once the move has been played.
pub fn expand<P: Copy + Debug, U, M>(
    tree: &mut SearchTree<P, U, M>,
    node_id: NodeId,
    move_index: MoveIndex,
    next_player: P,
) -> Result<NodeId> {
    tree.add_child(node_id, move_index, next_player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcts::move_space::UnitMoves;
    use assert_matches::assert_matches;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn assert_distinct(moves: &[MoveIndex]) {
        let unique: HashSet<_> = moves.iter().collect();
        assert_eq!(unique.len(), moves.len());
    }

    #[test]
    fn test_small_space_is_kept_whole() {
        let mut moves = sample_untried_moves(9, Some(30), &mut rng());
        moves.sort();
        assert_eq!(moves, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_space_at_limit_is_kept_whole() {
        let moves = sample_untried_moves(30, Some(30), &mut rng());
        assert_eq!(moves.len(), 30);
        assert_distinct(&moves);
    }

    #[test]
    fn test_large_space_is_capped() {
        for total in [31u64, 100, 729, 1 << 40] {
            let moves = sample_untried_moves(total, Some(30), &mut rng());
            assert_eq!(moves.len(), 30);
            assert_distinct(&moves);
            assert!(moves.iter().all(|&m| m < total));
        }
    }

    #[test]
    fn test_unlimited_enumerates() {
        let moves = sample_untried_moves(100, None, &mut rng());
        assert_eq!(moves.len(), 100);
    }

    #[test]
    fn test_unlimited_huge_space_is_sampled() {
        let moves = sample_untried_moves(1 << 40, None, &mut rng());
        assert_eq!(moves.len(), MAX_UNTRIED_MOVES);
        assert_distinct(&moves);
        assert!(moves.iter().all(|&m| m < 1 << 40));
    }

    #[test]
    fn test_limit_above_cap_is_clamped() {
        let moves = sample_untried_moves(1 << 20, Some(usize::MAX), &mut rng());
        assert_eq!(moves.len(), MAX_UNTRIED_MOVES);
    }

    #[test]
    fn test_empty_space_yields_nothing() {
        assert!(sample_untried_moves(0, Some(30), &mut rng()).is_empty());
        assert!(sample_untried_moves(0, None, &mut rng()).is_empty());
    }

    #[test]
    fn test_expand_moves_index_from_untried_to_child() {
        let mut tree: SearchTree<u8, u32, char> = SearchTree::new(0);
        let root = tree.root();
        tree.get_mut(root).initialize(
            vec![UnitMoves::new(1, vec!['a', 'b', 'c'])],
            3,
            vec![0, 1, 2],
        );

        let mut rng = rng();
        let mut expanded = Vec::new();
        for _ in 0..3 {
            let move_index = take_untried_move(&mut tree, root, &mut rng).unwrap();
            let child = expand(&mut tree, root, move_index, 1).unwrap();
            assert_eq!(tree.get(child).player_index, 1);
            assert_eq!(tree.get(child).move_index, move_index);
            assert!(!tree.get(child).initialized);
            expanded.push(move_index);
        }
        expanded.sort();
        assert_eq!(expanded, vec![0, 1, 2]);
        assert!(tree.get(root).untried_moves.is_empty());
        assert_eq!(tree.get(root).children.len(), 3);

        assert_matches!(
            take_untried_move(&mut tree, root, &mut rng),
            Err(CivMctsError::InconsistentTree(_))
        );
    }
}
