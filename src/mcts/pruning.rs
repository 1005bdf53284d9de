//! Per-unit move pruning.
//!
//! The joint move space grows as the product of every unit's candidate count,
//! so each unit's list is cut to a small random subset before the space is
//! built. Moves the game flags as priority (founding a city with a settler)
//! survive pruning unconditionally.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// How unit move lists are reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruningLevel {
    /// Keep every candidate move
    None,
    /// Keep at most `max_unit_moves` candidates, chosen at random
    Random,
}

/// Reduces one unit's candidate list according to `level`.
///
/// Lists at or below `cap` are returned untouched. Otherwise priority moves
/// are kept first (in their original order, at most `cap` of them) and the
/// remaining slots are filled by drawing without replacement.
pub fn prune_unit_moves<M, F>(
    moves: Vec<M>,
    level: PruningLevel,
    cap: usize,
    rng: &mut StdRng,
    is_priority: F,
) -> Vec<M>
where
    F: Fn(&M) -> bool,
{
    if level == PruningLevel::None || moves.len() <= cap {
        return moves;
    }

    let (mut kept, mut rest): (Vec<M>, Vec<M>) = moves.into_iter().partition(|mv| is_priority(mv));
    if kept.len() >= cap {
        kept.truncate(cap);
        return kept;
    }

    while kept.len() < cap && !rest.is_empty() {
        let pick = rng.random_range(0..rest.len());
        kept.push(rest.swap_remove(pick));
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn test_no_pruning_keeps_everything() {
        let moves: Vec<u8> = (0..10).collect();
        let pruned = prune_unit_moves(moves.clone(), PruningLevel::None, 3, &mut rng(), |_| false);
        assert_eq!(pruned, moves);
    }

    #[test]
    fn test_short_lists_are_untouched() {
        let moves = vec![4u8, 2, 9];
        let pruned = prune_unit_moves(moves.clone(), PruningLevel::Random, 3, &mut rng(), |_| false);
        assert_eq!(pruned, moves);
    }

    #[test]
    fn test_random_pruning_keeps_cap_distinct_moves() {
        let moves: Vec<u8> = (0..12).collect();
        let pruned = prune_unit_moves(moves, PruningLevel::Random, 3, &mut rng(), |_| false);
        assert_eq!(pruned.len(), 3);
        let mut unique = pruned.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(pruned.iter().all(|mv| *mv < 12));
    }

    #[test]
    fn test_priority_moves_always_survive() {
        for seed in 0..20 {
            let moves: Vec<u8> = (0..12).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let pruned = prune_unit_moves(moves, PruningLevel::Random, 3, &mut rng, |mv| *mv == 7);
            assert_eq!(pruned.len(), 3);
            assert_eq!(pruned[0], 7);
        }
    }

    #[test]
    fn test_too_many_priority_moves_are_capped() {
        let moves: Vec<u8> = (0..12).collect();
        let pruned = prune_unit_moves(moves, PruningLevel::Random, 3, &mut rng(), |mv| mv % 2 == 0);
        assert_eq!(pruned, vec![0, 2, 4]);
    }
}
