//! Backpropagation of rollout outcomes.
//!
//! Every node on the path from the simulated node up to the root gains one
//! visit and the contribution of the outcome of the player credited at that
//! node (the player who made the move leading to it; the root is credited to
//! its own player).

use crate::mcts::node::NodeId;
use crate::mcts::tree::SearchTree;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Result of a simulated game for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Outcome per player; players missing from the map count as a draw
pub type Outcomes<P> = HashMap<P, Outcome>;

/// How outcomes translate into node score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringPolicy {
    /// win +1, draw 0, loss -1
    Signed,
    /// win +1, draw 0, loss 0
    WinOnly,
}

impl ScoringPolicy {
    pub fn contribution(self, outcome: Outcome) -> i64 {
        match (self, outcome) {
            (_, Outcome::Win) => 1,
            (_, Outcome::Draw) => 0,
            (ScoringPolicy::Signed, Outcome::Loss) => -1,
            (ScoringPolicy::WinOnly, Outcome::Loss) => 0,
        }
    }
}

/// Walks from `from` to the root and updates every node on the way.
///
/// Returns the number of nodes updated.
pub fn backpropagate<P, U, M>(
    tree: &mut SearchTree<P, U, M>,
    from: NodeId,
    outcomes: &Outcomes<P>,
    policy: ScoringPolicy,
) -> usize
where
    P: Copy + Debug + Eq + Hash,
{
    let mut updated = 0;
    let mut current = Some(from);
    while let Some(id) = current {
        let node = tree.get_mut(id);
        let outcome = outcomes
            .get(&node.credited_player())
            .copied()
            .unwrap_or(Outcome::Draw);
        node.visits += 1;
        node.score += policy.contribution(outcome);
        updated += 1;
        current = node.parent;
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestTree = SearchTree<u8, u32, char>;

    /// root(p0) -> a(p1, moved by p0) -> b(p0, moved by p1)
    fn chain() -> (TestTree, NodeId, NodeId) {
        let mut tree = TestTree::new(0);
        let a = tree.add_child(tree.root(), 0, 1).unwrap();
        let b = tree.add_child(a, 0, 0).unwrap();
        (tree, a, b)
    }

    #[test]
    fn test_contributions() {
        assert_eq!(ScoringPolicy::Signed.contribution(Outcome::Win), 1);
        assert_eq!(ScoringPolicy::Signed.contribution(Outcome::Draw), 0);
        assert_eq!(ScoringPolicy::Signed.contribution(Outcome::Loss), -1);
        assert_eq!(ScoringPolicy::WinOnly.contribution(Outcome::Loss), 0);
        assert_eq!(ScoringPolicy::WinOnly.contribution(Outcome::Win), 1);
    }

    #[test]
    fn test_every_node_on_path_gets_one_visit() {
        let (mut tree, a, b) = chain();
        let sibling = tree.add_child(tree.root(), 1, 1).unwrap();
        let outcomes = Outcomes::from([(0, Outcome::Win), (1, Outcome::Loss)]);

        let updated = backpropagate(&mut tree, b, &outcomes, ScoringPolicy::Signed);

        assert_eq!(updated, 3);
        assert_eq!(tree.get(b).visits, 1);
        assert_eq!(tree.get(a).visits, 1);
        assert_eq!(tree.get(tree.root()).visits, 1);
        assert_eq!(tree.get(sibling).visits, 0);
    }

    #[test]
    fn test_scores_follow_the_mover() {
        let (mut tree, a, b) = chain();
        let outcomes = Outcomes::from([(0, Outcome::Win), (1, Outcome::Loss)]);

        backpropagate(&mut tree, b, &outcomes, ScoringPolicy::Signed);

        // a was reached by p0's move, b by p1's move
        assert_eq!(tree.get(a).score, 1);
        assert_eq!(tree.get(b).score, -1);
        assert_eq!(tree.get(tree.root()).score, 1);
    }

    #[test]
    fn test_missing_player_counts_as_draw() {
        let (mut tree, a, b) = chain();
        let outcomes = Outcomes::from([(1, Outcome::Win)]);

        backpropagate(&mut tree, b, &outcomes, ScoringPolicy::Signed);

        assert_eq!(tree.get(a).score, 0);
        assert_eq!(tree.get(b).score, 1);
    }

    #[test]
    fn test_repeated_backpropagation_accumulates() {
        let (mut tree, a, b) = chain();
        let win = Outcomes::from([(0, Outcome::Win)]);
        let loss = Outcomes::from([(0, Outcome::Loss)]);

        backpropagate(&mut tree, b, &win, ScoringPolicy::WinOnly);
        backpropagate(&mut tree, a, &loss, ScoringPolicy::WinOnly);
        backpropagate(&mut tree, a, &win, ScoringPolicy::WinOnly);

        assert_eq!(tree.get(tree.root()).visits, 3);
        assert_eq!(tree.get(a).visits, 3);
        assert_eq!(tree.get(a).score, 2);
        assert_eq!(tree.get(b).visits, 1);
    }
}
