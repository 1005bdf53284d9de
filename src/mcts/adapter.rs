//! Contracts between the engine and the game it plays.
//!
//! [`GameAdapter`] is everything the search itself needs. [`HostGame`] adds
//! what the owning driver needs to replay simulated iterations from the
//! decision point.

use crate::mcts::backpropagation::Outcomes;
use crate::mcts::move_space::UnitMoves;
use crate::mcts::simulation::RolloutEnd;
use crate::Result;
use std::fmt::Debug;
use std::hash::Hash;

/// Game-side collaborators consumed by the search
pub trait GameAdapter {
    type Player: Copy + Eq + Hash + Debug;
    type UnitId: Clone + PartialEq + Debug;
    type Move: Clone + Debug;

    /// Legal moves of every unit `player` controls in the current state.
    /// A unit may come back with an empty list.
    fn available_moves(
        &self,
        player: Self::Player,
    ) -> Result<Vec<UnitMoves<Self::UnitId, Self::Move>>>;

    /// Player moving after `player`
    fn next_player_after(&self, player: Self::Player) -> Self::Player;

    /// Executes one unit's move against the live state
    fn apply_move(&mut self, unit_id: &Self::UnitId, mv: &Self::Move) -> Result<()>;

    /// Called once every unit of `player` has been given its move
    fn end_turn(&mut self, _player: Self::Player) -> Result<()> {
        Ok(())
    }

    /// Scores the current state for every player
    fn evaluate_outcome(&self, end: RolloutEnd) -> Result<Outcomes<Self::Player>>;

    /// Moves that per-unit pruning must never drop
    fn is_priority_move(&self, _mv: &Self::Move) -> bool {
        false
    }
}

/// Game-side collaborators consumed by the host driver
pub trait HostGame: GameAdapter {
    /// Player about to move
    fn current_player(&self) -> Self::Player;

    /// Records the current state as the decision point
    fn checkpoint_save(&mut self) -> Result<()>;

    /// Returns the live state to the last decision point
    fn checkpoint_restore(&mut self) -> Result<()>;

    /// Plays one ply for the player to move with the default policy
    fn play_default_ply(&mut self) -> Result<()>;

    fn is_over(&self) -> bool;
}
