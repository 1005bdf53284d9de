//! Final joint move of a decision episode.

use crate::mcts::move_space::MoveIndex;

/// The chosen root child, decoded into one move per unit
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<U, M> {
    /// Joint move number in the root's move space
    pub move_index: MoveIndex,
    /// Visits of the chosen root child
    pub visits: u32,
    /// Iterations completed when the choice was made
    pub iterations: usize,
    /// `(unit, move)` pairs in unit order
    pub moves: Vec<(U, M)>,
}

impl<U: PartialEq, M> Decision<U, M> {
    /// Move assigned to `unit_id`, if the unit is part of the decision
    pub fn move_for_unit(&self, unit_id: &U) -> Option<&M> {
        self.moves
            .iter()
            .find(|(unit, _)| unit == unit_id)
            .map(|(_, mv)| mv)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
