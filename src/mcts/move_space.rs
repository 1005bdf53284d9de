//! Mixed-radix encoding of joint moves.
//!
//! A player's joint move picks one candidate move per unit. With unit `i`
//! offering `n_i` candidates, every joint move is a number in
//! `[0, n_0 × n_1 × … × n_k)` whose digit for unit `i` has radix `n_i`; the last
//! unit is the least significant digit.

use crate::{CivMctsError, Result};

/// Encoded joint move number
pub type MoveIndex = u64;

/// The candidate moves of one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMoves<U, M> {
    pub unit_id: U,
    pub moves: Vec<M>,
}

impl<U, M> UnitMoves<U, M> {
    pub fn new(unit_id: U, moves: Vec<M>) -> Self {
        Self { unit_id, moves }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Size of the joint move space.
///
/// Returns 0 for an empty unit list ("no decision to make") and whenever one
/// unit has no candidate at all.
pub fn total_move_count<U, M>(all_moves: &[UnitMoves<U, M>]) -> Result<MoveIndex> {
    if all_moves.is_empty() {
        return Ok(0);
    }
    all_moves.iter().try_fold(1u64, |acc, unit| {
        acc.checked_mul(unit.len() as u64)
            .ok_or(CivMctsError::MoveSpaceOverflow)
    })
}

/// Returns the move of the unit at `unit_position` encoded in `move_index`.
///
/// The positional weight is recomputed on every call: callers look up units
/// one at a time and in any order.
pub fn decode<'a, U, M>(
    move_index: MoveIndex,
    unit_position: usize,
    all_moves: &'a [UnitMoves<U, M>],
) -> Result<&'a M> {
    let total = total_move_count(all_moves)?;
    if move_index >= total {
        return Err(CivMctsError::MoveIndexOutOfRange {
            index: move_index,
            total,
        });
    }
    let unit = all_moves
        .get(unit_position)
        .ok_or(CivMctsError::UnitPositionOutOfRange {
            position: unit_position,
            units: all_moves.len(),
        })?;

    // total > 0 so every radix below is non-zero and the product cannot overflow
    let weight: u64 = all_moves[unit_position + 1..]
        .iter()
        .map(|later| later.len() as u64)
        .product();
    let digit = (move_index / weight) % unit.len() as u64;

    Ok(&unit.moves[digit as usize])
}

/// Decodes `move_index` into one `(unit, move)` pair per unit, in unit order.
pub fn decode_all<U: Clone, M: Clone>(
    move_index: MoveIndex,
    all_moves: &[UnitMoves<U, M>],
) -> Result<Vec<(U, M)>> {
    (0..all_moves.len())
        .map(|position| {
            decode(move_index, position, all_moves)
                .map(|mv| (all_moves[position].unit_id.clone(), mv.clone()))
        })
        .collect()
}

/// Position of a unit within a move list
pub fn find_unit_position<U: PartialEq, M>(
    unit_id: &U,
    all_moves: &[UnitMoves<U, M>],
) -> Option<usize> {
    all_moves.iter().position(|unit| &unit.unit_id == unit_id)
}
