//! Search tree nodes.
//!
//! A node is one point of the multi-turn decision tree reached after a
//! hypothetical joint move. Nodes are stored in the [`SearchTree`] arena and
//! refer to each other through [`NodeId`] indices.
//!
//! [`SearchTree`]: crate::mcts::tree::SearchTree

use crate::mcts::move_space::{MoveIndex, UnitMoves};
use std::collections::HashMap;
use std::fmt::Debug;

/// Index into the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in the search tree
#[derive(Debug, Clone)]
pub struct Node<P, U, M> {
    /// Number of completed iterations that passed through this node
    pub visits: u32,

    /// Accumulated outcome contributions
    pub score: i64,

    /// Player whose joint move is chosen at this node
    pub player_index: P,

    /// Player who made the move leading here (`None` for the root)
    pub moved_by: Option<P>,

    /// Joint move number, in the parent's move space, that produced this node
    pub move_index: MoveIndex,

    /// Parent node (back-reference only)
    pub parent: Option<NodeId>,

    /// Children in creation order
    pub children: Vec<NodeId>,

    /// Candidate moves per unit of `player_index`, fetched lazily
    pub all_moves: Vec<UnitMoves<U, M>>,

    /// Size of the joint move space (0 when there is no legal joint move)
    pub total_move_count: MoveIndex,

    /// Sampled move numbers not yet expanded into children
    pub untried_moves: Vec<MoveIndex>,

    /// Whether the move space has been fetched
    pub initialized: bool,
}

impl<P: Copy + Debug, U, M> Node<P, U, M> {
    pub fn new_root(player_index: P) -> Self {
        Self::new(player_index, None, 0, None)
    }

    pub fn new_child(player_index: P, moved_by: P, move_index: MoveIndex, parent: NodeId) -> Self {
        Self::new(player_index, Some(moved_by), move_index, Some(parent))
    }

    fn new(
        player_index: P,
        moved_by: Option<P>,
        move_index: MoveIndex,
        parent: Option<NodeId>,
    ) -> Self {
        Node {
            visits: 0,
            score: 0,
            player_index,
            moved_by,
            move_index,
            parent,
            children: Vec::new(),
            all_moves: Vec::new(),
            total_move_count: 0,
            untried_moves: Vec::new(),
            initialized: false,
        }
    }

    /// Installs the move space fetched for `player_index`
    pub fn initialize(
        &mut self,
        all_moves: Vec<UnitMoves<U, M>>,
        total_move_count: MoveIndex,
        untried_moves: Vec<MoveIndex>,
    ) {
        self.all_moves = all_moves;
        self.total_move_count = total_move_count;
        self.untried_moves = untried_moves;
        self.initialized = true;
    }

    /// Player credited with this node's outcome during backpropagation
    pub fn credited_player(&self) -> P {
        self.moved_by.unwrap_or(self.player_index)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_untried_moves(&self) -> bool {
        !self.untried_moves.is_empty()
    }

    /// Every sampled move has a child
    pub fn is_fully_expanded(&self) -> bool {
        self.initialized && self.untried_moves.is_empty()
    }

    /// Initialized, nothing left to try and nothing to descend into
    pub fn is_dead_end(&self) -> bool {
        self.is_fully_expanded() && self.children.is_empty()
    }

    pub fn average_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score as f64 / self.visits as f64
        }
    }

    /// Gets statistics about this node for debugging
    pub fn stats(&self) -> HashMap<String, String> {
        let mut stats = HashMap::new();
        stats.insert("player".to_string(), format!("{:?}", self.player_index));
        stats.insert("visits".to_string(), self.visits.to_string());
        stats.insert("score".to_string(), self.score.to_string());
        stats.insert("avg_score".to_string(), format!("{:.3}", self.average_score()));
        stats.insert("children".to_string(), self.children.len().to_string());
        stats.insert("units".to_string(), self.all_moves.len().to_string());
        stats.insert("total_moves".to_string(), self.total_move_count.to_string());
        stats.insert("untried".to_string(), self.untried_moves.len().to_string());
        stats
    }
}
