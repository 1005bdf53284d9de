//! Resumable search session.
//!
//! The host calls [`SearchSession::advance`] once per scheduling tick and each
//! call performs exactly one bounded unit of work:
//!
//! - initialize the node under the cursor (fetch and prune its move space)
//! - descend one level with UCT
//! - expand one untried move and start a rollout
//! - account for one rollout ply
//! - backpropagate a finished rollout and return the cursor to the root
//! - once the iteration budget is spent, pick the final move and switch off
//!
//! All state that has to survive between ticks lives in the session, which is
//! created per decision point and dropped (tree included) afterwards.

use crate::mcts::adapter::GameAdapter;
use crate::mcts::backpropagation::backpropagate;
use crate::mcts::decision::Decision;
use crate::mcts::expansion::{expand, sample_untried_moves, take_untried_move};
use crate::mcts::hyperparameters::MctsHyperparameters;
use crate::mcts::move_space::{
    decode, decode_all, find_unit_position, total_move_count, MoveIndex, UnitMoves,
};
use crate::mcts::node::NodeId;
use crate::mcts::pruning::prune_unit_moves;
use crate::mcts::selection::{select_robust_child, select_uct_child};
use crate::mcts::simulation::{Rollout, RolloutEnd};
use crate::mcts::timings::StageTimings;
use crate::mcts::tree::SearchTree;
use crate::Result;
use log::{debug, info, warn};
use rand::prelude::*;
use std::time::Instant;
use uuid::Uuid;

/// MCTS phase the session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Selection,
    Expansion,
    Simulation,
    Backpropagation,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Searching,
    /// Final move chosen; further ticks are no-ops
    Finished,
    /// Dropped after an error; no move was chosen
    Abandoned,
}

/// Work performed by one tick
#[derive(Debug, Clone, PartialEq)]
pub enum Step<U, M> {
    /// The cursor node fetched its move space
    Initialized { node: NodeId, total_moves: MoveIndex },
    /// UCT moved the cursor to an existing child
    Selected { node: NodeId },
    /// A new child was created and a rollout started from it
    Expanded { node: NodeId, move_index: MoveIndex },
    /// One rollout ply is due; the host plays it
    RolloutStep { depth: usize },
    /// An iteration finished and the cursor is back at the root
    Backpropagated { iteration: usize, end: RolloutEnd },
    /// Search is over; `None` when the root had no legal joint move
    Decided(Option<Decision<U, M>>),
    /// The session is no longer searching
    Idle,
}

impl<U, M> Step<U, M> {
    fn timing_label(&self) -> &'static str {
        match self {
            Step::Initialized { .. } => "initialization",
            Step::Selected { .. } => "selection",
            Step::Expanded { .. } => "expansion",
            Step::RolloutStep { .. } => "simulation",
            Step::Backpropagated { .. } => "backpropagation",
            Step::Decided(_) => "final_selection",
            Step::Idle => "idle",
        }
    }
}

pub type SessionStep<G> = Step<<G as GameAdapter>::UnitId, <G as GameAdapter>::Move>;

pub type Tree<G> = SearchTree<
    <G as GameAdapter>::Player,
    <G as GameAdapter>::UnitId,
    <G as GameAdapter>::Move,
>;

/// Cross-tick state of one decision episode
pub struct SearchSession<G: GameAdapter> {
    id: Uuid,
    params: MctsHyperparameters,
    rng: StdRng,
    tree: Tree<G>,
    cursor: NodeId,
    stage: Stage,
    rollout: Rollout,
    iterations: usize,
    status: SessionStatus,
    timings: StageTimings,
}

impl<G: GameAdapter> SearchSession<G> {
    /// Starts a decision episode for `root_player` with a single-node tree
    pub fn new(root_player: G::Player, params: MctsHyperparameters) -> Result<Self> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        let tree = SearchTree::new(root_player);
        let cursor = tree.root();
        let id = Uuid::new_v4();
        debug!(
            "mcts session {} for {:?}: {}",
            id,
            root_player,
            params.to_config_string()
        );
        Ok(Self {
            id,
            rollout: Rollout::new(params.max_rollout_depth),
            rng: StdRng::seed_from_u64(seed),
            params,
            tree,
            cursor,
            stage: Stage::Selection,
            iterations: 0,
            status: SessionStatus::Searching,
            timings: StageTimings::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn params(&self) -> &MctsHyperparameters {
        &self.params
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_searching(&self) -> bool {
        self.status == SessionStatus::Searching
    }

    /// Completed iterations so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn rollout_depth(&self) -> usize {
        self.rollout.depth()
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn at_root(&self) -> bool {
        self.cursor == self.tree.root()
    }

    pub fn tree(&self) -> &Tree<G> {
        &self.tree
    }

    pub fn timings(&self) -> &StageTimings {
        &self.timings
    }

    /// Runs one tick of work against `game`.
    ///
    /// Any error abandons the episode: the tree is torn down and later ticks
    /// return [`Step::Idle`].
    pub fn advance(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        if !self.is_searching() {
            return Ok(Step::Idle);
        }
        let started = Instant::now();
        let step = match self.advance_inner(game) {
            Ok(step) => step,
            Err(err) => {
                warn!("mcts session {} failed: {}", self.id, err);
                self.abandon();
                return Err(err);
            }
        };
        self.timings.record(step.timing_label(), started.elapsed());
        if matches!(step, Step::Decided(_)) {
            info!("mcts session {} timings: {}", self.id, self.timings.summary());
        }
        Ok(step)
    }

    /// Forces backpropagation from the cursor, skipping any remaining rollout.
    ///
    /// Used when the game ends in the middle of a simulated iteration. The
    /// iteration still counts toward the budget.
    pub fn interrupt(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        if !self.is_searching() {
            return Ok(Step::Idle);
        }
        let started = Instant::now();
        match self.backpropagation_step(game, RolloutEnd::Interrupted) {
            Ok(step) => {
                self.timings.record(step.timing_label(), started.elapsed());
                Ok(step)
            }
            Err(err) => {
                warn!("mcts session {} failed during interrupt: {}", self.id, err);
                self.abandon();
                Err(err)
            }
        }
    }

    /// Drops the episode without choosing a move
    pub fn abandon(&mut self) {
        let freed = self.tree.teardown();
        self.status = SessionStatus::Abandoned;
        warn!(
            "mcts session {} abandoned after {} iterations ({} nodes freed)",
            self.id, self.iterations, freed
        );
    }

    /// Move given to `unit_id` on the edge leading to the cursor node.
    ///
    /// `None` at the root, or when the unit took no part in that joint move.
    pub fn current_move_for_unit(&self, unit_id: &G::UnitId) -> Result<Option<G::Move>> {
        if self.tree.is_empty() {
            return Ok(None);
        }
        let node = self.tree.try_get(self.cursor)?;
        let Some(parent) = node.parent else {
            return Ok(None);
        };
        let parent_moves = &self.tree.get(parent).all_moves;
        match find_unit_position(unit_id, parent_moves) {
            Some(position) => {
                decode(node.move_index, position, parent_moves).map(|mv| Some(mv.clone()))
            }
            None => Ok(None),
        }
    }

    fn advance_inner(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        if self.iterations >= self.params.iteration_budget {
            return self.finish();
        }
        match self.stage {
            Stage::Simulation => self.simulation_step(game),
            Stage::Backpropagation => self.backpropagation_step(game, RolloutEnd::Interrupted),
            Stage::Selection | Stage::Expansion => self.selection_step(game),
        }
    }

    fn selection_step(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        self.stage = Stage::Selection;
        let cursor = self.cursor;
        let node = self.tree.get(cursor);

        if !node.initialized {
            return self.initialize_cursor(game);
        }
        if node.has_untried_moves() {
            return self.expansion_step(game);
        }
        if node.is_dead_end() {
            if node.is_root() {
                return self.finish();
            }
            debug!("dead end at {:?}", cursor);
            return self.backpropagation_step(game, RolloutEnd::Interrupted);
        }

        let child = select_uct_child(&self.tree, cursor, self.params.uct_constant)?;
        self.apply_edge(game, child)?;
        self.cursor = child;
        debug!(
            "select {:?} -> {:?} at depth {}",
            cursor,
            child,
            self.tree.depth(child)
        );
        Ok(Step::Selected { node: child })
    }

    fn initialize_cursor(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        let cursor = self.cursor;
        let player = self.tree.get(cursor).player_index;

        let fetched = match game.available_moves(player) {
            Ok(moves) => moves,
            Err(err) => {
                warn!("no moves for {:?} at {:?}: {}", player, cursor, err);
                Vec::new()
            }
        };

        let level = self.params.pruning;
        let cap = self.params.max_unit_moves;
        let mut all_moves = Vec::with_capacity(fetched.len());
        for unit in fetched {
            let moves = prune_unit_moves(unit.moves, level, cap, &mut self.rng, |mv| {
                game.is_priority_move(mv)
            });
            all_moves.push(UnitMoves::new(unit.unit_id, moves));
        }

        let total = total_move_count(&all_moves)?;
        let untried =
            sample_untried_moves(total, self.params.effective_branch_limit(), &mut self.rng);
        debug!(
            "init {:?} for {:?}: {} units, {} joint moves, {} sampled",
            cursor,
            player,
            all_moves.len(),
            total,
            untried.len()
        );
        self.tree.get_mut(cursor).initialize(all_moves, total, untried);

        Ok(Step::Initialized {
            node: cursor,
            total_moves: total,
        })
    }

    fn expansion_step(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        self.stage = Stage::Expansion;
        let cursor = self.cursor;
        let player = self.tree.get(cursor).player_index;
        let move_index = take_untried_move(&mut self.tree, cursor, &mut self.rng)?;
        self.apply_joint_move(game, cursor, move_index)?;
        // turn order may change with the move just played
        let next_player = game.next_player_after(player);
        let child = expand(&mut self.tree, cursor, move_index, next_player)?;

        self.cursor = child;
        self.stage = Stage::Simulation;
        self.rollout.reset();
        debug!("expand {:?} -> {:?} (move {})", cursor, child, move_index);
        Ok(Step::Expanded {
            node: child,
            move_index,
        })
    }

    fn simulation_step(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        if self.rollout.is_exhausted() {
            return self.backpropagation_step(game, RolloutEnd::DepthLimit);
        }
        let depth = self.rollout.advance();
        Ok(Step::RolloutStep { depth })
    }

    fn backpropagation_step(&mut self, game: &mut G, end: RolloutEnd) -> Result<SessionStep<G>> {
        self.stage = Stage::Backpropagation;
        let outcomes = game.evaluate_outcome(end)?;
        let updated = backpropagate(&mut self.tree, self.cursor, &outcomes, self.params.scoring);

        self.iterations += 1;
        self.cursor = self.tree.root();
        self.stage = Stage::Selection;
        self.rollout.reset();
        debug!(
            "iteration {} ({:?}): {} nodes updated",
            self.iterations, end, updated
        );
        Ok(Step::Backpropagated {
            iteration: self.iterations,
            end,
        })
    }

    /// Plays the joint move stored on the edge into `child`
    fn apply_edge(&self, game: &mut G, child: NodeId) -> Result<()> {
        let node = self.tree.try_get(child)?;
        let Some(parent_id) = node.parent else {
            return Ok(());
        };
        self.apply_joint_move(game, parent_id, node.move_index)
    }

    /// Plays joint move `move_index` of `parent_id` and ends its owner's turn
    fn apply_joint_move(
        &self,
        game: &mut G,
        parent_id: NodeId,
        move_index: MoveIndex,
    ) -> Result<()> {
        let parent = self.tree.try_get(parent_id)?;
        let joint = decode_all(move_index, &parent.all_moves)?;
        for (unit_id, mv) in &joint {
            game.apply_move(unit_id, mv)?;
        }
        game.end_turn(parent.player_index)
    }

    fn finish(&mut self) -> Result<SessionStep<G>> {
        let root = self.tree.root();
        let decision = match select_robust_child(&self.tree, root) {
            Some(child_id) => {
                let child = self.tree.get(child_id);
                let moves = decode_all(child.move_index, &self.tree.get(root).all_moves)?;
                Some(Decision {
                    move_index: child.move_index,
                    visits: child.visits,
                    iterations: self.iterations,
                    moves,
                })
            }
            None => None,
        };

        debug!("root {:?}", self.tree.get(root).stats());
        match &decision {
            Some(decision) => info!(
                "mcts session {} chose move {} ({} of {} visits, {} nodes)",
                self.id,
                decision.move_index,
                decision.visits,
                self.tree.get(root).visits,
                self.tree.len()
            ),
            None => info!("mcts session {}: no legal joint move", self.id),
        }

        self.status = SessionStatus::Finished;
        self.cursor = root;
        self.stage = Stage::Selection;
        let freed = self.tree.teardown();
        debug!("mcts session {} freed {} nodes", self.id, freed);
        Ok(Step::Decided(decision))
    }
}
