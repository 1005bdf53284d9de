//! Host-side driver.
//!
//! The engine only decides which joint move to explore next; it never owns the
//! game. [`MctsDriver`] owns the live game's side of the loop: it saves a
//! checkpoint at the decision point, plays default-policy plies during
//! rollouts, restores the checkpoint after every iteration and finally commits
//! the chosen joint move.

use crate::mcts::adapter::HostGame;
use crate::mcts::decision::Decision;
use crate::mcts::hyperparameters::MctsHyperparameters;
use crate::mcts::session::{SearchSession, SessionStep, Step};
use crate::mcts::timings::StageTimings;
use crate::{CivMctsError, Result};
use log::{debug, warn};
use uuid::Uuid;

/// Identity and timings of the last finished decision episode
#[derive(Debug, Clone)]
pub struct FinishedSession {
    pub id: Uuid,
    pub iterations: usize,
    pub timings: StageTimings,
}

pub struct MctsDriver<G: HostGame> {
    params: MctsHyperparameters,
    session: Option<SearchSession<G>>,
    last_finished: Option<FinishedSession>,
    decisions: usize,
}

impl<G: HostGame> MctsDriver<G> {
    pub fn new(params: MctsHyperparameters) -> Self {
        Self {
            params,
            session: None,
            last_finished: None,
            decisions: 0,
        }
    }

    pub fn params(&self) -> &MctsHyperparameters {
        &self.params
    }

    pub fn session(&self) -> Option<&SearchSession<G>> {
        self.session.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.session.is_some()
    }

    /// Decisions committed so far
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    pub fn last_finished(&self) -> Option<&FinishedSession> {
        self.last_finished.as_ref()
    }

    /// One scheduling tick.
    ///
    /// Starts a new episode at the current decision point when none is
    /// running. On [`Step::Decided`] the chosen joint move has already been
    /// applied to `game` and the player's turn ended. Any error, including
    /// one raised while committing, leaves `game` at the decision point.
    pub fn tick(&mut self, game: &mut G) -> Result<SessionStep<G>> {
        if self.session.is_none() {
            if game.is_over() {
                return Ok(Step::Decided(None));
            }
            game.checkpoint_save()?;
            let session = SearchSession::new(game.current_player(), self.params.clone())?;
            debug!(
                "decision point for {:?}: session {}",
                game.current_player(),
                session.id()
            );
            self.session = Some(session);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(Step::Idle);
        };

        let step = match session.advance(game) {
            Ok(step) => step,
            Err(err) => return Err(self.abort(game, err)),
        };

        let step = match self.react(game, step) {
            Ok(step) => step,
            Err(err) => return Err(self.abort(game, err)),
        };

        if let Step::Decided(decision) = &step {
            if let Err(err) = self.commit(game, decision.as_ref()) {
                return Err(self.abort(game, err));
            }
        }
        Ok(step)
    }

    /// Ticks until the current decision point is resolved
    pub fn run_to_decision(
        &mut self,
        game: &mut G,
    ) -> Result<Option<Decision<G::UnitId, G::Move>>> {
        loop {
            match self.tick(game)? {
                Step::Decided(decision) => return Ok(decision),
                Step::Idle => return Ok(None),
                _ => {}
            }
        }
    }

    /// Host-side reaction to one session step
    fn react(&mut self, game: &mut G, step: SessionStep<G>) -> Result<SessionStep<G>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(step);
        };
        match step {
            Step::RolloutStep { .. } => {
                if !game.is_over() {
                    game.play_default_ply()?;
                }
                if game.is_over() {
                    let step = session.interrupt(game)?;
                    game.checkpoint_restore()?;
                    return Ok(step);
                }
                Ok(step)
            }
            Step::Selected { .. } | Step::Expanded { .. } if game.is_over() => {
                let step = session.interrupt(game)?;
                game.checkpoint_restore()?;
                Ok(step)
            }
            Step::Backpropagated { .. } => {
                game.checkpoint_restore()?;
                Ok(step)
            }
            Step::Decided(_) => {
                game.checkpoint_restore()?;
                Ok(step)
            }
            step => Ok(step),
        }
    }

    fn commit(
        &mut self,
        game: &mut G,
        decision: Option<&Decision<G::UnitId, G::Move>>,
    ) -> Result<()> {
        let player = game.current_player();
        if let Some(session) = self.session.take() {
            self.last_finished = Some(FinishedSession {
                id: session.id(),
                iterations: session.iterations(),
                timings: session.timings().clone(),
            });
        }
        match decision {
            Some(decision) => {
                for (unit_id, mv) in &decision.moves {
                    game.apply_move(unit_id, mv)?;
                }
                debug!("{:?} commits {} unit moves", player, decision.len());
            }
            None => debug!("{:?} has no legal joint move", player),
        }
        game.end_turn(player)?;
        self.decisions += 1;
        Ok(())
    }

    /// Drops the running episode and puts the game back at the decision point
    fn abort(&mut self, game: &mut G, err: CivMctsError) -> CivMctsError {
        if let Some(mut session) = self.session.take() {
            if session.is_searching() {
                session.abandon();
            }
        }
        if let Err(restore_err) = game.checkpoint_restore() {
            warn!("checkpoint restore after failure also failed: {}", restore_err);
        }
        err
    }
}
