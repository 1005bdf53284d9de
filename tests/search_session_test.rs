//! End-to-end runs of the resumable search against a minimal game

use civ_mcts::mcts::backpropagation::{Outcome, Outcomes, ScoringPolicy};
use civ_mcts::mcts::move_space::UnitMoves;
use civ_mcts::mcts::simulation::RolloutEnd;
use civ_mcts::{GameAdapter, MctsHyperparameters, Result, SearchSession, Stage, Step};

const WORKER_MOVES: [&str; 3] = ["farm", "mine", "road"];
const WARRIOR_MOVES: [&str; 3] = ["fortify", "sentry", "explore"];

/// One player with a worker and a warrior against a passive opponent.
/// Every rollout is a draw, so only visit counts drive the search.
struct TwoUnitGame {
    plies: usize,
}

impl GameAdapter for TwoUnitGame {
    type Player = u8;
    type UnitId = &'static str;
    type Move = &'static str;

    fn available_moves(&self, player: u8) -> Result<Vec<UnitMoves<&'static str, &'static str>>> {
        Ok(match player {
            0 => vec![
                UnitMoves::new("worker", WORKER_MOVES.to_vec()),
                UnitMoves::new("warrior", WARRIOR_MOVES.to_vec()),
            ],
            _ => vec![UnitMoves::new("scout", vec!["wait"])],
        })
    }

    fn next_player_after(&self, player: u8) -> u8 {
        1 - player
    }

    fn apply_move(&mut self, _unit_id: &&'static str, _mv: &&'static str) -> Result<()> {
        self.plies += 1;
        Ok(())
    }

    fn evaluate_outcome(&self, _end: RolloutEnd) -> Result<Outcomes<u8>> {
        Ok(Outcomes::from([(0, Outcome::Draw), (1, Outcome::Draw)]))
    }
}

fn drive_until_budget(
    session: &mut SearchSession<TwoUnitGame>,
    game: &mut TwoUnitGame,
    budget: usize,
) {
    let mut ticks = 0;
    while session.iterations() < budget {
        let step = session.advance(game).unwrap();
        assert!(!matches!(step, Step::Decided(_) | Step::Idle));
        ticks += 1;
        assert!(ticks < budget * 100, "search does not make progress");
    }
}

#[test]
fn test_two_units_three_moves_each() {
    let params = MctsHyperparameters {
        seed: Some(42),
        ..Default::default()
    };
    let mut game = TwoUnitGame { plies: 0 };
    let mut session = SearchSession::new(0, params).unwrap();

    drive_until_budget(&mut session, &mut game, 600);

    let tree = session.tree();
    let root = tree.get(tree.root());
    assert_eq!(root.total_move_count, 9);
    assert_eq!(root.visits, 600);
    assert!(root.children.len() <= 9);
    let child_visits: u32 = root.children.iter().map(|&c| tree.get(c).visits).sum();
    assert_eq!(child_visits, 600);
    assert!(session.at_root());
    assert_eq!(session.stage(), Stage::Selection);

    let Step::Decided(Some(decision)) = session.advance(&mut game).unwrap() else {
        panic!("expected a decision");
    };
    assert_eq!(decision.len(), 2);
    assert!(WORKER_MOVES.contains(decision.move_for_unit(&"worker").unwrap()));
    assert!(WARRIOR_MOVES.contains(decision.move_for_unit(&"warrior").unwrap()));
    assert!(decision.move_index < 9);
    assert!(session.tree().is_empty());
}

#[test]
fn test_robust_child_has_the_most_visits() {
    let params = MctsHyperparameters {
        iteration_budget: 120,
        max_rollout_depth: 3,
        scoring: ScoringPolicy::WinOnly,
        seed: Some(3),
        ..Default::default()
    };
    let mut game = TwoUnitGame { plies: 0 };
    let mut session = SearchSession::new(0, params).unwrap();
    drive_until_budget(&mut session, &mut game, 120);

    let tree = session.tree();
    let most_visits = tree
        .get(tree.root())
        .children
        .iter()
        .map(|&c| tree.get(c).visits)
        .max()
        .unwrap();

    let Step::Decided(Some(decision)) = session.advance(&mut game).unwrap() else {
        panic!("expected a decision");
    };
    assert_eq!(decision.visits, most_visits);
    assert_eq!(decision.iterations, 120);
}

#[test]
fn test_rollout_depth_bounds_every_iteration() {
    let params = MctsHyperparameters {
        iteration_budget: 10,
        max_rollout_depth: 4,
        seed: Some(5),
        ..Default::default()
    };
    let mut game = TwoUnitGame { plies: 0 };
    let mut session = SearchSession::new(0, params).unwrap();

    let mut rollout_steps = 0;
    let mut ends = Vec::new();
    loop {
        match session.advance(&mut game).unwrap() {
            Step::RolloutStep { depth } => {
                assert!(depth <= 4);
                rollout_steps += 1;
            }
            Step::Backpropagated { end, .. } => ends.push(end),
            Step::Decided(_) => break,
            _ => {}
        }
    }
    assert_eq!(rollout_steps, 40);
    assert_eq!(ends, vec![RolloutEnd::DepthLimit; 10]);
}
