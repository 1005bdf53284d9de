//! Skirmish: a small simultaneous-unit strategy game.
//!
//! Every player starts with a handful of settlers, soldiers and explorers on a
//! square grid. Settlers found cities, soldiers attack adjacent enemies and
//! capture enemy cities, explorers only move. A player scores 3 per city and 1
//! per unit; the game ends after a fixed number of rounds or when at most one
//! player is left standing.
//!
//! Combat is deterministic, so replaying the same joint moves from a
//! checkpoint always reaches the same state.

use crate::mcts::adapter::{GameAdapter, HostGame};
use crate::mcts::backpropagation::{Outcome, Outcomes};
use crate::mcts::move_space::UnitMoves;
use crate::mcts::simulation::RolloutEnd;
use crate::{CivMctsError, Result};
use log::trace;
use rand::prelude::*;
use std::fmt;

pub const GRID_SIZE: i32 = 8;
pub const DEFAULT_MAX_TURNS: u32 = 30;
const MAX_PLAYERS: usize = 8;
const CITY_POINTS: i64 = 3;

pub type UnitId = u32;
pub type Position = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    fn offset(self) -> Position {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Settler,
    Soldier,
    Explorer,
}

impl UnitKind {
    fn max_hp(self) -> i32 {
        match self {
            UnitKind::Soldier => 3,
            UnitKind::Settler | UnitKind::Explorer => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkirmishMove {
    Step(Direction),
    BuildCity,
    Fortify,
    Sentry,
    Pillage,
    Attack(UnitId),
}

impl fmt::Display for SkirmishMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkirmishMove::Step(direction) => write!(f, "step {:?}", direction),
            SkirmishMove::BuildCity => write!(f, "build city"),
            SkirmishMove::Fortify => write!(f, "fortify"),
            SkirmishMove::Sentry => write!(f, "sentry"),
            SkirmishMove::Pillage => write!(f, "pillage"),
            SkirmishMove::Attack(target) => write!(f, "attack #{}", target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub owner: usize,
    pub kind: UnitKind,
    pub position: Position,
    pub hp: i32,
    pub fortified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub owner: usize,
    pub position: Position,
}

/// Everything a checkpoint has to capture
#[derive(Debug, Clone, PartialEq, Eq)]
struct SkirmishState {
    units: Vec<Unit>,
    cities: Vec<City>,
    current: usize,
    turn: u32,
}

pub struct Skirmish {
    players: usize,
    max_turns: u32,
    state: SkirmishState,
    checkpoint: Option<SkirmishState>,
    rng: StdRng,
}

impl Skirmish {
    /// `players` is clamped to 2..=8 and `units_per_player` to one grid row.
    ///
    /// Unit `k` of each player is a settler when `k % 3 == 0`, a soldier when
    /// `k % 3 == 1` and an explorer otherwise.
    pub fn new(players: usize, units_per_player: usize, seed: u64) -> Self {
        let players = players.clamp(2, MAX_PLAYERS);
        let units_per_player = units_per_player.clamp(1, GRID_SIZE as usize);

        let mut units = Vec::with_capacity(players * units_per_player);
        for owner in 0..players {
            let row = (owner as i32 * GRID_SIZE) / players as i32;
            for k in 0..units_per_player {
                let kind = match k % 3 {
                    0 => UnitKind::Settler,
                    1 => UnitKind::Soldier,
                    _ => UnitKind::Explorer,
                };
                units.push(Unit {
                    id: units.len() as UnitId,
                    owner,
                    kind,
                    position: (k as i32, row),
                    hp: kind.max_hp(),
                    fortified: false,
                });
            }
        }

        Self {
            players,
            max_turns: DEFAULT_MAX_TURNS,
            state: SkirmishState {
                units,
                cities: Vec::new(),
                current: 0,
                turn: 0,
            },
            checkpoint: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn players(&self) -> usize {
        self.players
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn units(&self) -> &[Unit] {
        &self.state.units
    }

    pub fn cities(&self) -> &[City] {
        &self.state.cities
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.state.units.iter().find(|unit| unit.id == id)
    }

    pub fn units_of(&self, player: usize) -> impl Iterator<Item = &Unit> + '_ {
        self.state.units.iter().filter(move |unit| unit.owner == player)
    }

    pub fn city_count(&self, player: usize) -> usize {
        self.state
            .cities
            .iter()
            .filter(|city| city.owner == player)
            .count()
    }

    pub fn score(&self, player: usize) -> i64 {
        self.city_count(player) as i64 * CITY_POINTS + self.units_of(player).count() as i64
    }

    pub fn is_eliminated(&self, player: usize) -> bool {
        self.units_of(player).next().is_none() && self.city_count(player) == 0
    }

    fn standing_players(&self) -> usize {
        (0..self.players).filter(|&p| !self.is_eliminated(p)).count()
    }

    /// Players sharing the best score once the game is over
    pub fn leaders(&self) -> Vec<usize> {
        let best = (0..self.players).map(|p| self.score(p)).max().unwrap_or(0);
        (0..self.players)
            .filter(|&p| !self.is_eliminated(p) && self.score(p) == best)
            .collect()
    }

    fn in_bounds((x, y): Position) -> bool {
        (0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&y)
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.state.units.iter().any(|unit| unit.position == position)
    }

    fn city_at(&self, position: Position) -> Option<&City> {
        self.state.cities.iter().find(|city| city.position == position)
    }

    fn adjacent((ax, ay): Position, (bx, by): Position) -> bool {
        (ax - bx).abs() + (ay - by).abs() == 1
    }

    /// Legal moves of one unit in the current state
    pub fn legal_moves(&self, unit: &Unit) -> Vec<SkirmishMove> {
        let mut moves = vec![SkirmishMove::Sentry];

        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let target = (unit.position.0 + dx, unit.position.1 + dy);
            if Self::in_bounds(target) && !self.is_occupied(target) {
                moves.push(SkirmishMove::Step(direction));
            }
        }

        match unit.kind {
            UnitKind::Settler => {
                if self.city_at(unit.position).is_none() {
                    moves.push(SkirmishMove::BuildCity);
                }
            }
            UnitKind::Soldier => {
                if !unit.fortified {
                    moves.push(SkirmishMove::Fortify);
                }
                if self
                    .city_at(unit.position)
                    .is_some_and(|city| city.owner != unit.owner)
                {
                    moves.push(SkirmishMove::Pillage);
                }
                for enemy in &self.state.units {
                    if enemy.owner != unit.owner && Self::adjacent(unit.position, enemy.position) {
                        moves.push(SkirmishMove::Attack(enemy.id));
                    }
                }
            }
            UnitKind::Explorer => {}
        }
        moves
    }

    fn unit_index(&self, id: UnitId) -> Option<usize> {
        self.state.units.iter().position(|unit| unit.id == id)
    }

    /// Applies `mv` if it is still legal; stale moves are skipped
    fn apply(&mut self, index: usize, mv: SkirmishMove) -> bool {
        let unit = self.state.units[index].clone();
        if !self.legal_moves(&unit).contains(&mv) {
            return false;
        }

        match mv {
            SkirmishMove::Sentry => {}
            SkirmishMove::Step(direction) => {
                let (dx, dy) = direction.offset();
                let moved = &mut self.state.units[index];
                moved.position = (unit.position.0 + dx, unit.position.1 + dy);
                moved.fortified = false;
            }
            SkirmishMove::BuildCity => {
                self.state.cities.push(City {
                    owner: unit.owner,
                    position: unit.position,
                });
                self.state.units.remove(index);
            }
            SkirmishMove::Fortify => self.state.units[index].fortified = true,
            SkirmishMove::Pillage => {
                if let Some(city) = self
                    .state
                    .cities
                    .iter_mut()
                    .find(|city| city.position == unit.position)
                {
                    city.owner = unit.owner;
                }
            }
            SkirmishMove::Attack(target) => {
                if let Some(target_index) = self.unit_index(target) {
                    let defender = &mut self.state.units[target_index];
                    defender.hp -= if defender.fortified { 1 } else { 2 };
                    if defender.hp <= 0 {
                        self.state.units.remove(target_index);
                    }
                }
            }
        }
        true
    }

    fn pick_default_move(&mut self, moves: &[SkirmishMove]) -> SkirmishMove {
        if moves.contains(&SkirmishMove::BuildCity) && self.rng.random_bool(0.5) {
            return SkirmishMove::BuildCity;
        }
        if let Some(attack) = moves
            .iter()
            .find(|mv| matches!(mv, SkirmishMove::Attack(_)))
        {
            return *attack;
        }
        moves
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(SkirmishMove::Sentry)
    }
}

impl GameAdapter for Skirmish {
    type Player = usize;
    type UnitId = UnitId;
    type Move = SkirmishMove;

    fn available_moves(&self, player: usize) -> Result<Vec<UnitMoves<UnitId, SkirmishMove>>> {
        if player >= self.players {
            return Err(CivMctsError::Game(format!(
                "no player {} in a {}-player game",
                player, self.players
            )));
        }
        Ok(self
            .units_of(player)
            .map(|unit| UnitMoves::new(unit.id, self.legal_moves(unit)))
            .collect())
    }

    fn next_player_after(&self, player: usize) -> usize {
        (1..=self.players)
            .map(|offset| (player + offset) % self.players)
            .find(|&p| !self.is_eliminated(p))
            .unwrap_or(player)
    }

    fn apply_move(&mut self, unit_id: &UnitId, mv: &SkirmishMove) -> Result<()> {
        match self.unit_index(*unit_id) {
            Some(index) => {
                if !self.apply(index, *mv) {
                    trace!("unit {} skips stale move {}", unit_id, mv);
                }
            }
            None => trace!("unit {} is gone, skipping {}", unit_id, mv),
        }
        Ok(())
    }

    fn end_turn(&mut self, player: usize) -> Result<()> {
        let next = self.next_player_after(player);
        if next <= player {
            self.state.turn += 1;
        }
        self.state.current = next;
        Ok(())
    }

    fn evaluate_outcome(&self, end: RolloutEnd) -> Result<Outcomes<usize>> {
        let leaders = self.leaders();
        trace!("evaluate after {:?}: leaders {:?}", end, leaders);
        Ok((0..self.players)
            .map(|p| {
                let outcome = if !leaders.contains(&p) {
                    Outcome::Loss
                } else if leaders.len() == 1 {
                    Outcome::Win
                } else {
                    Outcome::Draw
                };
                (p, outcome)
            })
            .collect())
    }

    fn is_priority_move(&self, mv: &SkirmishMove) -> bool {
        *mv == SkirmishMove::BuildCity
    }
}

impl HostGame for Skirmish {
    fn current_player(&self) -> usize {
        self.state.current
    }

    fn checkpoint_save(&mut self) -> Result<()> {
        self.checkpoint = Some(self.state.clone());
        Ok(())
    }

    fn checkpoint_restore(&mut self) -> Result<()> {
        match &self.checkpoint {
            Some(saved) => {
                self.state = saved.clone();
                Ok(())
            }
            None => Err(CivMctsError::Game("no checkpoint saved".to_string())),
        }
    }

    fn play_default_ply(&mut self) -> Result<()> {
        let player = self.state.current;
        let unit_ids: Vec<UnitId> = self.units_of(player).map(|unit| unit.id).collect();
        for id in unit_ids {
            let Some(index) = self.unit_index(id) else {
                continue;
            };
            let moves = self.legal_moves(&self.state.units[index]);
            let mv = self.pick_default_move(&moves);
            self.apply(index, mv);
        }
        self.end_turn(player)
    }

    fn is_over(&self) -> bool {
        self.state.turn >= self.max_turns || self.standing_players() <= 1
    }
}
