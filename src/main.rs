use civ_mcts::driver::MctsDriver;
use civ_mcts::game::skirmish::{Skirmish, DEFAULT_MAX_TURNS};
use civ_mcts::logging::{setup_logging, LogConfig};
use civ_mcts::mcts::adapter::HostGame;
use civ_mcts::mcts::backpropagation::ScoringPolicy;
use civ_mcts::mcts::hyperparameters::MctsHyperparameters;
use civ_mcts::mcts::pruning::PruningLevel;
use civ_mcts::recording::TimingCsvWriter;
use clap::Parser;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum PruningCli {
    None,
    Random,
}

impl From<PruningCli> for PruningLevel {
    fn from(cli: PruningCli) -> Self {
        match cli {
            PruningCli::None => PruningLevel::None,
            PruningCli::Random => PruningLevel::Random,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum ScoringCli {
    Signed,
    WinOnly,
}

impl From<ScoringCli> for ScoringPolicy {
    fn from(cli: ScoringCli) -> Self {
        match cli {
            ScoringCli::Signed => ScoringPolicy::Signed,
            ScoringCli::WinOnly => ScoringPolicy::WinOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "civ_mcts", about = "Skirmish self-play with the MCTS unit planner")]
struct Config {
    /// Number of games to play
    #[arg(short = 'g', long, default_value_t = 5)]
    num_games: usize,

    /// Players per game
    #[arg(long, default_value_t = 2)]
    players: usize,

    /// Units each player starts with
    #[arg(long, default_value_t = 3)]
    units: usize,

    /// Rounds before the game is scored
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,

    /// Players controlled by MCTS; the others play the default policy
    #[arg(long, value_delimiter = ',', default_value = "0")]
    mcts_players: Vec<usize>,

    /// Seed of game `i` is `seed + i`
    #[arg(long, default_value_t = 2026)]
    seed: u64,

    /// Completed iterations per decision
    #[arg(short = 'i', long, default_value_t = 600)]
    iterations: usize,

    /// Default-policy plies per rollout
    #[arg(short = 'd', long, default_value_t = 20)]
    rollout_depth: usize,

    /// UCT exploration constant
    #[arg(long, default_value_t = std::f64::consts::SQRT_2)]
    uct_constant: f64,

    /// Untried joint moves sampled per node
    #[arg(long, default_value_t = 30)]
    branch_limit: usize,

    /// Enumerate every joint move instead of sampling
    #[arg(long, default_value_t = false)]
    no_branch_limit: bool,

    /// Per-unit move pruning
    #[arg(long, value_enum, default_value = "random")]
    pruning: PruningCli,

    /// Moves kept per unit when pruning
    #[arg(long, default_value_t = 3)]
    max_unit_moves: usize,

    /// How rollout outcomes are scored
    #[arg(long, value_enum, default_value = "signed")]
    scoring: ScoringCli,

    /// Seed the search instead of drawing fresh entropy per decision
    #[arg(long)]
    search_seed: Option<u64>,

    /// Load search settings from a JSON file (overrides the flags above)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective search settings to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Directory for per-decision stage timing CSV files
    #[arg(long)]
    timings_csv: Option<PathBuf>,

    /// Directory for rotated log files; stderr only when absent
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Config {
    fn hyperparameters(&self) -> civ_mcts::Result<MctsHyperparameters> {
        let params = match &self.config {
            Some(path) => MctsHyperparameters::load(path)?,
            None => MctsHyperparameters {
                max_rollout_depth: self.rollout_depth,
                iteration_budget: self.iterations,
                uct_constant: self.uct_constant,
                branch_limited: !self.no_branch_limit,
                branch_limit: self.branch_limit,
                pruning: self.pruning.clone().into(),
                max_unit_moves: self.max_unit_moves,
                scoring: self.scoring.clone().into(),
                seed: self.search_seed,
            },
        };
        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let _logger = setup_logging(&LogConfig {
        level: config.log_level.clone(),
        directory: config.log_dir.clone(),
        ..Default::default()
    })?;

    let params = config.hyperparameters()?;
    if let Some(path) = &config.save_config {
        params.save(path)?;
        log::info!("Saved search settings to {}", path.display());
    }
    log::info!("Search settings: {}", params.to_config_string());

    let mut timing_writer = match &config.timings_csv {
        Some(dir) => Some(TimingCsvWriter::new(dir)?),
        None => None,
    };

    let mut mcts_wins = 0;
    for game_index in 0..config.num_games {
        let mut game = Skirmish::new(
            config.players,
            config.units,
            config.seed + game_index as u64,
        )
        .with_max_turns(config.max_turns);
        let mut driver = MctsDriver::new(params.clone());

        while !game.is_over() {
            let player = game.current_player();
            if !config.mcts_players.contains(&player) {
                game.play_default_ply()?;
                continue;
            }

            let decision = match driver.run_to_decision(&mut game) {
                Ok(decision) => decision,
                Err(err) => {
                    log::warn!("search failed for player {}: {}; playing default ply", player, err);
                    game.play_default_ply()?;
                    continue;
                }
            };
            if let Some(decision) = &decision {
                let moves: Vec<String> = decision
                    .moves
                    .iter()
                    .map(|(unit, mv)| format!("#{} {}", unit, mv))
                    .collect();
                log::debug!(
                    "turn {} player {}: {} ({} visits)",
                    game.turn(),
                    player,
                    moves.join(", "),
                    decision.visits
                );
            }
            if let (Some(writer), Some(finished)) = (timing_writer.as_mut(), driver.last_finished())
            {
                writer.write_session(finished.id, &finished.timings)?;
            }
        }

        let leaders = game.leaders();
        let scores: Vec<String> = (0..game.players())
            .map(|p| format!("p{}={}", p, game.score(p)))
            .collect();
        if leaders.len() == 1 && config.mcts_players.contains(&leaders[0]) {
            mcts_wins += 1;
        }
        log::info!(
            "Game {}/{}: {} after {} rounds, {} MCTS decisions, leaders {:?}",
            game_index + 1,
            config.num_games,
            scores.join(" "),
            game.turn(),
            driver.decisions(),
            leaders
        );
    }

    log::info!(
        "MCTS players {:?} won {}/{} games outright",
        config.mcts_players,
        mcts_wins,
        config.num_games
    );
    Ok(())
}
