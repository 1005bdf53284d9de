//! # civ_mcts
//!
//! A resumable Monte Carlo Tree Search engine that picks a joint move for every
//! unit a player controls in a turn-based strategy game.
//!
//! ## Features
//!
//! - **Stage machine**: one bounded unit of MCTS work per scheduling tick
//! - **Mixed-radix move space**: a single integer encodes one move per unit
//! - **Branch limiting**: bounded random sampling of the joint move space
//! - **Host driver**: checkpoint restore between simulated iterations
//! - **Demo game**: a small skirmish game used by the CLI and the tests
//!
//! ## Usage
//!
//! ```rust
//! use civ_mcts::{
//!     driver::MctsDriver,
//!     game::skirmish::Skirmish,
//!     mcts::hyperparameters::MctsHyperparameters,
//! };
//!
//! let params = MctsHyperparameters { iteration_budget: 10, seed: Some(7), ..Default::default() };
//! let mut game = Skirmish::new(2, 2, 1);
//! let mut driver = MctsDriver::new(params);
//! let decision = driver.run_to_decision(&mut game).unwrap();
//! assert!(decision.is_some());
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Monte Carlo Tree Search engine
pub mod mcts;

/// Host-side driver gluing the engine to a live game
pub mod driver;

/// Demo game implementing the engine's collaborator contract
pub mod game;

/// CSV export of search timings
pub mod recording;

/// Logger setup
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use mcts::adapter::GameAdapter;
pub use mcts::decision::Decision;
pub use mcts::hyperparameters::MctsHyperparameters;
pub use mcts::session::{SearchSession, Stage, Step};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the civ_mcts library
#[derive(Debug, thiserror::Error)]
pub enum CivMctsError {
    #[error("Game error: {0}")]
    Game(String),

    #[error("Move index {index} out of range for a move space of {total}")]
    MoveIndexOutOfRange { index: u64, total: u64 },

    #[error("Unit position {position} out of range for {units} units")]
    UnitPositionOutOfRange { position: usize, units: usize },

    #[error("Inconsistent search tree: {0}")]
    InconsistentTree(String),

    #[error("Joint move space does not fit in 64 bits")]
    MoveSpaceOverflow,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CivMctsError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
