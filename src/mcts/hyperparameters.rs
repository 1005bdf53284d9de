//! MCTS Hyperparameters Configuration
//!
//! This module defines all tunable hyperparameters for the resumable search.
//! Defaults reproduce the engine's reference tuning: 600 iterations per
//! decision, rollouts of at most 20 plies, at most 30 sampled joint moves per
//! node and at most 3 candidate moves per unit.

use crate::mcts::backpropagation::ScoringPolicy;
use crate::mcts::pruning::PruningLevel;
use crate::{CivMctsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// MCTS hyperparameters configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsHyperparameters {
    // ========== Budgets ==========
    /// Maximum number of rollout plies before an iteration is backpropagated
    /// Default: 20
    pub max_rollout_depth: usize,

    /// Number of completed iterations after which the final move is chosen
    /// Default: 600
    pub iteration_budget: usize,

    // ========== Selection ==========
    /// Exploration constant C of the UCT formula
    /// Default: sqrt(2)
    pub uct_constant: f64,

    // ========== Branch Limiting ==========
    /// Sample the joint move space instead of enumerating it
    /// Default: true
    pub branch_limited: bool,

    /// Maximum number of untried joint moves drawn per node
    /// Default: 30
    pub branch_limit: usize,

    // ========== Per-Unit Pruning ==========
    /// How each unit's move list is cut down before the move space is built
    /// Default: Random
    pub pruning: PruningLevel,

    /// Maximum number of candidate moves kept per unit
    /// Default: 3
    pub max_unit_moves: usize,

    // ========== Scoring ==========
    /// Contribution of a loss during backpropagation
    /// Default: Signed (+1 / 0 / -1)
    pub scoring: ScoringPolicy,

    /// Seed for the search RNG; `None` draws one from the thread RNG
    pub seed: Option<u64>,
}

impl Default for MctsHyperparameters {
    fn default() -> Self {
        Self {
            max_rollout_depth: 20,
            iteration_budget: 600,
            uct_constant: std::f64::consts::SQRT_2,
            branch_limited: true,
            branch_limit: 30,
            pruning: PruningLevel::Random,
            max_unit_moves: 3,
            scoring: ScoringPolicy::Signed,
            seed: None,
        }
    }
}

impl MctsHyperparameters {
    /// Load hyperparameters from a JSON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&raw)?;
        params.validate()?;
        Ok(params)
    }

    /// Write hyperparameters as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.iteration_budget == 0 {
            return Err(CivMctsError::Config(
                "iteration_budget must be at least 1".to_string(),
            ));
        }
        if self.max_rollout_depth == 0 {
            return Err(CivMctsError::Config(
                "max_rollout_depth must be at least 1".to_string(),
            ));
        }
        if self.branch_limited && self.branch_limit == 0 {
            return Err(CivMctsError::Config(
                "branch_limit must be at least 1 when branch limiting is on".to_string(),
            ));
        }
        if self.pruning == PruningLevel::Random && self.max_unit_moves == 0 {
            return Err(CivMctsError::Config(
                "max_unit_moves must be at least 1 when pruning is on".to_string(),
            ));
        }
        if !self.uct_constant.is_finite() || self.uct_constant < 0.0 {
            return Err(CivMctsError::Config(format!(
                "uct_constant must be a non-negative number, got {}",
                self.uct_constant
            )));
        }
        Ok(())
    }

    /// Effective cap on the untried set of a node
    pub fn effective_branch_limit(&self) -> Option<usize> {
        self.branch_limited.then_some(self.branch_limit)
    }

    /// Create a configuration string for logging
    pub fn to_config_string(&self) -> String {
        format!(
            "iter[{}]_depth[{}]_c[{:.3}]_branch[{}]_prune[{:?}x{}]_score[{:?}]",
            self.iteration_budget,
            self.max_rollout_depth,
            self.uct_constant,
            self.effective_branch_limit()
                .map_or_else(|| "all".to_string(), |limit| limit.to_string()),
            self.pruning,
            self.max_unit_moves,
            self.scoring
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults_are_valid() {
        let params = MctsHyperparameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.iteration_budget, 600);
        assert_eq!(params.max_rollout_depth, 20);
        assert_eq!(params.branch_limit, 30);
        assert_eq!(params.max_unit_moves, 3);
        assert!((params.uct_constant - 1.41421356237).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let params = MctsHyperparameters {
            iteration_budget: 0,
            ..Default::default()
        };
        assert_matches!(params.validate(), Err(CivMctsError::Config(_)));
    }

    #[test]
    fn test_zero_branch_limit_only_matters_when_limited() {
        let mut params = MctsHyperparameters {
            branch_limit: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        params.branch_limited = false;
        assert!(params.validate().is_ok());
        assert_eq!(params.effective_branch_limit(), None);
    }

    #[test]
    fn test_negative_uct_constant_rejected() {
        let params = MctsHyperparameters {
            uct_constant: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = MctsHyperparameters {
            uct_constant: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcts.json");

        let params = MctsHyperparameters {
            iteration_budget: 42,
            scoring: ScoringPolicy::WinOnly,
            seed: Some(9),
            ..Default::default()
        };
        params.save(&path).unwrap();

        let loaded = MctsHyperparameters::load(&path).unwrap();
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "iteration_budget": 50 }"#).unwrap();

        let loaded = MctsHyperparameters::load(&path).unwrap();
        assert_eq!(loaded.iteration_budget, 50);
        assert_eq!(loaded.branch_limit, 30);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert_matches!(MctsHyperparameters::load(&path), Err(CivMctsError::Json(_)));
    }

    #[test]
    fn test_config_string() {
        let params = MctsHyperparameters::default();
        let config = params.to_config_string();
        assert!(config.contains("iter[600]"));
        assert!(config.contains("branch[30]"));
    }
}
