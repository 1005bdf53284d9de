//! Rollout bookkeeping.
//!
//! The engine never picks rollout moves itself; the host plays one default
//! ply per simulation tick. This module only counts those plies and says when
//! the rollout has run out of depth.

/// Why a rollout stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutEnd {
    /// The configured number of plies was played
    DepthLimit,
    /// The game ended, or reached a dead end, before the depth limit
    Interrupted,
}

impl RolloutEnd {
    pub fn is_interrupted(self) -> bool {
        self == RolloutEnd::Interrupted
    }
}

/// Rollout depth counter, reset on every expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    depth: usize,
    max_depth: usize,
}

impl Rollout {
    pub fn new(max_depth: usize) -> Self {
        Self { depth: 0, max_depth }
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_exhausted(&self) -> bool {
        self.depth >= self.max_depth
    }

    /// Accounts for one more ply and returns the new depth
    pub fn advance(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_counts_to_limit() {
        let mut rollout = Rollout::new(3);
        assert!(!rollout.is_exhausted());
        assert_eq!(rollout.advance(), 1);
        assert_eq!(rollout.advance(), 2);
        assert!(!rollout.is_exhausted());
        assert_eq!(rollout.advance(), 3);
        assert!(rollout.is_exhausted());

        rollout.reset();
        assert_eq!(rollout.depth(), 0);
        assert_eq!(rollout.max_depth(), 3);
    }

    #[test]
    fn test_rollout_end_flag() {
        assert!(RolloutEnd::Interrupted.is_interrupted());
        assert!(!RolloutEnd::DepthLimit.is_interrupted());
    }
}
