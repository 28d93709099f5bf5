use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Upper bounds accepted by [`MatchConfig::validate`].
pub const MAX_WIN_THRESHOLD: u32 = 99;
pub const MAX_SETS_TO_WIN: u32 = 9;

/// Match rules. Persisted with the state so a restored match keeps its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    /// Minimum points to take a set (still subject to the 2-point margin).
    pub win_threshold: u32,
    pub sets_to_win: u32,
    /// Timeouts per team per set.
    pub max_timeouts: u32,
    /// Regular substitutions per team per set. Libero exchanges do not count.
    pub max_subs: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { win_threshold: 25, sets_to_win: 3, max_timeouts: 2, max_subs: 6 }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.win_threshold == 0 {
            return Err(MatchError::InvalidConfig("winThreshold must be at least 1".to_string()));
        }
        if self.win_threshold > MAX_WIN_THRESHOLD {
            return Err(MatchError::InvalidConfig(format!(
                "winThreshold must be at most {}",
                MAX_WIN_THRESHOLD
            )));
        }
        if self.sets_to_win == 0 {
            return Err(MatchError::InvalidConfig("setsToWin must be at least 1".to_string()));
        }
        if self.sets_to_win > MAX_SETS_TO_WIN {
            return Err(MatchError::InvalidConfig(format!(
                "setsToWin must be at most {}",
                MAX_SETS_TO_WIN
            )));
        }
        Ok(())
    }

    /// Longest possible match (5 for best-of-5).
    pub fn max_sets(&self) -> u32 {
        self.sets_to_win.saturating_mul(2).saturating_sub(1)
    }

    /// Sets already played when the deciding set is about to start.
    pub fn sets_before_deciding_set(&self) -> u32 {
        self.sets_to_win.saturating_mul(2).saturating_sub(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_of_five_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.max_sets(), 5);
        assert_eq!(config.sets_before_deciding_set(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sets_rejected() {
        let config = MatchConfig { sets_to_win: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(MatchError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_rules_rejected() {
        let huge_sets = MatchConfig { sets_to_win: 3_000_000_000, ..Default::default() };
        assert!(matches!(huge_sets.validate(), Err(MatchError::InvalidConfig(_))));
        let huge_threshold = MatchConfig { win_threshold: 1000, ..Default::default() };
        assert!(matches!(huge_threshold.validate(), Err(MatchError::InvalidConfig(_))));
        let widest = MatchConfig { sets_to_win: MAX_SETS_TO_WIN, ..Default::default() };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_set_counts_saturate() {
        let zero = MatchConfig { sets_to_win: 0, ..Default::default() };
        assert_eq!(zero.max_sets(), 0);
        assert_eq!(zero.sets_before_deciding_set(), 0);
        let huge = MatchConfig { sets_to_win: u32::MAX, ..Default::default() };
        assert_eq!(huge.sets_before_deciding_set(), u32::MAX - 2);
    }
}
