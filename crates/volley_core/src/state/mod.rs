//! Match State
//!
//! `MatchState` is the single value describing a running match. The
//! presentation layer owns it (usually through
//! [`MatchSession`](crate::MatchSession)) and every change goes through the
//! operations in [`crate::engine`]. Nothing here is global.

use serde::{Deserialize, Serialize};

use crate::models::{MatchConfig, Player, Team, TeamId};

/// Players in a fresh template roster.
pub const DEFAULT_ROSTER_SIZE: u32 = 14;

/// Result of a finished set, oriented from the set winner ("25-21").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScore {
    pub winner_id: TeamId,
    pub score: String,
}

/// Where the match stands. `SetComplete` is transient; it is reported by
/// [`PointOutcome`](crate::PointOutcome) and never observed between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    AwaitingServeChoice,
    AwaitingLineup,
    SetInProgress,
    SetComplete,
    MatchComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub sides_swapped: bool,
    #[serde(default)]
    pub set_scores: Vec<SetScore>,
    #[serde(default)]
    pub initial_serve_team_id: Option<TeamId>,
    #[serde(default)]
    pub first_serve_of_set_id: Option<TeamId>,
    #[serde(default)]
    pub match_log: Vec<String>,
    #[serde(default)]
    pub config: MatchConfig,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Fresh match with template rosters and default rules.
    pub fn new() -> Self {
        Self::with_config(MatchConfig::default())
    }

    /// Fresh match with the given rules. `config` is taken as is; callers
    /// accepting rules from outside run [`MatchConfig::validate`] first.
    pub fn with_config(config: MatchConfig) -> Self {
        let roster_a = (1..=DEFAULT_ROSTER_SIZE).map(Player::placeholder).collect();
        let roster_b = (DEFAULT_ROSTER_SIZE + 1..=DEFAULT_ROSTER_SIZE * 2)
            .map(Player::placeholder)
            .collect();

        Self {
            team_a: Team::new(TeamId::A, "Home Team", roster_a),
            team_b: Team::new(TeamId::B, "Away Team", roster_b),
            sides_swapped: false,
            set_scores: Vec::new(),
            initial_serve_team_id: None,
            first_serve_of_set_id: None,
            match_log: Vec::new(),
            config,
        }
    }

    pub fn team(&self, id: TeamId) -> &Team {
        match id {
            TeamId::A => &self.team_a,
            TeamId::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, id: TeamId) -> &mut Team {
        match id {
            TeamId::A => &mut self.team_a,
            TeamId::B => &mut self.team_b,
        }
    }

    pub fn teams_mut(&mut self) -> [&mut Team; 2] {
        [&mut self.team_a, &mut self.team_b]
    }

    /// Zero-based index of the set being played (sets won so far by both teams).
    pub fn current_set_index(&self) -> usize {
        (self.team_a.sets + self.team_b.sets) as usize
    }

    pub fn serving_team(&self) -> Option<TeamId> {
        match (self.team_a.serving, self.team_b.serving) {
            (true, false) => Some(TeamId::A),
            (false, true) => Some(TeamId::B),
            _ => None,
        }
    }

    pub(crate) fn give_serve_to(&mut self, id: TeamId) {
        self.team_a.serving = id == TeamId::A;
        self.team_b.serving = id == TeamId::B;
    }

    /// Team that has reached `setsToWin`, if any.
    pub fn winner(&self) -> Option<TeamId> {
        let target = self.config.sets_to_win;
        if self.team_a.sets >= target {
            Some(TeamId::A)
        } else if self.team_b.sets >= target {
            Some(TeamId::B)
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winner().is_some()
    }

    pub fn phase(&self) -> MatchPhase {
        if self.is_complete() {
            MatchPhase::MatchComplete
        } else if self.initial_serve_team_id.is_none() {
            MatchPhase::AwaitingServeChoice
        } else if !self.lineups_complete() {
            MatchPhase::AwaitingLineup
        } else {
            MatchPhase::SetInProgress
        }
    }

    pub fn lineups_complete(&self) -> bool {
        self.team_a.lineup_complete() && self.team_b.lineup_complete()
    }

    pub fn log_event(&mut self, message: impl Into<String>) {
        self.match_log.push(message.into());
    }

    /// Score with team A first ("12-10").
    pub fn score_line(&self) -> String {
        format!("{}-{}", self.team_a.score, self.team_b.score)
    }
}
