//! Scoring and set state machine.
//!
//! `AwaitingServeChoice → AwaitingLineup → SetInProgress → (SetComplete →
//! AwaitingLineup | MatchComplete)`
//!
//! Rally-point scoring: every rally gives a point to one team. A team that
//! wins the rally while receiving rotates before taking the serve. A set goes
//! to the first team with at least `winThreshold` points and a two-point lead.

use serde::{Deserialize, Serialize};

use super::stats::StatEntry;
use crate::error::{MatchError, Precondition, Result};
use crate::models::TeamId;
use crate::state::MatchState;

/// A finished set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResult {
    /// One-based.
    pub set_number: u32,
    pub winner: TeamId,
    pub winner_score: u32,
    pub loser_score: u32,
    /// Team serving first in the following set.
    pub next_server: TeamId,
    /// Whether sides were swapped for the following set.
    pub sides_swapped: bool,
}

impl SetResult {
    pub fn score(&self) -> String {
        format!("{}-{}", self.winner_score, self.loser_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOutcome {
    pub scorer: TeamId,
    /// The scorer recovered the serve and rotated.
    pub rotated: bool,
    pub set_result: Option<SetResult>,
    pub match_winner: Option<TeamId>,
}

impl PointOutcome {
    /// When true the next step is a lineup prompt, not a plain re-render.
    pub fn set_ended(&self) -> bool {
        self.set_result.is_some()
    }
}

/// What [`MatchState::apply_score_change`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreChange {
    /// Nothing to do (zero delta, or the correction would go below zero).
    Unchanged,
    /// A correction was applied immediately.
    Corrected { team: TeamId, score: u32 },
    /// The point must be attributed before it counts.
    NeedsAttribution(StatEntry),
}

/// Setup flow to open when the front end starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPrompt {
    LoadRosters,
    ChooseServe,
    ChooseLineup,
    Ready,
}

impl MatchState {
    fn play_started(&self) -> bool {
        !self.set_scores.is_empty() || self.team_a.score > 0 || self.team_b.score > 0
    }

    /// Picks the team serving the first set.
    pub fn choose_initial_serve(&mut self, team_id: TeamId) -> Result<()> {
        self.require_rosters()?;
        if self.play_started() {
            return Err(MatchError::PlayStarted);
        }

        self.initial_serve_team_id = Some(team_id);
        self.first_serve_of_set_id = Some(team_id);
        self.give_serve_to(team_id);
        log::info!("Team {} serves first", team_id);
        Ok(())
    }

    /// Serve chosen and both lineups confirmed.
    pub(crate) fn require_play_ready(&self) -> Result<()> {
        if self.initial_serve_team_id.is_none() {
            return Err(MatchError::PreconditionNotMet(Precondition::ServeNotChosen));
        }
        if !self.lineups_complete() {
            return Err(MatchError::PreconditionNotMet(Precondition::LineupRequired));
        }
        Ok(())
    }

    /// Requests a score change for `team_id`.
    ///
    /// A positive delta does not change the score yet: it opens the stat
    /// entry flow, and the point lands when that flow is committed. A
    /// negative delta is a correction and applies at once, without touching
    /// serve or rotation.
    pub fn apply_score_change(&mut self, team_id: TeamId, delta: i32) -> Result<ScoreChange> {
        self.require_play_ready()?;

        let team = self.team_mut(team_id);
        if delta == 0 || i64::from(team.score) + i64::from(delta) < 0 {
            return Ok(ScoreChange::Unchanged);
        }
        if delta > 0 {
            return Ok(ScoreChange::NeedsAttribution(StatEntry::new(team_id)));
        }

        team.score -= delta.unsigned_abs();
        Ok(ScoreChange::Corrected { team: team_id, score: team.score })
    }

    /// Awards one point to `team_id` and runs rotation, serve and set-win
    /// rules. Normally reached through [`MatchState::commit_stat`].
    pub fn commit_point(&mut self, team_id: TeamId) -> PointOutcome {
        let recovered_serve = !self.team(team_id).serving;

        let team = self.team_mut(team_id);
        team.score += 1;
        let rotated = recovered_serve && team.rotate();
        if rotated {
            log::debug!("Team {} recovered serve and rotated", team_id);
        }
        self.give_serve_to(team_id);

        let set_result = self.check_set_win();
        PointOutcome { scorer: team_id, rotated, set_result, match_winner: self.winner() }
    }

    fn set_winner(&self) -> Option<TeamId> {
        let threshold = self.config.win_threshold;
        let wins = |score: u32, opponent: u32| score >= threshold && score >= opponent + 2;

        if wins(self.team_a.score, self.team_b.score) {
            Some(TeamId::A)
        } else if wins(self.team_b.score, self.team_a.score) {
            Some(TeamId::B)
        } else {
            None
        }
    }

    fn check_set_win(&mut self) -> Option<SetResult> {
        let winner_id = self.set_winner()?;
        let winner_score = self.team(winner_id).score;
        let loser_score = self.team(winner_id.other()).score;

        self.team_mut(winner_id).sets += 1;
        let set_number = self.team_a.sets + self.team_b.sets;
        let winner_name = self.team(winner_id).name.clone();

        self.log_event(format!(
            "End of set {}. Result: {}-{} for {}",
            set_number, winner_score, loser_score, winner_name
        ));
        self.set_scores.push(crate::state::SetScore {
            winner_id,
            score: format!("{}-{}", winner_score, loser_score),
        });
        log::info!("Set {} won by {} {}-{}", set_number, winner_name, winner_score, loser_score);

        let (next_server, sides_swapped) = self.reset_for_next_set();
        Some(SetResult {
            set_number,
            winner: winner_id,
            winner_score,
            loser_score,
            next_server,
            sides_swapped,
        })
    }

    /// Clears per-set state and hands the first serve of the next set to
    /// the other team.
    fn reset_for_next_set(&mut self) -> (TeamId, bool) {
        for team in self.teams_mut() {
            team.score = 0;
            team.timeouts = 0;
            team.subs_used = 0;
            team.active_libero_indices.clear();
            team.clear_partner_links();
            team.starting_six = crate::models::team::empty_lineup();
        }

        let next_server = self.first_serve_of_set_id.map_or(TeamId::A, TeamId::other);
        self.first_serve_of_set_id = Some(next_server);
        self.give_serve_to(next_server);

        let sets_played = self.team_a.sets + self.team_b.sets;
        let deciding_set_next = sets_played == self.config.sets_before_deciding_set();
        if !deciding_set_next {
            self.swap_sides();
        }
        (next_server, !deciding_set_next)
    }

    /// Uses one of the team's timeouts for this set. Returns timeouts used.
    pub fn call_timeout(&mut self, team_id: TeamId) -> Result<u32> {
        let max_timeouts = self.config.max_timeouts;
        let team = self.team(team_id);
        if team.timeouts >= max_timeouts {
            return Err(MatchError::TimeoutLimitReached { team: team.name.clone() });
        }

        let team = self.team_mut(team_id);
        team.timeouts += 1;
        let (used, message) = (team.timeouts, format!("Timeout called by {}.", team.name));
        self.log_event(message);
        Ok(used)
    }

    pub fn swap_sides(&mut self) {
        self.sides_swapped = !self.sides_swapped;
    }

    /// Restarts the current set from 0-0. Lineups, finished sets and the log
    /// stay; the current set's statistics are discarded.
    pub fn reset_current_set(&mut self) {
        let set_index = self.current_set_index();
        for team in self.teams_mut() {
            team.score = 0;
            team.timeouts = 0;
            team.subs_used = 0;
            team.active_libero_indices.clear();
            team.clear_partner_links();
            if let Some(stats) = team.stats_by_set.get_mut(set_index) {
                stats.clear();
            }
        }
        if let Some(first) = self.first_serve_of_set_id {
            self.give_serve_to(first);
        }
        log::info!("Set {} restarted", set_index + 1);
    }

    /// Back to a fresh match with template rosters and default rules.
    pub fn reset_match(&mut self) {
        *self = MatchState::new();
        log::info!("Match reset");
    }

    /// Setup flow still missing, in the order the front end should run them.
    pub fn startup_prompt(&self) -> StartupPrompt {
        if !self.rosters_complete() {
            StartupPrompt::LoadRosters
        } else if self.initial_serve_team_id.is_none() {
            StartupPrompt::ChooseServe
        } else if !self.lineups_complete() && !self.is_complete() {
            StartupPrompt::ChooseLineup
        } else {
            StartupPrompt::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Staff;
    use crate::state::MatchPhase;

    fn ready_state(server: TeamId) -> MatchState {
        let mut state = MatchState::new();
        for id in [TeamId::A, TeamId::B] {
            let mut roster = state.team(id).roster.clone();
            roster[0].is_captain = true;
            state.update_roster(id, roster, Staff::default()).unwrap();
        }
        state.choose_initial_serve(server).unwrap();
        state.confirm_lineups(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 5]).unwrap();
        state
    }

    fn play_to(state: &mut MatchState, a: u32, b: u32) {
        // Alternate so neither side reaches a two-point lead early.
        let (mut sa, mut sb) = (0, 0);
        while sa < a || sb < b {
            if sa < a && (sa <= sb || sb >= b) {
                state.commit_point(TeamId::A);
                sa += 1;
            } else {
                state.commit_point(TeamId::B);
                sb += 1;
            }
        }
    }

    #[test]
    fn test_score_requires_serve_and_lineup() {
        let mut state = MatchState::new();
        assert_eq!(
            state.apply_score_change(TeamId::A, 1),
            Err(MatchError::PreconditionNotMet(Precondition::ServeNotChosen))
        );

        state.initial_serve_team_id = Some(TeamId::A);
        assert_eq!(
            state.apply_score_change(TeamId::A, 1),
            Err(MatchError::PreconditionNotMet(Precondition::LineupRequired))
        );
    }

    #[test]
    fn test_positive_delta_needs_attribution() {
        let mut state = ready_state(TeamId::A);
        let change = state.apply_score_change(TeamId::B, 1).unwrap();
        assert_eq!(change, ScoreChange::NeedsAttribution(StatEntry::new(TeamId::B)));
        assert_eq!(state.team_b.score, 0);
    }

    #[test]
    fn test_correction_never_goes_negative() {
        let mut state = ready_state(TeamId::A);
        assert_eq!(state.apply_score_change(TeamId::A, -1), Ok(ScoreChange::Unchanged));
        assert_eq!(state.team_a.score, 0);

        state.commit_point(TeamId::A);
        state.commit_point(TeamId::A);
        assert_eq!(
            state.apply_score_change(TeamId::A, -1),
            Ok(ScoreChange::Corrected { team: TeamId::A, score: 1 })
        );
        assert_eq!(state.serving_team(), Some(TeamId::A));
    }

    #[test]
    fn test_rotation_only_on_serve_recovery() {
        let mut state = ready_state(TeamId::A);

        let outcome = state.commit_point(TeamId::A);
        assert!(!outcome.rotated);
        assert_eq!(state.team_a.starting_six[0], Some(0));

        let outcome = state.commit_point(TeamId::B);
        assert!(outcome.rotated);
        assert_eq!(state.team_b.court_indices(), Some([1, 2, 3, 4, 5, 0]));
        assert_eq!(state.serving_team(), Some(TeamId::B));

        let outcome = state.commit_point(TeamId::B);
        assert!(!outcome.rotated);
        assert_eq!(state.team_b.court_indices(), Some([1, 2, 3, 4, 5, 0]));
    }

    #[test]
    fn test_set_needs_two_point_margin() {
        let mut state = ready_state(TeamId::A);
        play_to(&mut state, 24, 24);
        let outcome = state.commit_point(TeamId::A);
        assert!(!outcome.set_ended(), "25-24 continues");

        let outcome = state.commit_point(TeamId::A);
        let result = outcome.set_result.expect("26-24 ends the set");
        assert_eq!(result.score(), "26-24");
        assert_eq!(result.winner, TeamId::A);
        assert_eq!(state.team_a.sets, 1);
    }

    #[test]
    fn test_team_b_wins_with_margin() {
        let mut state = ready_state(TeamId::A);
        play_to(&mut state, 20, 24);
        let outcome = state.commit_point(TeamId::B);
        assert_eq!(outcome.set_result.map(|r| r.score()), Some("25-20".to_string()));
        assert_eq!(state.set_scores[0].winner_id, TeamId::B);
        assert_eq!(state.set_scores[0].score, "25-20");
        assert!(state.match_log.last().unwrap().contains("End of set 1"));
    }

    #[test]
    fn test_set_reset_clears_per_set_state() {
        let mut state = ready_state(TeamId::A);
        state.team_a.roster[12].is_libero = true;
        state.toggle_libero_active(TeamId::A, 12).unwrap();
        state.confirm_substitution(TeamId::A, Some(6), Some(1)).unwrap();
        state.call_timeout(TeamId::B).unwrap();
        let names_before: Vec<String> =
            state.team_a.roster.iter().map(|p| p.name.clone()).collect();

        play_to(&mut state, 24, 0);
        let outcome = state.commit_point(TeamId::A);
        assert!(outcome.set_ended());

        for team in [&state.team_a, &state.team_b] {
            assert_eq!(team.score, 0);
            assert_eq!(team.timeouts, 0);
            assert_eq!(team.subs_used, 0);
            assert!(team.active_libero_indices.is_empty());
            assert!(team.roster.iter().all(|p| p.sub_partner_index.is_none()));
            assert!(!team.lineup_complete());
        }
        let names_after: Vec<String> = state.team_a.roster.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names_before, names_after);
        assert!(state.team_a.roster[12].is_libero);
        assert!(state.team_a.roster[0].is_captain);
        assert_eq!(state.set_scores.len(), 1);
        assert_eq!(state.phase(), MatchPhase::AwaitingLineup);
    }

    #[test]
    fn test_next_set_serve_alternates_and_sides_swap() {
        let mut state = ready_state(TeamId::B);
        play_to(&mut state, 25, 0);

        assert_eq!(state.first_serve_of_set_id, Some(TeamId::A));
        assert_eq!(state.serving_team(), Some(TeamId::A));
        assert!(state.sides_swapped);
    }

    #[test]
    fn test_no_side_swap_before_deciding_set() {
        let mut state = ready_state(TeamId::A);
        let lineup = [0, 1, 2, 3, 4, 5];
        let winners = [TeamId::A, TeamId::B, TeamId::A, TeamId::B];

        let mut swaps = Vec::new();
        for winner in winners {
            state.confirm_lineups(&lineup, &lineup).unwrap();
            let mut outcome = state.commit_point(winner);
            while !outcome.set_ended() {
                outcome = state.commit_point(winner);
            }
            swaps.push(outcome.set_result.unwrap().sides_swapped);
        }

        assert_eq!(swaps, vec![true, true, true, false]);
        // Three swaps from the starting orientation.
        assert!(state.sides_swapped);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_match_completes_at_sets_to_win() {
        let mut state = ready_state(TeamId::A);
        let lineup = [0, 1, 2, 3, 4, 5];
        let mut last = None;
        for _ in 0..3 {
            state.confirm_lineups(&lineup, &lineup).unwrap();
            for _ in 0..25 {
                last = Some(state.commit_point(TeamId::B));
            }
        }
        assert_eq!(last.unwrap().match_winner, Some(TeamId::B));
        assert_eq!(state.phase(), MatchPhase::MatchComplete);
        assert_eq!(state.startup_prompt(), StartupPrompt::Ready);
    }

    #[test]
    fn test_unvalidated_huge_sets_to_win_ends_set_without_overflow() {
        let mut state = ready_state(TeamId::A);
        state.config.sets_to_win = u32::MAX;
        let mut outcome = state.commit_point(TeamId::A);
        while !outcome.set_ended() {
            outcome = state.commit_point(TeamId::A);
        }
        let result = outcome.set_result.unwrap();
        assert!(result.sides_swapped);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_timeouts_are_bounded() {
        let mut state = ready_state(TeamId::A);
        assert_eq!(state.call_timeout(TeamId::A), Ok(1));
        assert_eq!(state.call_timeout(TeamId::A), Ok(2));
        assert!(matches!(
            state.call_timeout(TeamId::A),
            Err(MatchError::TimeoutLimitReached { .. })
        ));
        assert_eq!(state.team_a.timeouts, 2);
        assert_eq!(state.match_log.len(), 2);
    }

    #[test]
    fn test_reset_current_set_keeps_lineups_and_history() {
        let mut state = ready_state(TeamId::A);
        state.commit_point(TeamId::B);
        state.commit_point(TeamId::B);
        let lineup_b = state.team_b.starting_six;

        state.reset_current_set();
        assert_eq!(state.score_line(), "0-0");
        assert_eq!(state.serving_team(), Some(TeamId::A));
        assert_eq!(state.team_b.starting_six, lineup_b);
    }

    #[test]
    fn test_serve_choice_locked_after_first_point() {
        let mut state = ready_state(TeamId::A);
        state.choose_initial_serve(TeamId::B).unwrap();
        state.commit_point(TeamId::A);
        assert_eq!(state.choose_initial_serve(TeamId::A), Err(MatchError::PlayStarted));
    }

    #[test]
    fn test_serve_choice_needs_rosters() {
        let mut state = MatchState::new();
        assert_eq!(
            state.choose_initial_serve(TeamId::A),
            Err(MatchError::PreconditionNotMet(Precondition::RostersIncomplete))
        );
        assert_eq!(state.startup_prompt(), StartupPrompt::LoadRosters);
    }

    #[test]
    fn test_startup_prompt_order() {
        let mut state = ready_state(TeamId::A);
        assert_eq!(state.startup_prompt(), StartupPrompt::Ready);
        state.team_a.starting_six = crate::models::team::empty_lineup();
        assert_eq!(state.startup_prompt(), StartupPrompt::ChooseLineup);
        state.initial_serve_team_id = None;
        assert_eq!(state.startup_prompt(), StartupPrompt::ChooseServe);
    }
}
