//! Starting six and rotation.
//!
//! Slot 0 holds the server. A rotation moves the player in slot 0 to slot 5
//! and shifts everyone else forward by one.

use std::collections::HashSet;

use crate::error::{MatchError, Result};
use crate::models::{Lineup, Player, RosterIndex, Team, TeamId, LINEUP_SIZE};
use crate::state::MatchState;

/// Converts wire slots (`-1` = unset) into roster indices.
pub fn parse_lineup_slots(slots: &[i64]) -> Result<Vec<RosterIndex>> {
    slots
        .iter()
        .enumerate()
        .map(|(position, &slot)| {
            usize::try_from(slot).map_err(|_| {
                MatchError::InvalidLineup(format!("position {} has no player", position + 1))
            })
        })
        .collect()
}

impl Team {
    pub fn lineup_complete(&self) -> bool {
        self.starting_six.iter().all(Option::is_some)
    }

    /// Roster indices in position order, or `None` before the lineup is confirmed.
    pub fn court_indices(&self) -> Option<[RosterIndex; LINEUP_SIZE]> {
        let mut indices = [0; LINEUP_SIZE];
        for (out, slot) in indices.iter_mut().zip(self.starting_six) {
            *out = slot?;
        }
        Some(indices)
    }

    /// The six players in position order. Empty means "no lineup yet".
    pub fn players_on_court(&self) -> Vec<&Player> {
        match self.court_indices() {
            Some(indices) => indices.iter().filter_map(|&i| self.roster.get(i)).collect(),
            None => Vec::new(),
        }
    }

    pub fn is_on_court(&self, index: RosterIndex) -> bool {
        self.starting_six.contains(&Some(index))
    }

    pub fn court_position(&self, index: RosterIndex) -> Option<usize> {
        self.starting_six.iter().position(|&slot| slot == Some(index))
    }

    /// Queue rotation; ignored while the lineup is incomplete.
    pub(crate) fn rotate(&mut self) -> bool {
        if !self.lineup_complete() {
            return false;
        }
        self.starting_six.rotate_left(1);
        true
    }

    pub fn validate_lineup(&self, six: &[RosterIndex]) -> Result<Lineup> {
        if six.len() != LINEUP_SIZE {
            return Err(MatchError::InvalidLineup(format!(
                "expected {} players, got {}",
                LINEUP_SIZE,
                six.len()
            )));
        }

        let mut seen = HashSet::with_capacity(LINEUP_SIZE);
        let mut lineup = [None; LINEUP_SIZE];
        for (slot, &index) in lineup.iter_mut().zip(six) {
            let player = self.roster.get(index).ok_or_else(|| {
                MatchError::InvalidLineup(format!("no player at roster index {}", index))
            })?;
            if !player.is_registered() {
                return Err(MatchError::InvalidLineup(format!(
                    "roster row {} has no number or name",
                    index
                )));
            }
            if player.is_libero {
                return Err(MatchError::InvalidLineup(format!(
                    "{} is a libero and cannot start on court",
                    player.label()
                )));
            }
            if !seen.insert(index) {
                return Err(MatchError::InvalidLineup(format!(
                    "{} appears more than once",
                    player.label()
                )));
            }
            *slot = Some(index);
        }
        Ok(lineup)
    }
}

impl MatchState {
    /// Both rosters must still be complete.
    pub fn confirm_lineup(&mut self, team_id: TeamId, six: &[RosterIndex]) -> Result<()> {
        self.require_rosters()?;
        let lineup = self.team(team_id).validate_lineup(six)?;
        self.team_mut(team_id).starting_six = lineup;
        log::debug!("Lineup confirmed for team {}: {:?}", team_id, six);
        Ok(())
    }

    /// Confirms both lineups together; neither is applied unless both are valid.
    pub fn confirm_lineups(&mut self, six_a: &[RosterIndex], six_b: &[RosterIndex]) -> Result<()> {
        self.require_rosters()?;
        let lineup_a = self.team_a.validate_lineup(six_a)?;
        let lineup_b = self.team_b.validate_lineup(six_b)?;
        self.team_a.starting_six = lineup_a;
        self.team_b.starting_six = lineup_b;
        Ok(())
    }

    pub fn players_on_court(&self, team_id: TeamId) -> Vec<&Player> {
        self.team(team_id).players_on_court()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Precondition;
    use crate::models::Staff;

    fn captained() -> MatchState {
        let mut state = MatchState::new();
        state.team_a.roster[0].is_captain = true;
        state.team_b.roster[0].is_captain = true;
        state
    }

    #[test]
    fn test_rotation_moves_server_to_back() {
        let mut state = captained();
        state.confirm_lineup(TeamId::A, &[0, 1, 2, 3, 4, 5]).unwrap();
        assert!(state.team_a.rotate());

        let numbers: Vec<&str> =
            state.players_on_court(TeamId::A).iter().map(|p| p.number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "3", "4", "5", "6", "1"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut state = captained();
        let result = state.confirm_lineup(TeamId::A, &[0, 1, 2, 3, 4, 4]);
        assert!(matches!(result, Err(MatchError::InvalidLineup(_))));
        assert!(!state.team_a.lineup_complete());
    }

    #[test]
    fn test_wrong_size_and_unknown_index_rejected() {
        let mut state = captained();
        assert!(state.confirm_lineup(TeamId::B, &[0, 1, 2, 3, 4]).is_err());
        assert!(state.confirm_lineup(TeamId::B, &[0, 1, 2, 3, 4, 99]).is_err());
    }

    #[test]
    fn test_sentinel_slot_rejected() {
        assert!(matches!(
            parse_lineup_slots(&[0, 1, -1, 3, 4, 5]),
            Err(MatchError::InvalidLineup(_))
        ));
        assert_eq!(parse_lineup_slots(&[5, 4, 3, 2, 1, 0]).unwrap(), vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_both_lineups_validated_before_either_applies() {
        let mut state = captained();
        let result = state.confirm_lineups(&[0, 1, 2, 3, 4, 5], &[0, 0, 1, 2, 3, 4]);
        assert!(result.is_err());
        assert!(!state.team_a.lineup_complete());
    }

    #[test]
    fn test_blank_roster_row_cannot_start() {
        let mut state = captained();
        state.team_a.roster[8] = Player::new("", "");
        let result = state.confirm_lineup(TeamId::A, &[0, 1, 2, 3, 4, 8]);
        assert!(matches!(result, Err(MatchError::InvalidLineup(_))));
        assert!(!state.team_a.lineup_complete());
    }

    #[test]
    fn test_captainless_roster_blocks_lineup() {
        let mut state = captained();
        state.choose_initial_serve(TeamId::A).unwrap();
        let without_captain = MatchState::new().team_b.roster;
        state.update_roster(TeamId::B, without_captain, Staff::default()).unwrap();

        let result = state.confirm_lineups(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 3, 4, 5]);
        assert_eq!(result, Err(MatchError::PreconditionNotMet(Precondition::RostersIncomplete)));
        assert!(!state.team_a.lineup_complete());
    }

    #[test]
    fn test_no_lineup_means_empty_court() {
        let mut state = captained();
        assert!(state.players_on_court(TeamId::A).is_empty());
        assert!(!state.team_a.rotate());
    }
}
