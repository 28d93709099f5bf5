//! Roster editing and roster-level invariants.

use crate::error::{MatchError, Precondition, Result};
use crate::models::{Player, RosterIndex, Staff, Team, TeamId};
use crate::state::MatchState;

pub const MAX_CAPTAINS: usize = 1;
pub const MAX_LIBEROS: usize = 2;
/// Registered players a roster needs before a set can be set up.
pub const MIN_REGISTERED_PLAYERS: usize = 6;

/// Broken symmetric partner link: `player` points at `partner`, but
/// `partner` does not point back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerLinkViolation {
    pub player: RosterIndex,
    pub partner: RosterIndex,
}

/// Captain/libero limits for a roster about to replace the current one.
pub fn validate_roster(players: &[Player]) -> Result<()> {
    let captains = players.iter().filter(|p| p.is_captain).count();
    if captains > MAX_CAPTAINS {
        return Err(MatchError::InvalidRosterEdit("only one captain is allowed".to_string()));
    }

    let liberos = players.iter().filter(|p| p.is_libero).count();
    if liberos > MAX_LIBEROS {
        return Err(MatchError::InvalidRosterEdit("at most two liberos are allowed".to_string()));
    }

    Ok(())
}

/// Checks `A.partner == B ⇔ B.partner == A` over the whole roster.
pub fn check_partner_links(roster: &[Player]) -> std::result::Result<(), PartnerLinkViolation> {
    for (index, player) in roster.iter().enumerate() {
        if let Some(partner) = player.sub_partner_index {
            let back = roster.get(partner).and_then(|p| p.sub_partner_index);
            if partner == index || back != Some(index) {
                return Err(PartnerLinkViolation { player: index, partner });
            }
        }
    }
    Ok(())
}

impl Team {
    pub fn captain_count(&self) -> usize {
        self.roster.iter().filter(|p| p.is_captain).count()
    }

    /// At least six registered players and exactly one captain.
    pub fn is_roster_complete(&self) -> bool {
        let registered = self.roster.iter().filter(|p| p.is_registered()).count();
        registered >= MIN_REGISTERED_PLAYERS && self.captain_count() == MAX_CAPTAINS
    }

    /// Registered players flagged as libero.
    pub fn designated_liberos(&self) -> Vec<RosterIndex> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_libero && p.is_registered())
            .map(|(i, _)| i)
            .collect()
    }

    /// Players that may be placed in the starting six.
    pub fn lineup_candidates(&self) -> Vec<RosterIndex> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_registered() && !p.is_libero)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn clear_partner_links(&mut self) {
        for player in &mut self.roster {
            player.sub_partner_index = None;
        }
    }
}

impl MatchState {
    pub fn rosters_complete(&self) -> bool {
        self.team_a.is_roster_complete() && self.team_b.is_roster_complete()
    }

    pub(crate) fn require_rosters(&self) -> Result<()> {
        if self.rosters_complete() {
            Ok(())
        } else {
            Err(MatchError::PreconditionNotMet(Precondition::RostersIncomplete))
        }
    }

    /// Replaces a team's roster and staff.
    ///
    /// Identity is positional, so this is only allowed between sets (while the
    /// team has no confirmed lineup).
    pub fn update_roster(
        &mut self,
        team_id: TeamId,
        players: Vec<Player>,
        staff: Staff,
    ) -> Result<()> {
        validate_roster(&players)?;

        let team = self.team(team_id);
        if team.lineup_complete() {
            return Err(MatchError::InvalidRosterEdit(
                "the roster can only be edited between sets".to_string(),
            ));
        }

        let team = self.team_mut(team_id);
        team.roster = players;
        team.clear_partner_links();
        team.active_libero_indices.clear();
        team.staff = staff;

        log::info!("Roster updated for team {} ({} players)", team_id, team.roster.len());
        Ok(())
    }

    pub fn set_team_name(&mut self, team_id: TeamId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MatchError::InvalidRosterEdit("team name cannot be empty".to_string()));
        }
        self.team_mut(team_id).name = name;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(captains: usize, liberos: usize) -> Vec<Player> {
        (1..=12)
            .map(|n| {
                let mut p = Player::placeholder(n);
                p.is_captain = (n as usize) <= captains;
                p.is_libero = (n as usize) > 12 - liberos;
                p
            })
            .collect()
    }

    #[test]
    fn test_roster_limits() {
        assert!(validate_roster(&roster_with(1, 2)).is_ok());
        assert!(matches!(
            validate_roster(&roster_with(2, 0)),
            Err(MatchError::InvalidRosterEdit(_))
        ));
        assert!(matches!(
            validate_roster(&roster_with(1, 3)),
            Err(MatchError::InvalidRosterEdit(_))
        ));
    }

    #[test]
    fn test_rejected_roster_leaves_state_untouched() {
        let mut state = MatchState::new();
        let before = state.clone();
        let result = state.update_roster(TeamId::A, roster_with(2, 0), Staff::default());
        assert!(result.is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_roster_completeness_needs_one_captain() {
        let mut state = MatchState::new();
        assert!(!state.rosters_complete());

        state.update_roster(TeamId::A, roster_with(1, 0), Staff::default()).unwrap();
        state.update_roster(TeamId::B, roster_with(1, 1), Staff::default()).unwrap();
        assert!(state.rosters_complete());
        assert_eq!(state.team_b.designated_liberos(), vec![11]);
        assert!(!state.team_b.lineup_candidates().contains(&11));
    }

    #[test]
    fn test_roster_locked_while_lineup_confirmed() {
        let mut state = MatchState::new();
        state.team_a.starting_six = [Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)];
        let result = state.update_roster(TeamId::A, roster_with(1, 0), Staff::default());
        assert!(matches!(result, Err(MatchError::InvalidRosterEdit(_))));
    }

    #[test]
    fn test_partner_link_checker() {
        let mut roster = roster_with(1, 0);
        assert!(check_partner_links(&roster).is_ok());

        roster[0].sub_partner_index = Some(6);
        assert_eq!(
            check_partner_links(&roster),
            Err(PartnerLinkViolation { player: 0, partner: 6 })
        );

        roster[6].sub_partner_index = Some(0);
        assert!(check_partner_links(&roster).is_ok());
    }
}
