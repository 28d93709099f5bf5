//! Libero activation. Independent of the substitution allowance.

use crate::error::{MatchError, Result};
use crate::models::{RosterIndex, Team, TeamId};
use crate::state::MatchState;

impl Team {
    pub fn is_libero_active(&self, index: RosterIndex) -> bool {
        self.active_libero_indices.contains(&index)
    }

    /// Players that can be credited with a point-ending action: the six on
    /// court (position order) followed by active liberos not already listed.
    pub fn taggable_players(&self) -> Vec<RosterIndex> {
        let mut taggable: Vec<RosterIndex> =
            self.court_indices().map(Vec::from).unwrap_or_default();
        for &index in &self.active_libero_indices {
            if self.roster.get(index).is_some() && !taggable.contains(&index) {
                taggable.push(index);
            }
        }
        taggable
    }
}

impl MatchState {
    /// Flips a designated libero between active and inactive. Returns the new state.
    pub fn toggle_libero_active(&mut self, team_id: TeamId, index: RosterIndex) -> Result<bool> {
        let team = self.team(team_id);
        let player = team.roster.get(index).ok_or(MatchError::UnknownPlayer(index))?;
        if !player.is_libero {
            return Err(MatchError::NotALibero(index));
        }

        let team = self.team_mut(team_id);
        let active = if team.active_libero_indices.remove(&index) {
            false
        } else {
            team.active_libero_indices.insert(index);
            true
        };

        log::debug!("Libero {} of team {} active: {}", index, team_id, active);
        Ok(active)
    }

    pub fn taggable_players(&self, team_id: TeamId) -> Vec<RosterIndex> {
        self.team(team_id).taggable_players()
    }
}
