//! Regular substitutions.
//!
//! Re-entry is tracked with the symmetric partner link on [`Player`]: a
//! starter replaced by X may only come back in place of X, and doing so
//! clears the link on both players.
//!
//! A substitution is picked through a [`SubstitutionDraft`], which never
//! touches the match state. Only [`MatchState::confirm_substitution`] does.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Precondition, Result};
use crate::models::{Player, RosterIndex, Team, TeamId};
use crate::state::MatchState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchCandidate {
    pub roster_index: RosterIndex,
    pub label: String,
    pub can_enter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtCandidate {
    pub roster_index: RosterIndex,
    /// Zero-based court slot.
    pub position: usize,
    pub label: String,
    pub can_exit: bool,
}

/// Substitution being assembled. Dropping it abandons the substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionDraft {
    pub team_id: TeamId,
    pub player_in: Option<RosterIndex>,
    pub player_out: Option<RosterIndex>,
}

impl SubstitutionDraft {
    /// Toggles the incoming player. Changing it drops the outgoing choice,
    /// since legality of the exit depends on who comes in.
    pub fn select_in(&mut self, index: RosterIndex) {
        self.player_in = if self.player_in == Some(index) { None } else { Some(index) };
        self.player_out = None;
    }

    pub fn select_out(&mut self, index: RosterIndex) {
        self.player_out = if self.player_out == Some(index) { None } else { Some(index) };
    }

    pub fn can_confirm(&self) -> bool {
        self.player_in.is_some() && self.player_out.is_some()
    }

    pub fn bench_candidates(&self, state: &MatchState) -> Vec<BenchCandidate> {
        let team = state.team(self.team_id);
        team.bench_players()
            .into_iter()
            .map(|index| BenchCandidate {
                roster_index: index,
                label: team.roster[index].label(),
                can_enter: team.may_enter(index),
            })
            .collect()
    }

    pub fn court_candidates(&self, state: &MatchState) -> Vec<CourtCandidate> {
        let team = state.team(self.team_id);
        team.starting_six
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| {
                let index = (*slot)?;
                let player = team.roster.get(index)?;
                Some(CourtCandidate {
                    roster_index: index,
                    position,
                    label: player.label(),
                    can_exit: team.may_exit(index, self.player_in),
                })
            })
            .collect()
    }
}

impl Team {
    /// Registered non-libero players not on court.
    pub fn bench_players(&self) -> Vec<RosterIndex> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(i, p)| p.is_registered() && !p.is_libero && !self.is_on_court(*i))
            .map(|(i, _)| i)
            .collect()
    }

    /// A bench player may enter if unpaired, or if their partner is the one on court.
    pub fn may_enter(&self, index: RosterIndex) -> bool {
        match self.roster.get(index).and_then(|p| p.sub_partner_index) {
            None => true,
            Some(partner) => self.is_on_court(partner),
        }
    }

    /// Whether `out` may leave given the selected incoming player.
    pub fn may_exit(&self, out: RosterIndex, player_in: Option<RosterIndex>) -> bool {
        let Some(player_in) = player_in else {
            return true;
        };
        let in_partner = self.roster.get(player_in).and_then(|p| p.sub_partner_index);
        match in_partner {
            Some(partner) => partner == out,
            None => self.roster.get(out).is_some_and(|p| p.sub_partner_index.is_none()),
        }
    }

    fn checked_player(&self, index: RosterIndex) -> Result<&Player> {
        self.roster.get(index).ok_or(MatchError::UnknownPlayer(index))
    }
}

impl MatchState {
    /// Starts a substitution for `team_id`.
    pub fn open_substitution(&self, team_id: TeamId) -> Result<SubstitutionDraft> {
        let team = self.team(team_id);
        if team.subs_used >= self.config.max_subs {
            return Err(MatchError::SubstitutionLimitReached);
        }
        if !team.lineup_complete() {
            return Err(MatchError::PreconditionNotMet(Precondition::LineupRequired));
        }
        Ok(SubstitutionDraft { team_id, player_in: None, player_out: None })
    }

    pub fn commit_substitution(&mut self, draft: SubstitutionDraft) -> Result<()> {
        self.confirm_substitution(draft.team_id, draft.player_in, draft.player_out)
    }

    pub fn confirm_substitution(
        &mut self,
        team_id: TeamId,
        player_in: Option<RosterIndex>,
        player_out: Option<RosterIndex>,
    ) -> Result<()> {
        let team = self.team(team_id);
        if team.subs_used >= self.config.max_subs {
            return Err(MatchError::SubstitutionLimitReached);
        }
        if !team.lineup_complete() {
            return Err(MatchError::PreconditionNotMet(Precondition::LineupRequired));
        }

        let (Some(in_index), Some(out_index)) = (player_in, player_out) else {
            return Err(MatchError::SubstitutionNotLegal(
                "select both the incoming and the outgoing player".to_string(),
            ));
        };

        let incoming = team.checked_player(in_index)?;
        let outgoing = team.checked_player(out_index)?;

        let Some(position) = team.court_position(out_index) else {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "{} is not on court",
                outgoing.label()
            )));
        };
        if team.is_on_court(in_index) {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "{} is already on court",
                incoming.label()
            )));
        }
        if !incoming.is_registered() {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "roster row {} has no number or name",
                in_index
            )));
        }
        if incoming.is_libero {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "{} is a libero; use libero activation instead",
                incoming.label()
            )));
        }
        if !team.may_enter(in_index) {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "{} can only return in place of their partner",
                incoming.label()
            )));
        }
        if !team.may_exit(out_index, Some(in_index)) {
            return Err(MatchError::SubstitutionNotLegal(format!(
                "{} cannot be replaced by {}",
                outgoing.label(),
                incoming.label()
            )));
        }

        let message = format!(
            "Substitution {}: in {}, out {}.",
            team.name,
            incoming.label(),
            outgoing.label()
        );
        let restores_pairing = incoming.sub_partner_index == Some(out_index);

        let team = self.team_mut(team_id);
        if restores_pairing {
            team.roster[in_index].sub_partner_index = None;
            team.roster[out_index].sub_partner_index = None;
        } else {
            team.roster[in_index].sub_partner_index = Some(out_index);
            team.roster[out_index].sub_partner_index = Some(in_index);
        }
        team.starting_six[position] = Some(in_index);
        team.subs_used += 1;

        self.log_event(message);
        Ok(())
    }
}
