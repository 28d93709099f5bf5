//! Statistics ledger.
//!
//! Every point is attributed through a three-step [`StatEntry`]: outcome,
//! action, responsible player. The finished entry is a [`PendingStat`];
//! committing it appends one [`StatEvent`] to the responsible team's ledger
//! for the current set and then scores the point for the scoring team. An
//! error by one team scores for the other.

use serde::{Deserialize, Serialize};

use super::scoring::PointOutcome;
use crate::error::{MatchError, Result};
use crate::models::{RosterIndex, StatAction, StatEvent, StatKind, TeamId};
use crate::state::MatchState;

/// Point attribution in progress. Dropping it abandons the point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StatEntry {
    #[serde(rename_all = "camelCase")]
    ChooseKind { scoring_team: TeamId },
    #[serde(rename_all = "camelCase")]
    ChooseAction { scoring_team: TeamId, kind: StatKind },
    #[serde(rename_all = "camelCase")]
    ChoosePlayer { scoring_team: TeamId, kind: StatKind, action: StatAction },
}

/// Fully specified point, ready for [`MatchState::commit_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStat {
    pub scoring_team: TeamId,
    pub kind: StatKind,
    pub action: StatAction,
    pub player: RosterIndex,
}

impl PendingStat {
    pub fn responsible_team(&self) -> TeamId {
        responsible_team(self.scoring_team, self.kind)
    }
}

fn responsible_team(scoring_team: TeamId, kind: StatKind) -> TeamId {
    match kind {
        StatKind::Success => scoring_team,
        StatKind::Error => scoring_team.other(),
    }
}

impl StatEntry {
    pub fn new(scoring_team: TeamId) -> Self {
        StatEntry::ChooseKind { scoring_team }
    }

    pub fn scoring_team(&self) -> TeamId {
        match *self {
            StatEntry::ChooseKind { scoring_team }
            | StatEntry::ChooseAction { scoring_team, .. }
            | StatEntry::ChoosePlayer { scoring_team, .. } => scoring_team,
        }
    }

    /// Team whose player is credited, known once the outcome is chosen.
    pub fn responsible_team(&self) -> Option<TeamId> {
        match *self {
            StatEntry::ChooseKind { .. } => None,
            StatEntry::ChooseAction { scoring_team, kind }
            | StatEntry::ChoosePlayer { scoring_team, kind, .. } => {
                Some(responsible_team(scoring_team, kind))
            }
        }
    }

    pub fn choose_kind(self, kind: StatKind) -> Result<Self> {
        match self {
            StatEntry::ChooseKind { scoring_team } => {
                Ok(StatEntry::ChooseAction { scoring_team, kind })
            }
            _ => Err(MatchError::InvalidStatEntry("the outcome is already chosen".to_string())),
        }
    }

    pub fn choose_action(self, action: StatAction) -> Result<Self> {
        match self {
            StatEntry::ChooseAction { scoring_team, kind } if kind.allows(action) => {
                Ok(StatEntry::ChoosePlayer { scoring_team, kind, action })
            }
            StatEntry::ChooseAction { kind, .. } => Err(MatchError::InvalidStatEntry(format!(
                "{} is not a {} action",
                action.label(),
                kind.code()
            ))),
            _ => Err(MatchError::InvalidStatEntry("choose the outcome first".to_string())),
        }
    }

    /// Players that may be credited at the player step.
    pub fn candidates(&self, state: &MatchState) -> Vec<RosterIndex> {
        match self {
            StatEntry::ChoosePlayer { .. } => self
                .responsible_team()
                .map(|team| state.taggable_players(team))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn choose_player(self, player: RosterIndex) -> Result<PendingStat> {
        match self {
            StatEntry::ChoosePlayer { scoring_team, kind, action } => {
                Ok(PendingStat { scoring_team, kind, action, player })
            }
            _ => Err(MatchError::InvalidStatEntry("choose the action first".to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub serve: u32,
    pub attack: u32,
    pub block: u32,
    pub reception: u32,
    pub defense: u32,
}

impl ActionCounts {
    pub fn get(&self, action: StatAction) -> u32 {
        match action {
            StatAction::Serve => self.serve,
            StatAction::Attack => self.attack,
            StatAction::Block => self.block,
            StatAction::Reception => self.reception,
            StatAction::Defense => self.defense,
        }
    }

    fn bump(&mut self, action: StatAction) {
        let slot = match action {
            StatAction::Serve => &mut self.serve,
            StatAction::Attack => &mut self.attack,
            StatAction::Block => &mut self.block,
            StatAction::Reception => &mut self.reception,
            StatAction::Defense => &mut self.defense,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        StatAction::ALL.iter().map(|&a| self.get(a)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTally {
    pub roster_index: RosterIndex,
    pub number: String,
    pub name: String,
    pub successes: ActionCounts,
    pub errors: ActionCounts,
}

impl PlayerTally {
    pub fn total(&self) -> u32 {
        self.successes.total() + self.errors.total()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetFilter {
    Set(usize),
    All,
}

impl MatchState {
    /// Records an attributed point and scores it.
    pub fn commit_stat(&mut self, pending: PendingStat) -> Result<PointOutcome> {
        self.require_play_ready()?;
        if !pending.kind.allows(pending.action) {
            return Err(MatchError::InvalidStatEntry(format!(
                "{} is not a {} action",
                pending.action.label(),
                pending.kind.code()
            )));
        }

        let responsible = pending.responsible_team();
        if !self.taggable_players(responsible).contains(&pending.player) {
            return Err(MatchError::InvalidStatEntry(format!(
                "roster index {} of team {} is not on court",
                pending.player, responsible
            )));
        }
        let player = self
            .team(responsible)
            .player(pending.player)
            .ok_or(MatchError::UnknownPlayer(pending.player))?
            .label();

        let (a_bonus, b_bonus) = match pending.scoring_team {
            TeamId::A => (1, 0),
            TeamId::B => (0, 1),
        };
        let score_snapshot =
            format!("{}-{}", self.team_a.score + a_bonus, self.team_b.score + b_bonus);

        let event = StatEvent {
            kind: pending.kind,
            action: pending.action,
            player_roster_index: pending.player,
            responsible_team_id: responsible,
            score_snapshot: score_snapshot.clone(),
        };
        let set_index = self.current_set_index();
        self.team_mut(responsible).stats_for_set_mut(set_index).push(event);

        let message = format!(
            "Point {} ({}). {} {} by {}.",
            self.team(pending.scoring_team).name,
            score_snapshot,
            pending.action.label(),
            pending.kind.label().to_lowercase(),
            player
        );
        self.log_event(message);

        Ok(self.commit_point(pending.scoring_team))
    }

    /// Per-player counts for one team, in roster order. Players without any
    /// recorded action are left out.
    pub fn tally(&self, team_id: TeamId, filter: SetFilter) -> Vec<PlayerTally> {
        let team = self.team(team_id);
        let mut tallies: Vec<PlayerTally> = team
            .roster
            .iter()
            .enumerate()
            .map(|(roster_index, p)| PlayerTally {
                roster_index,
                number: p.number.clone(),
                name: p.name.clone(),
                successes: ActionCounts::default(),
                errors: ActionCounts::default(),
            })
            .collect();

        let ledgers = [&self.team_a, &self.team_b];
        let events = ledgers.iter().flat_map(|t| match filter {
            SetFilter::Set(index) => t.stats_for_set(index).iter().collect::<Vec<_>>(),
            SetFilter::All => t.stats_by_set.iter().flatten().collect(),
        });

        for event in events.filter(|e| e.responsible_team_id == team_id) {
            if let Some(tally) = tallies.get_mut(event.player_roster_index) {
                match event.kind {
                    StatKind::Success => tally.successes.bump(event.action),
                    StatKind::Error => tally.errors.bump(event.action),
                }
            }
        }

        tallies.retain(|t| t.total() > 0);
        tallies
    }

    /// Finished sets plus the current one when it already has events.
    pub fn sets_with_stats(&self) -> Vec<usize> {
        let current = self.set_scores.len();
        (0..=current)
            .filter(|&i| {
                i < current
                    || !self.team_a.stats_for_set(i).is_empty()
                    || !self.team_b.stats_for_set(i).is_empty()
            })
            .collect()
    }
}
