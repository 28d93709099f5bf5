use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RosterIndex, TeamId};

/// Outcome recorded for a point-ending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// The responsible player won the point for their own team.
    #[serde(rename = "acierto")]
    Success,
    /// The responsible player gave the point to the opponent.
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatAction {
    #[serde(rename = "saque")]
    Serve,
    #[serde(rename = "ataque")]
    Attack,
    #[serde(rename = "bloqueo")]
    Block,
    #[serde(rename = "recepcion")]
    Reception,
    #[serde(rename = "defensa")]
    Defense,
}

const SUCCESS_ACTIONS: [StatAction; 3] = [StatAction::Serve, StatAction::Attack, StatAction::Block];
const ERROR_ACTIONS: [StatAction; 4] =
    [StatAction::Serve, StatAction::Reception, StatAction::Attack, StatAction::Defense];

impl StatKind {
    /// Actions that can be attributed under this outcome, in menu order.
    pub fn actions(self) -> &'static [StatAction] {
        match self {
            StatKind::Success => &SUCCESS_ACTIONS,
            StatKind::Error => &ERROR_ACTIONS,
        }
    }

    pub fn allows(self, action: StatAction) -> bool {
        self.actions().contains(&action)
    }

    /// Wire code ("acierto" / "error").
    pub fn code(self) -> &'static str {
        match self {
            StatKind::Success => "acierto",
            StatKind::Error => "error",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Success => "Success",
            StatKind::Error => "Error",
        }
    }
}

impl StatAction {
    pub const ALL: [StatAction; 5] = [
        StatAction::Serve,
        StatAction::Attack,
        StatAction::Block,
        StatAction::Reception,
        StatAction::Defense,
    ];

    pub fn code(self) -> &'static str {
        match self {
            StatAction::Serve => "saque",
            StatAction::Attack => "ataque",
            StatAction::Block => "bloqueo",
            StatAction::Reception => "recepcion",
            StatAction::Defense => "defensa",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatAction::Serve => "Serve",
            StatAction::Attack => "Attack",
            StatAction::Block => "Block",
            StatAction::Reception => "Reception",
            StatAction::Defense => "Defense",
        }
    }

    /// Menu text shown for this action under `kind`.
    pub fn menu_label(self, kind: StatKind) -> &'static str {
        match (kind, self) {
            (StatKind::Success, StatAction::Serve) => "Ace",
            (StatKind::Success, StatAction::Attack) => "Winning attack",
            (StatKind::Success, StatAction::Block) => "Block point",
            (StatKind::Error, StatAction::Serve) => "Serve error",
            (StatKind::Error, StatAction::Reception) => "Reception error",
            (StatKind::Error, StatAction::Attack) => "Attack out / blocked",
            (StatKind::Error, StatAction::Defense) => "Defense error",
            (_, action) => action.label(),
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Display for StatAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acierto" | "success" | "kill" => Ok(StatKind::Success),
            "error" => Ok(StatKind::Error),
            other => Err(format!("unknown stat kind '{}' (expected acierto or error)", other)),
        }
    }
}

impl FromStr for StatAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saque" | "serve" => Ok(StatAction::Serve),
            "ataque" | "attack" => Ok(StatAction::Attack),
            "bloqueo" | "block" => Ok(StatAction::Block),
            "recepcion" | "recepción" | "reception" => Ok(StatAction::Reception),
            "defensa" | "defense" => Ok(StatAction::Defense),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// One attributed point. Never modified after it is appended to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEvent {
    #[serde(rename = "type")]
    pub kind: StatKind,
    pub action: StatAction,
    pub player_roster_index: RosterIndex,
    pub responsible_team_id: TeamId,
    /// Score after the point, team A first ("12-10").
    pub score_snapshot: String,
}
