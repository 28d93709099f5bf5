use std::fmt;

use thiserror::Error;

use crate::models::RosterIndex;

/// Setup step that has to happen before the requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// No team has been chosen to serve first.
    ServeNotChosen,
    /// At least one team has no confirmed starting six.
    LineupRequired,
    /// A roster has fewer than six registered players or not exactly one captain.
    RostersIncomplete,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Precondition::ServeNotChosen => {
                write!(f, "Choose which team serves first before scoring")
            }
            Precondition::LineupRequired => {
                write!(f, "Load the starting lineup of both teams to begin the set")
            }
            Precondition::RostersIncomplete => write!(
                f,
                "Load complete rosters (at least 6 players and 1 captain per team) before continuing"
            ),
        }
    }
}

/// Rule violations reported by match operations.
///
/// None of these are fatal. An operation that returns one has left the
/// [`MatchState`](crate::MatchState) exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("{0}")]
    PreconditionNotMet(Precondition),

    #[error("Invalid lineup: {0}")]
    InvalidLineup(String),

    #[error("Substitution limit reached")]
    SubstitutionLimitReached,

    #[error("Substitution not allowed: {0}")]
    SubstitutionNotLegal(String),

    #[error("Invalid roster: {0}")]
    InvalidRosterEdit(String),

    #[error("No timeouts left for {team}")]
    TimeoutLimitReached { team: String },

    #[error("Player at roster index {0} is not a designated libero")]
    NotALibero(RosterIndex),

    #[error("No player at roster index {0}")]
    UnknownPlayer(RosterIndex),

    #[error("Invalid stat entry: {0}")]
    InvalidStatEntry(String),

    #[error("Invalid match config: {0}")]
    InvalidConfig(String),

    #[error("Serve order is fixed once play has started")]
    PlayStarted,

    #[error("The match is already decided")]
    MatchComplete,
}

impl MatchError {
    /// Setup flow the caller should open instead of retrying the operation.
    pub fn redirect(&self) -> Option<Precondition> {
        match self {
            MatchError::PreconditionNotMet(p) => Some(*p),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message_is_user_facing() {
        let err = MatchError::PreconditionNotMet(Precondition::LineupRequired);
        assert!(err.to_string().contains("starting lineup"));
        assert_eq!(err.redirect(), Some(Precondition::LineupRequired));
    }

    #[test]
    fn test_rule_violations_do_not_redirect() {
        assert_eq!(MatchError::SubstitutionLimitReached.redirect(), None);
        assert_eq!(
            MatchError::NotALibero(3).to_string(),
            "Player at roster index 3 is not a designated libero"
        );
    }
}
