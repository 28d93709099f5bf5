use serde::{Deserialize, Serialize};

/// Position of a player inside a team's roster.
///
/// Roster order is the player's identity: indices stay stable for a whole
/// set, and partner links, lineups and stat events all refer to them.
pub type RosterIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_libero: bool,
    /// Re-entry partner. Symmetric: if X points at Y, Y points at X.
    #[serde(default)]
    pub sub_partner_index: Option<RosterIndex>,
}

impl Player {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            is_captain: false,
            is_libero: false,
            sub_partner_index: None,
        }
    }

    /// Template player used for a fresh roster ("Player 7", number 7).
    pub fn placeholder(number: u32) -> Self {
        Self::new(number.to_string(), format!("Player {}", number))
    }

    /// A roster row counts only once both number and name are filled in.
    pub fn is_registered(&self) -> bool {
        !self.number.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// "#4 Player 4"
    pub fn label(&self) -> String {
        format!("#{} {}", self.number, self.name)
    }
}
