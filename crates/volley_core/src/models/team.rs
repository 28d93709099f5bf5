use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Player, RosterIndex, StatEvent};

/// Number of on-court positions per team.
pub const LINEUP_SIZE: usize = 6;

/// On-court slots in rotation order; slot 0 is the server. `None` is an
/// unset slot and is written as `-1` on the wire.
pub type Lineup = [Option<RosterIndex>; LINEUP_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamId {
    A,
    B,
}

impl TeamId {
    pub fn other(self) -> TeamId {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeamId::A => f.write_str("A"),
            TeamId::B => f.write_str("B"),
        }
    }
}

impl FromStr for TeamId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(TeamId::A),
            "B" | "b" => Ok(TeamId::B),
            other => Err(format!("unknown team '{}' (expected A or B)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub coach: StaffMember,
    #[serde(default)]
    pub assistant: StaffMember,
    #[serde(default)]
    pub auxiliary: StaffMember,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub serving: bool,
    #[serde(default)]
    pub timeouts: u32,
    #[serde(default)]
    pub subs_used: u32,
    pub roster: Vec<Player>,
    #[serde(with = "lineup_slots", default = "empty_lineup")]
    pub starting_six: Lineup,
    #[serde(default)]
    pub active_libero_indices: BTreeSet<RosterIndex>,
    /// Attributed points, one inner list per set index.
    #[serde(default)]
    pub stats_by_set: Vec<Vec<StatEvent>>,
    #[serde(default)]
    pub staff: Staff,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, roster: Vec<Player>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            sets: 0,
            serving: false,
            timeouts: 0,
            subs_used: 0,
            roster,
            starting_six: empty_lineup(),
            active_libero_indices: BTreeSet::new(),
            stats_by_set: Vec::new(),
            staff: Staff::default(),
        }
    }

    pub fn player(&self, index: RosterIndex) -> Option<&Player> {
        self.roster.get(index)
    }

    /// Ledger of one set; empty when nothing was recorded for it.
    pub fn stats_for_set(&self, set_index: usize) -> &[StatEvent] {
        self.stats_by_set.get(set_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn stats_for_set_mut(&mut self, set_index: usize) -> &mut Vec<StatEvent> {
        if self.stats_by_set.len() <= set_index {
            self.stats_by_set.resize_with(set_index + 1, Vec::new);
        }
        &mut self.stats_by_set[set_index]
    }
}

pub fn empty_lineup() -> Lineup {
    [None; LINEUP_SIZE]
}

/// `-1` sentinel encoding for lineup slots. Anything that is not six
/// entries decodes as an unset lineup.
mod lineup_slots {
    use super::{Lineup, LINEUP_SIZE};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub const EMPTY_SLOT: i64 = -1;

    pub fn serialize<S: Serializer>(lineup: &Lineup, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: Vec<i64> =
            lineup.iter().map(|slot| slot.map_or(EMPTY_SLOT, |index| index as i64)).collect();
        raw.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Lineup, D::Error> {
        let raw = Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default();
        let mut lineup = [None; LINEUP_SIZE];
        if raw.len() == LINEUP_SIZE {
            for (slot, value) in lineup.iter_mut().zip(raw) {
                *slot = usize::try_from(value).ok();
            }
        }
        Ok(lineup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team() -> Team {
        Team::new(TeamId::A, "Home", (1..=8).map(Player::placeholder).collect())
    }

    #[test]
    fn test_lineup_sentinel_encoding() {
        let mut t = team();
        t.starting_six = [Some(0), Some(1), Some(2), None, Some(4), Some(5)];
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["startingSix"], serde_json::json!([0, 1, 2, -1, 4, 5]));

        let back: Team = serde_json::from_value(json).unwrap();
        assert_eq!(back.starting_six, t.starting_six);
    }

    #[test]
    fn test_short_lineup_decodes_as_unset() {
        let mut json = serde_json::to_value(team()).unwrap();
        json["startingSix"] = serde_json::json!([0, 1, 2]);
        let back: Team = serde_json::from_value(json).unwrap();
        assert_eq!(back.starting_six, empty_lineup());
    }

    #[test]
    fn test_stats_slot_grows_on_demand() {
        let mut t = team();
        assert!(t.stats_for_set(3).is_empty());
        t.stats_for_set_mut(2);
        assert_eq!(t.stats_by_set.len(), 3);
    }

    #[test]
    fn test_team_id_other() {
        assert_eq!(TeamId::A.other(), TeamId::B);
        assert_eq!("b".parse::<TeamId>(), Ok(TeamId::B));
    }
}
