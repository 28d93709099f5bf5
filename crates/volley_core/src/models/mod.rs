pub mod config;
pub mod player;
pub mod stat;
pub mod team;

pub use config::MatchConfig;
pub use player::{Player, RosterIndex};
pub use stat::{StatAction, StatEvent, StatKind};
pub use team::{Lineup, Staff, StaffMember, Team, TeamId, LINEUP_SIZE};
