//! Match rules engine.
//!
//! Each submodule adds one group of validated operations to
//! [`MatchState`](crate::MatchState). Every operation checks its rules first
//! and only then mutates, so an `Err` always means "nothing changed".

pub mod libero;
pub mod lineup;
pub mod roster;
pub mod scoring;
pub mod stats;
pub mod substitution;

pub use lineup::parse_lineup_slots;
pub use roster::{check_partner_links, validate_roster, PartnerLinkViolation};
pub use scoring::{PointOutcome, ScoreChange, SetResult, StartupPrompt};
pub use stats::{ActionCounts, PendingStat, PlayerTally, SetFilter, StatEntry};
pub use substitution::{BenchCandidate, CourtCandidate, SubstitutionDraft};
