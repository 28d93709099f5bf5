//! # volley_core - Volleyball Match Scorekeeping Engine
//!
//! This library tracks a live indoor volleyball match between two teams:
//! rally-point scoring with win-by-2, set transitions, serve rotation,
//! substitutions with re-entry pairing, libero activation and a per-point
//! statistics ledger.
//!
//! ## Features
//! - One explicit [`MatchState`] value, mutated only through validated operations
//! - Guided multi-step flows ([`StatEntry`], [`SubstitutionDraft`]) that only touch
//!   the state on commit
//! - JSON persistence with legacy-shape migration
//! - Paginated plain-text match summary export
//! - JSON command API for front ends

pub mod api;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod save;
pub mod state;

pub use api::{handle_command_json, Command, CommandResponse, Effect, MatchSession, Reply};
pub use engine::{
    BenchCandidate, CourtCandidate, PendingStat, PointOutcome, ScoreChange, SetFilter,
    SetResult, StatEntry, SubstitutionDraft,
};
pub use error::{MatchError, Precondition, Result};
pub use export::{ExportDocument, MatchSummary, PageLayout};
pub use models::{
    MatchConfig, Player, RosterIndex, Staff, StaffMember, StatAction, StatEvent, StatKind, Team,
    TeamId,
};
pub use save::{FileStore, KeyValueStore, MemoryStore, SaveError, SaveManager, STATE_KEY};
pub use state::{MatchPhase, MatchState, SetScore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
