//! Match Summary Export
//!
//! Turns a match into a summary (winner, set results oriented from the
//! winner, event log) and a paginated plain-text document.

pub mod document;
pub mod summary;

pub use document::{wrap_line, ExportDocument, PageLayout};
pub use summary::{MatchSummary, SetLine};
