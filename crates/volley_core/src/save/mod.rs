// Match persistence
// JSON envelope with versioning, optional SHA-256 checksum and legacy migration

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;
pub mod store;

pub use error::SaveError;
pub use format::{decode_document, encode_document, SaveDocument};
pub use manager::{SaveInfo, SaveManager};
pub use migration::migrate_document;
pub use store::{FileStore, KeyValueStore, MemoryStore};

pub const SAVE_VERSION: u32 = 1;

/// Key the running match is stored under.
pub const STATE_KEY: &str = "volley_match_state";
