use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupted data: {0}")]
    Corrupted(String),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Invalid store key: {key}")]
    InvalidKey { key: String },
}

impl SaveError {
    /// Whether retrying the same operation may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::Json(_) => false,
            SaveError::Corrupted(_) => false,
            SaveError::ChecksumMismatch => false,
            SaveError::VersionMismatch { .. } => false,
            SaveError::InvalidKey { .. } => false,
        }
    }
}
