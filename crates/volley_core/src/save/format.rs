use super::error::SaveError;
use super::migration::{document_version, migrate_document};
use super::SAVE_VERSION;
use crate::state::MatchState;
use serde::{Deserialize, Serialize};

use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Stored form of a match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SaveDocument {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    #[serde(default)]
    pub timestamp: u64,

    /// SHA-256 hex digest of the serialized state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    pub state: MatchState,
}

impl SaveDocument {
    pub fn new(state: MatchState) -> Result<Self, SaveError> {
        let checksum = state_checksum(&state)?;
        Ok(Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            checksum: Some(checksum),
            state,
        })
    }

    pub fn verify_checksum(&self) -> Result<(), SaveError> {
        match &self.checksum {
            Some(expected) if *expected != state_checksum(&self.state)? => {
                Err(SaveError::ChecksumMismatch)
            }
            _ => Ok(()),
        }
    }
}

pub fn state_checksum(state: &MatchState) -> Result<String, SaveError> {
    let bytes = serde_json::to_vec(state)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Serialize a match into a stored document.
pub fn encode_document(state: &MatchState) -> Result<Vec<u8>, SaveError> {
    let document = SaveDocument::new(state.clone())?;
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Parse, migrate and verify a stored document.
pub fn decode_document(bytes: &[u8]) -> Result<SaveDocument, SaveError> {
    let raw: serde_json::Value = serde_json::from_slice(bytes)?;
    let found = document_version(&raw)?;

    let migrated = migrate_document(raw)?;
    let document: SaveDocument = match serde_json::from_value(migrated) {
        Ok(document) => document,
        Err(_) if found > SAVE_VERSION => {
            return Err(SaveError::VersionMismatch { found, expected: SAVE_VERSION });
        }
        Err(err) => return Err(SaveError::Json(err)),
    };

    // Older documents were rewritten by migration and newer ones may
    // serialize differently, so only current documents carry a usable digest.
    if found == SAVE_VERSION {
        document.verify_checksum()?;
    }

    document.state.config.validate().map_err(|e| SaveError::Corrupted(e.to_string()))?;
    Ok(document)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamId;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut state = MatchState::new();
        state.team_a.name = "Leones".to_string();
        state.team_b.score = 7;
        state.initial_serve_team_id = Some(TeamId::B);

        let bytes = encode_document(&state).unwrap();
        let document = decode_document(&bytes).unwrap();

        assert_eq!(document.version, SAVE_VERSION);
        assert!(document.checksum.is_some());
        assert_eq!(document.state, state);
    }

    #[test]
    fn test_tampered_state_fails_checksum() {
        let bytes = encode_document(&MatchState::new()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["state"]["teamA"]["score"] = serde_json::json!(12);

        let tampered = serde_json::to_vec(&value).unwrap();
        assert!(matches!(decode_document(&tampered), Err(SaveError::ChecksumMismatch)));
    }

    #[test]
    fn test_missing_checksum_is_accepted() {
        let bytes = encode_document(&MatchState::new()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value.as_object_mut().unwrap().remove("checksum");

        let document = decode_document(&serde_json::to_vec(&value).unwrap()).unwrap();
        assert_eq!(document.state, MatchState::new());
    }

    #[test]
    fn test_unreadable_future_document_is_version_mismatch() {
        let doc = serde_json::json!({ "version": 7, "timestamp": 0, "state": { "teams": [] } });
        let result = decode_document(&serde_json::to_vec(&doc).unwrap());
        assert!(matches!(result, Err(SaveError::VersionMismatch { found: 7, expected: 1 })));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(decode_document(b"not json"), Err(SaveError::Json(_))));
    }
}
