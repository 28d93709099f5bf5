use super::error::SaveError;
use super::format::{decode_document, encode_document, SaveDocument};
use super::store::KeyValueStore;
use super::STATE_KEY;
use crate::state::MatchState;

/// Reads and writes the running match through a [`KeyValueStore`].
pub struct SaveManager<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SaveManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Write the match under [`STATE_KEY`], replacing any previous save.
    pub fn save(&mut self, state: &MatchState) -> Result<(), SaveError> {
        let data = encode_document(state)?;
        self.store.put(STATE_KEY, &data)?;
        log::debug!("Match saved ({} bytes)", data.len());
        Ok(())
    }

    /// Stored match, migrated to the current format. `None` when nothing is saved.
    pub fn load(&self) -> Result<Option<MatchState>, SaveError> {
        Ok(self.load_document()?.map(|document| document.state))
    }

    pub fn load_document(&self) -> Result<Option<SaveDocument>, SaveError> {
        let Some(data) = self.store.get(STATE_KEY)? else {
            return Ok(None);
        };
        let document = decode_document(&data)?;
        log::info!("Match loaded (format version {})", document.version);
        Ok(Some(document))
    }

    pub fn clear(&mut self) -> Result<(), SaveError> {
        self.store.remove(STATE_KEY)?;
        log::info!("Saved match cleared");
        Ok(())
    }

    /// Save metadata for display.
    pub fn info(&self) -> Result<Option<SaveInfo>, SaveError> {
        Ok(self.load_document()?.map(|document| SaveInfo::from_document(&document)))
    }
}

#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub timestamp: u64,
    pub version: u32,
    pub team_a: String,
    pub team_b: String,
    pub sets_a: u32,
    pub sets_b: u32,
    pub complete: bool,
}

impl SaveInfo {
    fn from_document(document: &SaveDocument) -> Self {
        let state = &document.state;
        Self {
            timestamp: document.timestamp,
            version: document.version,
            team_a: state.team_a.name.clone(),
            team_b: state.team_b.name.clone(),
            sets_a: state.team_a.sets,
            sets_b: state.team_b.sets,
            complete: state.is_complete(),
        }
    }

    pub fn format_timestamp(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};

        let timestamp =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.timestamp) * 1_000_000)
                .unwrap_or_else(|_| OffsetDateTime::now_utc());

        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn get_display_text(&self) -> String {
        let status = if self.complete { "final" } else { "in progress" };
        format!(
            "{} {} - {} {} ({})",
            self.team_a, self.sets_a, self.sets_b, self.team_b, status
        )
    }
}
