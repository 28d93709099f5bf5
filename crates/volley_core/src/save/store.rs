use super::error::SaveError;

use std::collections::HashMap;
use std::fs::{remove_file, rename, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Byte storage addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError>;
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, SaveError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(data) => {
                log::debug!("Loaded {} bytes from {:?}", data.len(), path);
                Ok(Some(data))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &path)?;

        log::debug!("Saved {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        match remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted {:?}", path);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), SaveError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Keys double as file names: ASCII letters, digits, `_` and `-` only.
fn validate_key(key: &str) -> Result<(), SaveError> {
    let valid = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(SaveError::InvalidKey { key: key.to_string() });
    }
    Ok(())
}
