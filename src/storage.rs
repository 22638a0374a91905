use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::Result;

/// Key-value store holding whole JSON documents.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Result<FileStorage> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(FileStorage { dir })
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        let temp = self.dir.join(format!(".{}.json.tmp", key));

        // rename over the old file so a crash never leaves half a document
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        debug!("wrote {} bytes to {}", value.len(), path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::generate_id;

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::new();

        assert_eq!(storage.get("state").unwrap(), None);
        storage.set("state", "{}").unwrap();
        storage.set("state", "[]").unwrap();
        assert_eq!(storage.get("state").unwrap(), Some("[]".into()));
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = std::env::temp_dir().join(format!("survey-storage-{}", generate_id()));
        let mut storage = FileStorage::new(&dir).unwrap();

        assert_eq!(storage.get("state").unwrap(), None);
        storage.set("state", "{\"a\":1}").unwrap();
        assert_eq!(storage.get("state").unwrap(), Some("{\"a\":1}".into()));
        assert!(storage.path("state").exists());
        assert!(!dir.join(".state.json.tmp").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
