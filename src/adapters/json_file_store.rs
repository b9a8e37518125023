//! JSON file key/value store adapter.
//!
//! The whole store is one JSON object of string values. Every `set` reads
//! the file, updates one key and writes it back.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::StratError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::KeyValueStore;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const DEFAULT_PATH: &'static str = "stratbuilder.json";

    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let path = config
            .get_string("store", "path")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StratError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StratError::Store {
            reason: format!("{}: {}", self.path.display(), e),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StratError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StratError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("buy").unwrap(), None);
    }

    #[test]
    fn set_creates_file_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store.set("buy_exp", "SMA14above").unwrap();
        store.set("sell_exp", "RSI70above").unwrap();
        store.set("buy_exp", "SMA20above").unwrap();

        assert_eq!(store.get("buy_exp").unwrap().as_deref(), Some("SMA20above"));
        assert_eq!(store.get("sell_exp").unwrap().as_deref(), Some("RSI70above"));

        let raw = fs::read_to_string(store.path()).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("buy"), Err(StratError::Store { .. })));
    }

    #[test]
    fn from_config_uses_default_path() {
        let config = FileConfigAdapter::from_string("[store]\nbackend = json\n").unwrap();
        let store = JsonFileStore::from_config(&config);
        assert_eq!(store.path(), Path::new(JsonFileStore::DEFAULT_PATH));
    }
}
