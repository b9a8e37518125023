//! In-memory key/value store.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::error::StratError;
use crate::ports::store_port::KeyValueStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StratError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StratError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("buy").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn set_then_get_overwrites() {
        let store = MemoryStore::new();
        store.set("buy_exp", "SMA14above").unwrap();
        store.set("buy_exp", "RSI14below").unwrap();
        assert_eq!(store.get("buy_exp").unwrap().as_deref(), Some("RSI14below"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_entry_seeds() {
        let store = MemoryStore::new().with_entry("days", "30");
        assert_eq!(store.get("days").unwrap().as_deref(), Some("30"));
    }
}
