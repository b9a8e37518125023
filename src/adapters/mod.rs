//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod json_file_store;
pub mod memory_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;

use crate::domain::config_validation::STORE_SECTION;
use crate::domain::error::StratError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::KeyValueStore;

/// Opens the store named by `[store] backend`, defaulting to a JSON file.
pub fn open_store(config: &dyn ConfigPort) -> Result<Box<dyn KeyValueStore>, StratError> {
    let backend = config
        .get_string(STORE_SECTION, "backend")
        .map(|b| b.trim().to_lowercase())
        .unwrap_or_else(|| "json".to_string());

    match backend.as_str() {
        "json" => Ok(Box::new(json_file_store::JsonFileStore::from_config(config))),
        "memory" => Ok(Box::new(memory_store::MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(sqlite_store::SqliteStore::from_config(config)?)),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(StratError::ConfigInvalid {
            section: STORE_SECTION.into(),
            key: "backend".into(),
            reason: "sqlite feature is required for this backend".into(),
        }),
        other => Err(StratError::ConfigInvalid {
            section: STORE_SECTION.into(),
            key: "backend".into(),
            reason: format!("unknown backend '{}'", other),
        }),
    }
}
