//! Key/value store port.

use crate::domain::error::StratError;

/// String key/value store holding persisted artifacts and session settings.
///
/// Implementations take `&self` for writes; the tool is single-threaded and
/// adapters manage their own interior mutability or connection pooling.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StratError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StratError>;
}
