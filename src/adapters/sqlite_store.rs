//! SQLite key/value store adapter.

use crate::domain::error::StratError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::KeyValueStore;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

const DEFAULT_POOL_SIZE: i64 = 2;
const MAX_POOL_SIZE: u32 = 16;

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StratError> {
        let db_path =
            config
                .get_string("store", "path")
                .ok_or_else(|| StratError::ConfigMissing {
                    section: "store".into(),
                    key: "path".into(),
                })?;

        let pool_size = pool_size(config);

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| StratError::Store {
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StratError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| StratError::Store {
                reason: e.to_string(),
            })?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StratError> {
        self.pool.get().map_err(|e: r2d2::Error| StratError::Store {
            reason: e.to_string(),
        })
    }

    fn initialize_schema(&self) -> Result<(), StratError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| StratError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// `[store] pool_size`, clamped to `1..=MAX_POOL_SIZE`. r2d2 opens
/// `max_size` idle connections up front, so large values are capped.
fn pool_size(config: &dyn ConfigPort) -> u32 {
    let requested = config.get_int("store", "pool_size", DEFAULT_POOL_SIZE);
    u32::try_from(requested.max(1))
        .unwrap_or(MAX_POOL_SIZE)
        .min(MAX_POOL_SIZE)
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StratError> {
        let conn = self.connection()?;
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(|e: rusqlite::Error| StratError::StoreQuery {
            reason: e.to_string(),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StratError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e: rusqlite::Error| StratError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
