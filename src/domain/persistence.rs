//! Persistence of compiled artifacts.
//!
//! Each side is stored under two keys: the JSON parameter array under
//! `buy`/`sell` and the expression under `buy_exp`/`sell_exp`. Persisted
//! artifacts are display-only: nothing here rebuilds builder state from them.
//!
//! Expressions are stored and returned verbatim. Free-text parameters are
//! concatenated without separators, so an expression cannot be re-tokenized
//! reliably and is never checked on read.

use tracing::{debug, warn};

use crate::domain::compiler::{CompiledStrategy, IndicatorParams};
use crate::domain::error::StratError;
use crate::domain::side::Side;
use crate::ports::store_port::KeyValueStore;

pub struct PersistenceBridge<'s> {
    store: &'s dyn KeyValueStore,
}

impl<'s> PersistenceBridge<'s> {
    pub fn new(store: &'s dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'s dyn KeyValueStore {
        self.store
    }

    pub fn write(&self, side: Side, compiled: &CompiledStrategy) -> Result<(), StratError> {
        let params = compiled.param_array_json()?;
        self.store.set(side.params_key(), &params)?;
        self.store.set(side.expression_key(), &compiled.expression)?;
        debug!(%side, expression = %compiled.expression, "persisted compiled strategy");
        Ok(())
    }

    /// Previously persisted artifacts for `side`. Missing keys, unreadable
    /// stores and a malformed parameter array count as nothing persisted.
    pub fn read(&self, side: Side) -> Option<CompiledStrategy> {
        let params = self.get_logged(side.params_key())?;
        let expression = self.get_logged(side.expression_key())?;

        let param_array: Vec<IndicatorParams> = match serde_json::from_str(&params) {
            Ok(p) => p,
            Err(e) => {
                warn!(%side, error = %e, "ignoring corrupt persisted parameter array");
                return None;
            }
        };
        Some(CompiledStrategy {
            param_array,
            expression,
        })
    }

    fn get_logged(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(Some(v)) if !v.is_empty() => Some(v),
            Ok(_) => None,
            Err(e) => {
                warn!(key, error = %e, "store read failed");
                None
            }
        }
    }
}
