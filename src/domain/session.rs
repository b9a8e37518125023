//! Editing session for one side of a strategy.
//!
//! Binds a [`Side`] to its builder state, the latest compiled artifacts and
//! the persistence bridge. Every edit goes through [`SideSession::apply`],
//! which recompiles and persists; the compiler itself never touches the store.

use tracing::{debug, info, warn};

use crate::domain::builder::Edit;
use crate::domain::compiler::{recompile, CompiledStrategy};
use crate::domain::condition::StrategySide;
use crate::domain::error::StratError;
use crate::domain::persistence::PersistenceBridge;
use crate::domain::side::Side;
use crate::ports::store_port::KeyValueStore;

pub struct SideSession<'s> {
    side: Side,
    state: StrategySide,
    compiled: CompiledStrategy,
    persisted: Option<CompiledStrategy>,
    edited: bool,
    bridge: PersistenceBridge<'s>,
}

impl<'s> SideSession<'s> {
    /// Starts from a blank side. Artifacts persisted by an earlier session are
    /// loaded for display only and stay on show until the first edit.
    pub fn open(side: Side, store: &'s dyn KeyValueStore) -> Self {
        let bridge = PersistenceBridge::new(store);
        let persisted = bridge.read(side);
        if let Some(p) = &persisted {
            info!(%side, expression = %p.expression, "loaded persisted strategy");
        }
        let state = StrategySide::new();
        let compiled = recompile(&state);
        Self {
            side,
            state,
            compiled,
            persisted,
            edited: false,
            bridge,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn state(&self) -> &StrategySide {
        &self.state
    }

    /// Artifacts compiled from the current builder state.
    pub fn compiled(&self) -> &CompiledStrategy {
        &self.compiled
    }

    pub fn persisted(&self) -> Option<&CompiledStrategy> {
        self.persisted.as_ref()
    }

    /// What a viewer should see: persisted artifacts until the first edit,
    /// the live compilation afterwards.
    pub fn displayed(&self) -> &CompiledStrategy {
        match (&self.persisted, self.edited) {
            (Some(p), false) => p,
            _ => &self.compiled,
        }
    }

    /// Applies an edit, recompiles and writes the result to the store. A failed
    /// write is logged and does not undo the edit.
    pub fn apply(&mut self, edit: &Edit) -> &CompiledStrategy {
        self.state = self.state.apply(edit);
        self.compiled = recompile(&self.state);
        self.edited = true;
        debug!(side = %self.side, ?edit, expression = %self.compiled.expression, "recompiled");
        if let Err(e) = self.bridge.write(self.side, &self.compiled) {
            warn!(side = %self.side, error = %e, "failed to persist compiled strategy");
        }
        &self.compiled
    }

    pub fn apply_all<'e, I>(&mut self, edits: I) -> &CompiledStrategy
    where
        I: IntoIterator<Item = &'e Edit>,
    {
        for edit in edits {
            self.apply(edit);
        }
        &self.compiled
    }

    /// Writes the current compilation, propagating store failures.
    pub fn save(&self) -> Result<(), StratError> {
        self.bridge.write(self.side, &self.compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryStore;
    use crate::domain::condition::Trend;

    fn rsi_edits() -> Vec<Edit> {
        vec![
            Edit::SetKind {
                group: 0,
                entry: 0,
                kind: "Rsi".into(),
            },
            Edit::SetParam {
                group: 0,
                entry: 0,
                key: "timeperiod".into(),
                raw: "14".into(),
            },
            Edit::SetTrend {
                group: 0,
                entry: 0,
                trend: Trend::Below,
            },
        ]
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StratError> {
            Err(StratError::Store {
                reason: "offline".into(),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StratError> {
            Err(StratError::Store {
                reason: "offline".into(),
            })
        }
    }

    #[test]
    fn apply_recompiles_and_persists() {
        let store = MemoryStore::new();
        let mut session = SideSession::open(Side::Buy, &store);
        let compiled = session.apply_all(&rsi_edits()).clone();

        assert_eq!(compiled.expression, "RSI14below");
        assert_eq!(store.get("buy_exp").unwrap().as_deref(), Some("RSI14below"));
        assert_eq!(
            store.get("buy").unwrap().as_deref(),
            Some(r#"[{"RSI":{"timeperiod":14,"trend":"below"}}]"#)
        );
    }

    #[test]
    fn sides_do_not_share_keys() {
        let store = MemoryStore::new();
        let mut buy = SideSession::open(Side::Buy, &store);
        buy.apply_all(&rsi_edits());
        let mut sell = SideSession::open(Side::Sell, &store);
        sell.apply(&Edit::AddGroup);

        assert_eq!(store.get("buy_exp").unwrap().as_deref(), Some("RSI14below"));
        assert_eq!(store.get("sell_exp").unwrap().as_deref(), Some("___ | ___"));
    }

    #[test]
    fn persisted_artifacts_are_display_only_until_first_edit() {
        let store = MemoryStore::new();
        SideSession::open(Side::Buy, &store).apply_all(&rsi_edits());

        let mut reopened = SideSession::open(Side::Buy, &store);
        assert_eq!(reopened.state(), &StrategySide::new());
        assert_eq!(reopened.displayed().expression, "RSI14below");
        assert_eq!(reopened.compiled().expression, "___");

        reopened.apply(&Edit::AddGroup);
        assert_eq!(reopened.displayed().expression, "___ | ___");
        assert_eq!(store.get("buy_exp").unwrap().as_deref(), Some("___ | ___"));
    }

    #[test]
    fn guarded_edit_still_recompiles_identically() {
        let store = MemoryStore::new();
        let mut session = SideSession::open(Side::Buy, &store);
        session.apply_all(&rsi_edits());
        let before = session.state().clone();
        let expr_before = session.compiled().expression.clone();

        session.apply(&Edit::RemoveGroup { group: 0 });
        session.apply(&Edit::RemoveEntry { group: 0, entry: 0 });

        assert_eq!(session.state(), &before);
        assert_eq!(session.compiled().expression, expr_before);
    }

    #[test]
    fn store_failures_do_not_block_edits() {
        let store = FailingStore;
        let mut session = SideSession::open(Side::Sell, &store);
        assert!(session.persisted().is_none());
        let compiled = session.apply_all(&rsi_edits());
        assert_eq!(compiled.expression, "RSI14below");
        assert!(session.save().is_err());
    }
}
