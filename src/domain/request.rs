//! Backtest request assembly.
//!
//! Combines both sides' persisted artifacts with the selected ticker and
//! look-back window into the payload the backtest service expects. Sending
//! the request is left to the caller.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::compiler::IndicatorParams;
use crate::domain::error::StratError;
use crate::domain::side::Side;
use crate::ports::store_port::KeyValueStore;

pub const TICKER_KEY: &str = "ticker";
pub const SELECTED_TICKER_KEY: &str = "selectedTicker";
pub const DAYS_KEY: &str = "days";
pub const DEFAULT_DAYS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub ticker: String,
    pub limit: u32,
    pub buy: Vec<IndicatorParams>,
    pub buy_exp: String,
    pub sell: Vec<IndicatorParams>,
    pub sell_exp: String,
}

/// Values that take precedence over what the store holds.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub ticker: Option<String>,
    pub days: Option<u32>,
}

/// Records the ticker and window selection in the store.
pub fn store_selection(
    store: &dyn KeyValueStore,
    ticker: Option<&str>,
    days: u32,
) -> Result<(), StratError> {
    if let Some(t) = ticker.filter(|t| !t.is_empty()) {
        store.set(SELECTED_TICKER_KEY, t)?;
        store.set(TICKER_KEY, t)?;
    }
    store.set(DAYS_KEY, &days.to_string())
}

pub fn assemble(
    store: &dyn KeyValueStore,
    overrides: &RequestOverrides,
) -> Result<BacktestRequest, StratError> {
    // The selection the user last made wins; `ticker` is the fallback key.
    let ticker = match &overrides.ticker {
        Some(t) => t.clone(),
        None => match non_empty(store.get(SELECTED_TICKER_KEY)?) {
            Some(t) => t,
            None => non_empty(store.get(TICKER_KEY)?).unwrap_or_default(),
        },
    };

    let limit = match overrides.days {
        Some(d) => d,
        None => parse_days(store.get(DAYS_KEY)?.as_deref()),
    };

    let (buy, buy_exp) = side_artifacts(store, Side::Buy)?;
    let (sell, sell_exp) = side_artifacts(store, Side::Sell)?;

    Ok(BacktestRequest {
        ticker,
        limit,
        buy,
        buy_exp,
        sell,
        sell_exp,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Stored window length; missing, blank or non-positive values fall back to the default.
pub fn parse_days(raw: Option<&str>) -> u32 {
    raw.and_then(|d| d.trim().parse::<u32>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_DAYS)
}

fn side_artifacts(
    store: &dyn KeyValueStore,
    side: Side,
) -> Result<(Vec<IndicatorParams>, String), StratError> {
    let params = match non_empty(store.get(side.params_key())?) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(%side, error = %e, "persisted parameter array is corrupt, sending none");
            Vec::new()
        }),
        None => Vec::new(),
    };
    let expression = store.get(side.expression_key())?.unwrap_or_default();
    Ok((params, expression))
}
