//! Configuration validation.
//!
//! Checks a strategy file before anything is compiled or persisted.

use crate::domain::catalog;
use crate::domain::condition::{CompareTo, Trend};
use crate::domain::error::StratError;
use crate::domain::strategy_config::{
    parse_compare_value, parse_section, COMPARE_TO_KEY, COMPARE_VALUE_KEY, KIND_KEY, TREND_KEY,
};
use crate::ports::config_port::ConfigPort;

pub const STORE_SECTION: &str = "store";
pub const BACKTEST_SECTION: &str = "backtest";
pub const STORE_BACKENDS: [&str; 3] = ["sqlite", "json", "memory"];

/// Sections configparser creates for keys outside any section.
const IMPLICIT_SECTIONS: [&str; 1] = ["default"];

pub fn validate_store_config(config: &dyn ConfigPort) -> Result<(), StratError> {
    validate_backend(config)
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratError> {
    validate_days(config)?;
    validate_ticker(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StratError> {
    for section in config.sections() {
        if section == STORE_SECTION
            || section == BACKTEST_SECTION
            || IMPLICIT_SECTIONS.contains(&section.as_str())
        {
            continue;
        }
        if parse_section(&section).is_none() {
            return Err(StratError::ConfigInvalid {
                section: section.clone(),
                key: String::new(),
                reason: "section must be store, backtest or <buy|sell>.<group>.<entry>"
                    .to_string(),
            });
        }
        validate_entry(config, &section)?;
    }
    Ok(())
}

/// Runs every check in file order: store, backtest, then condition entries.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), StratError> {
    validate_store_config(config)?;
    validate_backtest_config(config)?;
    validate_strategy_config(config)
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), StratError> {
    let Some(backend) = config.get_string(STORE_SECTION, "backend") else {
        return Ok(());
    };
    let backend = backend.trim().to_lowercase();
    if !STORE_BACKENDS.contains(&backend.as_str()) {
        return Err(StratError::ConfigInvalid {
            section: STORE_SECTION.to_string(),
            key: "backend".to_string(),
            reason: format!(
                "unknown backend '{}', expected one of {}",
                backend,
                STORE_BACKENDS.join(", ")
            ),
        });
    }
    if backend == "sqlite" {
        match config.get_string(STORE_SECTION, "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(StratError::ConfigMissing {
                    section: STORE_SECTION.to_string(),
                    key: "path".to_string(),
                })
            }
        }
    }
    Ok(())
}

fn validate_days(config: &dyn ConfigPort) -> Result<(), StratError> {
    let Some(raw) = config.get_string(BACKTEST_SECTION, "days") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(d) if d > 0 && d <= i64::from(u32::MAX) => Ok(()),
        _ => Err(StratError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: "days".to_string(),
            reason: "days must be a positive integer".to_string(),
        }),
    }
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), StratError> {
    match config.get_string(BACKTEST_SECTION, "ticker") {
        Some(t) if t.trim().contains(char::is_whitespace) => Err(StratError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: "ticker".to_string(),
            reason: "ticker must be a single symbol".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_entry(config: &dyn ConfigPort, section: &str) -> Result<(), StratError> {
    if let Some(kind) = config.get_string(section, KIND_KEY) {
        let kind = kind.trim();
        if !kind.is_empty() && !catalog::is_known(kind) {
            return Err(StratError::ConfigInvalid {
                section: section.to_string(),
                key: KIND_KEY.to_string(),
                reason: format!("unknown indicator kind '{}'", kind),
            });
        }
    }

    if let Some(raw) = config.get_string(section, TREND_KEY) {
        raw.trim()
            .parse::<Trend>()
            .map_err(|reason| StratError::ConfigInvalid {
                section: section.to_string(),
                key: TREND_KEY.to_string(),
                reason,
            })?;
    }

    let compare_to = match config.get_string(section, COMPARE_TO_KEY) {
        Some(raw) => raw
            .trim()
            .parse::<CompareTo>()
            .map_err(|reason| StratError::ConfigInvalid {
                section: section.to_string(),
                key: COMPARE_TO_KEY.to_string(),
                reason,
            })?,
        None => CompareTo::Close,
    };

    if let Some(raw) = config.get_string(section, COMPARE_VALUE_KEY) {
        parse_compare_value(section, &raw)?;
        if compare_to != CompareTo::Constant {
            return Err(StratError::ConfigInvalid {
                section: section.to_string(),
                key: COMPARE_VALUE_KEY.to_string(),
                reason: "compare_value requires compare_to = constant".to_string(),
            });
        }
    }

    Ok(())
}
