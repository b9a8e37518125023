//! Strategy definitions from configuration.
//!
//! Each condition entry is one section named `<side>.<group>.<entry>`, e.g.
//! `[buy.1.2]` for the second entry of the first buy group. Group and entry
//! numbers only order the sections; gaps are allowed. Sections are replayed
//! as builder edits so that loading a file obeys exactly the same rules as
//! interactive editing.

use std::collections::BTreeMap;

use crate::domain::builder::Edit;
use crate::domain::catalog;
use crate::domain::condition::{CompareTo, StrategySide, Trend};
use crate::domain::error::StratError;
use crate::domain::side::Side;
use crate::ports::config_port::ConfigPort;

pub const KIND_KEY: &str = "kind";
pub const TREND_KEY: &str = "trend";
pub const COMPARE_TO_KEY: &str = "compare_to";
pub const COMPARE_VALUE_KEY: &str = "compare_value";

const RESERVED_KEYS: [&str; 4] = [KIND_KEY, TREND_KEY, COMPARE_TO_KEY, COMPARE_VALUE_KEY];

/// Splits `buy.2.1` into `(Side::Buy, 2, 1)`.
pub fn parse_section(name: &str) -> Option<(Side, u32, u32)> {
    let mut parts = name.split('.');
    let side = parts.next()?.parse::<Side>().ok()?;
    let group = parts.next()?.parse::<u32>().ok()?;
    let entry = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((side, group, entry))
}

/// Sides that have at least one entry section, in buy/sell order.
pub fn defined_sides(config: &dyn ConfigPort) -> Vec<Side> {
    let sections = config.sections();
    Side::ALL
        .into_iter()
        .filter(|side| {
            sections
                .iter()
                .any(|s| parse_section(s).is_some_and(|(sd, _, _)| sd == *side))
        })
        .collect()
}

/// Section names for `side`, grouped and ordered by their numbers.
fn layout(config: &dyn ConfigPort, side: Side) -> Vec<Vec<String>> {
    let mut groups: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    for section in config.sections() {
        if let Some((sd, g, e)) = parse_section(&section) {
            if sd == side {
                groups.entry(g).or_default().insert(e, section);
            }
        }
    }
    groups
        .into_values()
        .map(|entries| entries.into_values().collect())
        .collect()
}

/// Builder edits reproducing the configured conditions for `side`, starting
/// from [`StrategySide::new`].
pub fn side_edits(config: &dyn ConfigPort, side: Side) -> Result<Vec<Edit>, StratError> {
    let mut edits = Vec::new();
    for (group, sections) in layout(config, side).iter().enumerate() {
        if group > 0 {
            edits.push(Edit::AddGroup);
        }
        for (entry, section) in sections.iter().enumerate() {
            if entry > 0 {
                edits.push(Edit::AddEntry { group });
            }
            entry_edits(config, section, group, entry, &mut edits)?;
        }
    }
    Ok(edits)
}

pub fn build_side(config: &dyn ConfigPort, side: Side) -> Result<StrategySide, StratError> {
    let edits = side_edits(config, side)?;
    Ok(edits
        .iter()
        .fold(StrategySide::new(), |state, edit| state.apply(edit)))
}

fn entry_edits(
    config: &dyn ConfigPort,
    section: &str,
    group: usize,
    entry: usize,
    edits: &mut Vec<Edit>,
) -> Result<(), StratError> {
    let kind = config
        .get_string(section, KIND_KEY)
        .map(|k| k.trim().to_string())
        .unwrap_or_default();
    if !kind.is_empty() {
        edits.push(Edit::SetKind {
            group,
            entry,
            kind: kind.clone(),
        });
    }

    for key in param_keys(config, section, &kind) {
        let raw = config.get_string(section, &key).unwrap_or_default();
        edits.push(Edit::SetParam {
            group,
            entry,
            key,
            raw,
        });
    }

    if let Some(raw) = config.get_string(section, TREND_KEY) {
        let trend = raw
            .trim()
            .parse::<Trend>()
            .map_err(|reason| invalid(section, TREND_KEY, reason))?;
        edits.push(Edit::SetTrend {
            group,
            entry,
            trend,
        });
    }

    if let Some(raw) = config.get_string(section, COMPARE_TO_KEY) {
        let compare_to = raw
            .trim()
            .parse::<CompareTo>()
            .map_err(|reason| invalid(section, COMPARE_TO_KEY, reason))?;
        edits.push(Edit::SetCompareTo {
            group,
            entry,
            compare_to,
        });
    }

    if let Some(raw) = config.get_string(section, COMPARE_VALUE_KEY) {
        let value = parse_compare_value(section, &raw)?;
        edits.push(Edit::SetCompareValue {
            group,
            entry,
            value,
        });
    }

    Ok(())
}

/// Parameter keys in a section: catalog fields in schema order, then any
/// other keys alphabetically.
fn param_keys(config: &dyn ConfigPort, section: &str, kind: &str) -> Vec<String> {
    let present = config.keys(section);
    let schema = catalog::lookup(kind);
    let mut keys: Vec<String> = schema
        .iter()
        .filter(|f| present.iter().any(|k| k == f.key))
        .map(|f| f.key.to_string())
        .collect();
    keys.extend(
        present
            .into_iter()
            .filter(|k| !RESERVED_KEYS.contains(&k.as_str()))
            .filter(|k| !schema.iter().any(|f| f.key == k)),
    );
    keys
}

pub(crate) fn parse_compare_value(section: &str, raw: &str) -> Result<f64, StratError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(section, COMPARE_VALUE_KEY, format!("'{}' is not a number", raw)))
}

fn invalid(section: &str, key: &str, reason: String) -> StratError {
    StratError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::compiler::recompile;
    use crate::domain::condition::ParamValue;

    fn config(ini: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(ini).unwrap()
    }

    #[test]
    fn parse_section_names() {
        assert_eq!(parse_section("buy.1.2"), Some((Side::Buy, 1, 2)));
        assert_eq!(parse_section("sell.10.3"), Some((Side::Sell, 10, 3)));
        assert_eq!(parse_section("buy.1"), None);
        assert_eq!(parse_section("buy.1.2.3"), None);
        assert_eq!(parse_section("hold.1.1"), None);
        assert_eq!(parse_section("buy.x.1"), None);
        assert_eq!(parse_section("store"), None);
    }

    #[test]
    fn defined_sides_detects_sections() {
        let cfg = config("[store]\nbackend = memory\n[sell.1.1]\nkind = Sma\n");
        assert_eq!(defined_sides(&cfg), vec![Side::Sell]);
    }

    #[test]
    fn build_side_rsi_and_placeholder() {
        let cfg = config(
            "[buy.1.1]\nkind = Rsi\ntimeperiod = 14\ntrend = below\n\n[buy.2.1]\nkind =\n",
        );
        let side = build_side(&cfg, Side::Buy).unwrap();
        assert_eq!(side.groups().len(), 2);
        assert_eq!(recompile(&side).expression, "RSI14below | ___");
    }

    #[test]
    fn build_side_orders_numerically_with_gaps() {
        let cfg = config(
            "[buy.10.1]\nkind = Adx\ntimeperiod = 5\n\
             [buy.2.7]\nkind = Rsi\ntimeperiod = 7\n\
             [buy.2.3]\nkind = Sma\ntimeperiod = 20\n",
        );
        let side = build_side(&cfg, Side::Buy).unwrap();
        assert_eq!(
            recompile(&side).expression,
            "(SMA20above & RSI7above) | ADX5above"
        );
    }

    #[test]
    fn build_side_macd_keys_in_schema_order() {
        let cfg = config(
            "[sell.1.1]\nkind = Macd\nsignalperiod = 9\nfastperiod = 12\nslowperiod = 26\ntrend = crossed_above\n",
        );
        let side = build_side(&cfg, Side::Sell).unwrap();
        let keys: Vec<&str> = side.entry(0, 0).unwrap().params.keys().collect();
        assert_eq!(keys, vec!["slowperiod", "fastperiod", "signalperiod"]);
        assert_eq!(recompile(&side).expression, "MACD26129crossed_above");
    }

    #[test]
    fn build_side_constant_comparison() {
        let cfg = config(
            "[buy.1.1]\nkind = Rsi\ntimeperiod = 14\ncompare_to = constant\ncompare_value = 30\n",
        );
        let side = build_side(&cfg, Side::Buy).unwrap();
        let entry = side.entry(0, 0).unwrap();
        assert_eq!(entry.compare_to, CompareTo::Constant);
        assert_eq!(entry.compare_value, Some(30.0));
        assert_eq!(recompile(&side).expression, "RSI1430above");
    }

    #[test]
    fn unknown_keys_are_kept_as_text() {
        let cfg = config("[buy.1.1]\nkind = Sma\ntimeperiod = 9\nnote = fast\n");
        let side = build_side(&cfg, Side::Buy).unwrap();
        assert_eq!(
            side.entry(0, 0).unwrap().params.get("note"),
            Some(&ParamValue::Text("fast".into()))
        );
    }

    #[test]
    fn missing_side_is_blank() {
        let cfg = config("[buy.1.1]\nkind = Sma\n");
        assert_eq!(build_side(&cfg, Side::Sell).unwrap(), StrategySide::new());
    }

    #[test]
    fn invalid_trend_is_config_error() {
        let cfg = config("[buy.1.1]\nkind = Sma\ntrend = sideways\n");
        let err = build_side(&cfg, Side::Buy).unwrap_err();
        match err {
            StratError::ConfigInvalid { section, key, .. } => {
                assert_eq!(section, "buy.1.1");
                assert_eq!(key, "trend");
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn invalid_compare_value_is_config_error() {
        let cfg = config("[buy.1.1]\nkind = Sma\ncompare_to = constant\ncompare_value = high\n");
        assert!(matches!(
            build_side(&cfg, Side::Buy),
            Err(StratError::ConfigInvalid { .. })
        ));
    }
}
