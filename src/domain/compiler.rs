//! Expression compiler.
//!
//! Derives the two wire artifacts the backtest engine consumes from one
//! side of a strategy:
//!
//! - the parameter array, one `{APIKEY: {params.., trend, ..}}` object per
//!   entry that has an indicator
//! - the expression string:
//!
//! ```text
//! expression := group ( " | " group )*
//! group      := "___" | entry | "(" entry ( " & " entry )* ")"
//! entry      := APIKEY paramToken* constToken? trendToken
//! ```
//!
//! Parameter tokens are concatenated without separators in catalog order,
//! so the engine can only split them apart if the order and count per
//! indicator never vary. Both derivations are pure.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::catalog;
use crate::domain::condition::{format_number, number_to_json, CompareTo, ConditionEntry, StrategySide};
use crate::domain::symbol_key::normalize;

pub const PLACEHOLDER: &str = "___";
pub const OR_SEPARATOR: &str = " | ";
pub const AND_SEPARATOR: &str = " & ";

/// Parameters for one indicator, serialized as a single-key object keyed by
/// the indicator's wire key.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub api_key: String,
    pub values: Map<String, Value>,
}

impl Serialize for IndicatorParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.api_key, &self.values)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for IndicatorParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(de::Error::invalid_length(map.len(), &"a single-key object"));
        }
        let (api_key, value) = map
            .into_iter()
            .next()
            .ok_or_else(|| de::Error::custom("empty parameter object"))?;
        match value {
            Value::Object(values) => Ok(IndicatorParams { api_key, values }),
            other => Err(de::Error::custom(format!(
                "parameters for {api_key} must be an object, found {other}"
            ))),
        }
    }
}

/// Compiled artifacts for one side. Derived state only: always
/// reconstructible by calling [`recompile`] on the side it came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledStrategy {
    pub param_array: Vec<IndicatorParams>,
    pub expression: String,
}

impl CompiledStrategy {
    pub fn param_array_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.param_array)
    }
}

pub fn recompile(side: &StrategySide) -> CompiledStrategy {
    CompiledStrategy {
        param_array: build_parameter_array(side),
        expression: build_expression_string(side),
    }
}

pub fn build_parameter_array(side: &StrategySide) -> Vec<IndicatorParams> {
    side.active_entries().map(entry_params).collect()
}

fn entry_params(entry: &ConditionEntry) -> IndicatorParams {
    let mut values = Map::new();
    for (key, value) in entry.params.iter() {
        if !value.is_empty() {
            values.insert(key.to_string(), value.to_json());
        }
    }
    values.insert("trend".into(), Value::from(entry.trend.as_str()));
    if entry.compare_to != CompareTo::Close {
        values.insert("compareTo".into(), Value::from(entry.compare_to.as_str()));
        if let Some(v) = entry.compare_value {
            values.insert("compareValue".into(), number_to_json(v));
        }
    }
    IndicatorParams {
        api_key: normalize(&entry.kind),
        values,
    }
}

pub fn build_expression_string(side: &StrategySide) -> String {
    side.groups()
        .iter()
        .map(|group| {
            let pieces: Vec<String> = group.entries.iter().filter_map(render_entry).collect();
            match pieces.len() {
                0 => PLACEHOLDER.to_string(),
                1 => pieces.into_iter().next().unwrap_or_default(),
                _ => format!("({})", pieces.join(AND_SEPARATOR)),
            }
        })
        .collect::<Vec<_>>()
        .join(OR_SEPARATOR)
}

/// Expression token for one entry, or `None` when it holds no condition.
pub fn render_entry(entry: &ConditionEntry) -> Option<String> {
    if !entry.is_active() {
        return None;
    }
    let mut out = normalize(&entry.kind);
    for field in catalog::lookup(&entry.kind) {
        if let Some(value) = entry.params.get(field.key).filter(|v| !v.is_empty()) {
            out.push_str(&value.render());
        }
    }
    if entry.compare_to == CompareTo::Constant {
        if let Some(v) = entry.compare_value {
            out.push_str(&format_number(v));
        }
    }
    out.push_str(entry.trend.as_str());
    Some(out)
}
