//! Condition data model.
//!
//! - `Trend` / `CompareTo`: the comparison enums fixed at the wire boundary
//! - `ParamValue` / `Params`: indicator parameter values in insertion order
//! - `ConditionEntry`: one indicator condition
//! - `ConditionGroup`: AND-combined entries
//! - `StrategySide`: OR-combined groups for one side of a strategy
//!
//! The editing operations live in [`crate::domain::builder`].

use std::fmt;
use std::str::FromStr;

use crate::domain::catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trend {
    #[default]
    Above,
    Below,
    CrossedAbove,
    CrossedBelow,
}

impl Trend {
    pub const ALL: [Trend; 4] = [
        Trend::Above,
        Trend::Below,
        Trend::CrossedAbove,
        Trend::CrossedBelow,
    ];

    /// Wire value, as sent to the backtest engine.
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Above => "above",
            Trend::Below => "below",
            Trend::CrossedAbove => "crossed_above",
            Trend::CrossedBelow => "crossed_below",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Above => "Above",
            Trend::Below => "Below",
            Trend::CrossedAbove => "Crossed Above",
            Trend::CrossedBelow => "Crossed Below",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trend::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!("unknown trend '{s}' (expected above, below, crossed_above, crossed_below)")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareTo {
    #[default]
    Close,
    Constant,
}

impl CompareTo {
    pub const ALL: [CompareTo; 2] = [CompareTo::Close, CompareTo::Constant];

    pub fn as_str(self) -> &'static str {
        match self {
            CompareTo::Close => "close",
            CompareTo::Constant => "constant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompareTo::Close => "Close Price",
            CompareTo::Constant => "Constant Value",
        }
    }
}

impl fmt::Display for CompareTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareTo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompareTo::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown compare_to '{s}' (expected close, constant)"))
    }
}

/// A single parameter value. Numeric fields hold whatever the numeric
/// coercion produced, including NaN for non-numeric input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Empty text counts as "no value" for both compiled artifacts.
    pub fn is_empty(&self) -> bool {
        matches!(self, ParamValue::Text(s) if s.is_empty())
    }

    /// String form used inside the expression.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Number(n) => format_number(*n),
            ParamValue::Text(s) => s.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Number(n) => number_to_json(*n),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Numeric coercion of raw user input: surrounding whitespace is ignored,
/// blank input is 0, unsigned `0x`/`0o`/`0b` literals are read in their
/// radix, anything unparseable is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(v) = parse_radix_literal(trimmed) {
        return v;
    }
    match trimmed.parse::<f64>() {
        // Rust accepts "inf"/"nan" spellings; only the explicit Infinity forms count.
        Ok(v) if v.is_infinite() => match trimmed.trim_start_matches(['+', '-']) {
            "Infinity" => v,
            _ => f64::NAN,
        },
        Ok(v) if v.is_nan() => f64::NAN,
        Ok(v) => v,
        Err(_) => f64::NAN,
    }
}

/// `Some` for input carrying a radix prefix: the value when every digit
/// is valid, NaN otherwise. `None` when there is no prefix.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

/// Locale-independent number formatting: integral values carry no
/// fractional part, non-finite values print as `NaN` / `Infinity`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
            _ => exp,
        };
    }
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// JSON form of a number: integral values become JSON integers, non-finite
/// values become `null`.
pub fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Parameter values in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    values: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Replaces an existing value in place or appends a new key.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        let key = key.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionEntry {
    pub id: u64,
    pub kind: String,
    pub params: Params,
    pub trend: Trend,
    pub compare_to: CompareTo,
    pub compare_value: Option<f64>,
}

impl ConditionEntry {
    /// Blank entry: no indicator chosen, `above` the close price.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            kind: String::new(),
            params: Params::new(),
            trend: Trend::Above,
            compare_to: CompareTo::Close,
            compare_value: None,
        }
    }

    /// Whether the entry contributes to the compiled artifacts. Empty and
    /// unknown kinds both mean "no condition".
    pub fn is_active(&self) -> bool {
        catalog::is_known(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    pub id: u64,
    pub entries: Vec<ConditionEntry>,
}

/// One side (buy or sell) of a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySide {
    pub(crate) groups: Vec<ConditionGroup>,
    pub(crate) next_id: u64,
}

impl StrategySide {
    /// Initial state: a single group holding a single blank entry.
    pub fn new() -> Self {
        let mut side = Self {
            groups: Vec::new(),
            next_id: 0,
        };
        let group = side.new_group();
        side.groups.push(group);
        side
    }

    pub fn groups(&self) -> &[ConditionGroup] {
        &self.groups
    }

    pub fn group(&self, g: usize) -> Option<&ConditionGroup> {
        self.groups.get(g)
    }

    pub fn entry(&self, g: usize, e: usize) -> Option<&ConditionEntry> {
        self.groups.get(g).and_then(|grp| grp.entries.get(e))
    }

    /// Entries with a known indicator chosen, across all groups.
    pub fn active_entries(&self) -> impl Iterator<Item = &ConditionEntry> {
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter(|e| e.is_active())
    }

    pub(crate) fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn new_entry(&mut self) -> ConditionEntry {
        ConditionEntry::new(self.fresh_id())
    }

    pub(crate) fn new_group(&mut self) -> ConditionGroup {
        let id = self.fresh_id();
        let entry = self.new_entry();
        ConditionGroup {
            id,
            entries: vec![entry],
        }
    }
}

impl Default for StrategySide {
    fn default() -> Self {
        Self::new()
    }
}
