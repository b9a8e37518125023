//! Condition builder edits.
//!
//! Every edit is a pure transition `&StrategySide -> StrategySide`. Edits
//! that would break a structural invariant (removing the last group or the
//! last entry of a group, setting a constant without `compare_to =
//! constant`) or that address a group/entry that does not exist return an
//! unchanged copy of the state instead of failing.

use crate::domain::catalog::{self, SemanticType};
use crate::domain::condition::{
    coerce_number, CompareTo, ConditionEntry, ParamValue, Params, StrategySide, Trend,
};

/// A single user edit against one side of a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    AddGroup,
    RemoveGroup {
        group: usize,
    },
    AddEntry {
        group: usize,
    },
    RemoveEntry {
        group: usize,
        entry: usize,
    },
    SetKind {
        group: usize,
        entry: usize,
        kind: String,
    },
    SetParam {
        group: usize,
        entry: usize,
        key: String,
        raw: String,
    },
    SetTrend {
        group: usize,
        entry: usize,
        trend: Trend,
    },
    SetCompareTo {
        group: usize,
        entry: usize,
        compare_to: CompareTo,
    },
    SetCompareValue {
        group: usize,
        entry: usize,
        value: f64,
    },
}

/// Schema defaults for `kind`: 0 for integer fields, empty text otherwise.
pub fn default_params(kind: &str) -> Params {
    let mut params = Params::new();
    for field in catalog::lookup(kind) {
        let value = match field.semantic_type {
            SemanticType::Int => ParamValue::Number(0.0),
            SemanticType::Str => ParamValue::Text(String::new()),
        };
        params.insert(field.key, value);
    }
    params
}

impl StrategySide {
    pub fn apply(&self, edit: &Edit) -> StrategySide {
        match edit {
            Edit::AddGroup => self.add_group(),
            Edit::RemoveGroup { group } => self.remove_group(*group),
            Edit::AddEntry { group } => self.add_entry(*group),
            Edit::RemoveEntry { group, entry } => self.remove_entry(*group, *entry),
            Edit::SetKind { group, entry, kind } => self.set_kind(*group, *entry, kind),
            Edit::SetParam {
                group,
                entry,
                key,
                raw,
            } => self.set_param(*group, *entry, key, raw),
            Edit::SetTrend {
                group,
                entry,
                trend,
            } => self.set_trend(*group, *entry, *trend),
            Edit::SetCompareTo {
                group,
                entry,
                compare_to,
            } => self.set_compare_to(*group, *entry, *compare_to),
            Edit::SetCompareValue {
                group,
                entry,
                value,
            } => self.set_compare_value(*group, *entry, *value),
        }
    }

    pub fn add_group(&self) -> StrategySide {
        let mut next = self.clone();
        let group = next.new_group();
        next.groups.push(group);
        next
    }

    pub fn remove_group(&self, g: usize) -> StrategySide {
        let mut next = self.clone();
        if next.groups.len() > 1 && g < next.groups.len() {
            next.groups.remove(g);
        }
        next
    }

    pub fn add_entry(&self, g: usize) -> StrategySide {
        let mut next = self.clone();
        if g < next.groups.len() {
            let entry = next.new_entry();
            next.groups[g].entries.push(entry);
        }
        next
    }

    pub fn remove_entry(&self, g: usize, e: usize) -> StrategySide {
        let mut next = self.clone();
        if let Some(group) = next.groups.get_mut(g) {
            if group.entries.len() > 1 && e < group.entries.len() {
                group.entries.remove(e);
            }
        }
        next
    }

    /// Selects an indicator; parameters are reseeded from the new kind's schema.
    pub fn set_kind(&self, g: usize, e: usize, kind: &str) -> StrategySide {
        self.update_entry(g, e, |entry| {
            entry.kind = kind.to_string();
            entry.params = default_params(kind);
        })
    }

    /// Stores a raw form value, coerced to a number when the schema says
    /// the field is an integer. Keys the schema does not know are kept as text.
    pub fn set_param(&self, g: usize, e: usize, key: &str, raw: &str) -> StrategySide {
        self.update_entry(g, e, |entry| {
            let value = match catalog::field(&entry.kind, key).map(|f| f.semantic_type) {
                Some(SemanticType::Int) => ParamValue::Number(coerce_number(raw)),
                _ => ParamValue::Text(raw.to_string()),
            };
            entry.params.insert(key, value);
        })
    }

    pub fn set_trend(&self, g: usize, e: usize, trend: Trend) -> StrategySide {
        self.update_entry(g, e, |entry| entry.trend = trend)
    }

    /// Changing the reference always drops any previously entered constant.
    pub fn set_compare_to(&self, g: usize, e: usize, compare_to: CompareTo) -> StrategySide {
        self.update_entry(g, e, |entry| {
            entry.compare_to = compare_to;
            entry.compare_value = None;
        })
    }

    pub fn set_compare_value(&self, g: usize, e: usize, value: f64) -> StrategySide {
        self.update_entry(g, e, |entry| {
            if entry.compare_to == CompareTo::Constant {
                entry.compare_value = Some(value);
            }
        })
    }

    fn update_entry<F>(&self, g: usize, e: usize, f: F) -> StrategySide
    where
        F: FnOnce(&mut ConditionEntry),
    {
        let mut next = self.clone();
        if let Some(entry) = next.groups.get_mut(g).and_then(|grp| grp.entries.get_mut(e)) {
            f(entry);
        }
        next
    }
}
