//! Indicator parameter catalog.
//!
//! Static registry of the user-editable parameters for each indicator kind.
//! Price inputs (open/high/low/close) are supplied by the backtest engine and
//! are not part of the schema. Field order is significant: the expression
//! compiler concatenates parameter values in exactly this order.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Int,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub key: &'static str,
    pub label: &'static str,
    pub semantic_type: SemanticType,
}

const fn int(key: &'static str, label: &'static str) -> FieldSchema {
    FieldSchema {
        key,
        label,
        semantic_type: SemanticType::Int,
    }
}

const fn text(key: &'static str, label: &'static str) -> FieldSchema {
    FieldSchema {
        key,
        label,
        semantic_type: SemanticType::Str,
    }
}

const TIMEPERIOD: &[FieldSchema] = &[int("timeperiod", "Timeperiod")];

const STOCH: &[FieldSchema] = &[int("slowk_period", "Slow K Period")];

const MACD: &[FieldSchema] = &[
    int("slowperiod", "Slow Period"),
    int("fastperiod", "Fast Period"),
    int("signalperiod", "Signal Period"),
];

const HEIKEN_ASHI: &[FieldSchema] = &[
    int("candle_number", "Candle Number"),
    text("candle_state", "Candle State"),
];

const BBANDS: &[FieldSchema] = &[
    int("timeperiod", "Timeperiod"),
    int("nbdevup", "NbDev Up"),
    int("nbdevdn", "NbDev Dn"),
];

const SAR: &[FieldSchema] = &[int("acceleration", "Acceleration"), int("maximum", "Maximum")];

const SUPERTREND: &[FieldSchema] = &[int("period", "Period"), int("multiplier", "Multiplier")];

/// Selectable indicator kinds with their display labels, in menu order.
const OPTIONS: &[(&str, &str)] = &[
    ("Stoch", "Stochastic (Stoch)"),
    ("Dema", "DEMA"),
    ("Ma", "MA"),
    ("Sma", "SMA"),
    ("Macd", "MACD"),
    ("HeikenAshi", "Heiken Ashi"),
    ("Adx", "ADX"),
    ("Bbands", "Bollinger Bands (BBands)"),
    ("Rsi", "RSI"),
    ("Sar", "SAR"),
    ("Willr", "WILLR"),
    ("Supertrend", "Supertrend"),
];

/// Parameter schema for `kind`. Unknown or empty kinds have no fields.
pub fn lookup(kind: &str) -> &'static [FieldSchema] {
    match kind {
        "Stoch" => STOCH,
        "Dema" | "Ma" | "Sma" | "Adx" | "Rsi" | "Willr" => TIMEPERIOD,
        "Macd" => MACD,
        "HeikenAshi" => HEIKEN_ASHI,
        "Bbands" => BBANDS,
        "Sar" => SAR,
        "Supertrend" => SUPERTREND,
        _ => &[],
    }
}

/// Schema entry for a single field of `kind`, if the kind declares it.
pub fn field(kind: &str, key: &str) -> Option<&'static FieldSchema> {
    lookup(kind).iter().find(|f| f.key == key)
}

/// `(kind, label)` pairs for every known indicator, in menu order.
pub fn options() -> &'static [(&'static str, &'static str)] {
    OPTIONS
}

pub fn is_known(kind: &str) -> bool {
    OPTIONS.iter().any(|(k, _)| *k == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_single_field_kinds() {
        for kind in ["Dema", "Ma", "Sma", "Adx", "Rsi", "Willr"] {
            let fields = lookup(kind);
            assert_eq!(fields.len(), 1, "{kind}");
            assert_eq!(fields[0].key, "timeperiod");
            assert_eq!(fields[0].semantic_type, SemanticType::Int);
        }
    }

    #[test]
    fn lookup_macd_order() {
        let keys: Vec<&str> = lookup("Macd").iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["slowperiod", "fastperiod", "signalperiod"]);
    }

    #[test]
    fn lookup_heiken_ashi_has_string_field() {
        let fields = lookup("HeikenAshi");
        assert_eq!(fields[0].semantic_type, SemanticType::Int);
        assert_eq!(fields[1].key, "candle_state");
        assert_eq!(fields[1].semantic_type, SemanticType::Str);
    }

    #[test]
    fn lookup_unknown_and_empty() {
        assert!(lookup("").is_empty());
        assert!(lookup("Ichimoku").is_empty());
        assert!(lookup("sma").is_empty());
    }

    #[test]
    fn field_lookup() {
        assert_eq!(field("Bbands", "nbdevdn").map(|f| f.label), Some("NbDev Dn"));
        assert!(field("Bbands", "maximum").is_none());
        assert!(field("", "timeperiod").is_none());
    }

    #[test]
    fn every_option_has_a_schema() {
        assert_eq!(options().len(), 12);
        for (kind, _) in options() {
            assert!(!lookup(kind).is_empty(), "{kind}");
            assert!(is_known(kind));
        }
        assert!(!is_known("Ichimoku"));
    }
}
