#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use stratbuilder::domain::builder::Edit;
use stratbuilder::domain::condition::{CompareTo, StrategySide, Trend};

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Strategy file storing into a JSON file at `store_path`.
pub fn strategy_ini(store_path: &Path) -> String {
    format!(
        r#"
[store]
backend = json
path = {}

[backtest]
ticker = AAPL
days = 120

[buy.1.1]
kind = Sma
timeperiod = 14

[buy.1.2]
kind = Rsi
timeperiod = 7
trend = below

[buy.2.1]
kind = Rsi
timeperiod = 14
compare_to = constant
compare_value = 30
trend = crossed_above

[sell.1.1]
kind = Macd
slowperiod = 26
fastperiod = 12
signalperiod = 9
trend = crossed_below

[sell.2.1]
kind =
"#,
        store_path.display()
    )
}

pub fn set_kind(group: usize, entry: usize, kind: &str) -> Edit {
    Edit::SetKind {
        group,
        entry,
        kind: kind.to_string(),
    }
}

pub fn set_param(group: usize, entry: usize, key: &str, raw: &str) -> Edit {
    Edit::SetParam {
        group,
        entry,
        key: key.to_string(),
        raw: raw.to_string(),
    }
}

pub fn set_trend(group: usize, entry: usize, trend: Trend) -> Edit {
    Edit::SetTrend {
        group,
        entry,
        trend,
    }
}

pub fn constant(group: usize, entry: usize, value: f64) -> Vec<Edit> {
    vec![
        Edit::SetCompareTo {
            group,
            entry,
            compare_to: CompareTo::Constant,
        },
        Edit::SetCompareValue {
            group,
            entry,
            value,
        },
    ]
}

pub fn replay(edits: &[Edit]) -> StrategySide {
    edits
        .iter()
        .fold(StrategySide::new(), |state, edit| state.apply(edit))
}
