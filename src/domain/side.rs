//! Strategy side (buy or sell) and its persistence keys.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Buy, Side::Sell];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Store key holding the JSON parameter array.
    pub fn params_key(self) -> &'static str {
        self.as_str()
    }

    /// Store key holding the expression string.
    pub fn expression_key(self) -> &'static str {
        match self {
            Side::Buy => "buy_exp",
            Side::Sell => "sell_exp",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(format!("unknown side '{s}' (expected buy, sell)")),
        }
    }
}
