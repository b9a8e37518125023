//! Expression string parser.
//!
//! Parses compiled expressions back into their group/condition structure:
//!
//! ```text
//! expression := group ( " | " group )*
//! group      := "___" | condition | "(" condition ( " & " condition )+ ")"
//! condition  := APIKEY operands trend
//! ```
//!
//! Operand values are concatenated without separators on the wire, so they
//! are returned as one opaque string. The API key is the longest catalog key
//! prefixing the condition (falling back to the leading `[A-Z_]` run for keys
//! the catalog does not know) and the trend is matched as a suffix.

use std::fmt;

use crate::domain::catalog;
use crate::domain::compiler::{AND_SEPARATOR, OR_SEPARATOR, PLACEHOLDER};
use crate::domain::condition::Trend;
use crate::domain::error::ParseError;
use crate::domain::symbol_key::normalize;

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub groups: Vec<GroupExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupExpr {
    Placeholder,
    Conditions(Vec<ConditionToken>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionToken {
    pub api_key: String,
    pub operands: String,
    pub trend: Trend,
}

impl ConditionToken {
    pub fn is_known(&self) -> bool {
        known_keys().iter().any(|k| *k == self.api_key)
    }
}

impl Expression {
    pub fn conditions(&self) -> impl Iterator<Item = &ConditionToken> {
        self.groups.iter().flat_map(|g| match g {
            GroupExpr::Placeholder => &[] as &[ConditionToken],
            GroupExpr::Conditions(c) => c.as_slice(),
        })
    }
}

impl fmt::Display for ConditionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.api_key, self.operands, self.trend)
    }
}

impl fmt::Display for GroupExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupExpr::Placeholder => f.write_str(PLACEHOLDER),
            GroupExpr::Conditions(conds) if conds.len() == 1 => write!(f, "{}", conds[0]),
            GroupExpr::Conditions(conds) => {
                let parts: Vec<String> = conds.iter().map(|c| c.to_string()).collect();
                write!(f, "({})", parts.join(AND_SEPARATOR))
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        f.write_str(&parts.join(OR_SEPARATOR))
    }
}

fn known_keys() -> Vec<String> {
    catalog::options().iter().map(|(kind, _)| normalize(kind)).collect()
}

/// Trends ordered so that `crossed_*` is tried before its `above`/`below` suffix.
const TREND_SUFFIXES: [Trend; 4] = [
    Trend::CrossedAbove,
    Trend::CrossedBelow,
    Trend::Above,
    Trend::Below,
];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    keys: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let mut keys = known_keys();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
        Self {
            input,
            pos: 0,
            keys,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn consume_exact(&mut self, s: &str) -> bool {
        if self.remaining().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn found(&self) -> String {
        self.peek()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn parse_condition(&mut self) -> Result<ConditionToken, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if matches!(ch, ' ' | '(' | ')' | '|' | '&') {
                break;
            }
            self.advance();
        }
        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Err(ParseError {
                message: format!("expected condition, found '{}'", self.found()),
                position: start,
            });
        }

        let api_key = match self.keys.iter().find(|k| token.starts_with(k.as_str())) {
            Some(k) => k.clone(),
            None => token
                .chars()
                .take_while(|c| c.is_ascii_uppercase() || *c == '_')
                .collect(),
        };
        if api_key.is_empty() {
            return Err(ParseError {
                message: format!("expected indicator key, found '{}'", token),
                position: start,
            });
        }

        let rest = &token[api_key.len()..];
        let trend = TREND_SUFFIXES
            .into_iter()
            .find(|t| rest.ends_with(t.as_str()))
            .ok_or_else(|| ParseError {
                message: format!("expected trend at end of '{}'", token),
                position: self.pos,
            })?;
        let operands = rest[..rest.len() - trend.as_str().len()].to_string();

        Ok(ConditionToken {
            api_key,
            operands,
            trend,
        })
    }

    fn parse_group(&mut self) -> Result<GroupExpr, ParseError> {
        if self.consume_exact(PLACEHOLDER) {
            return Ok(GroupExpr::Placeholder);
        }

        if self.peek() == Some('(') {
            self.advance();
            let mut conditions = vec![self.parse_condition()?];
            while self.consume_exact(AND_SEPARATOR) {
                conditions.push(self.parse_condition()?);
            }
            self.expect_char(')')?;
            if conditions.len() < 2 {
                return Err(ParseError {
                    message: "parenthesized group requires at least 2 conditions".to_string(),
                    position: self.pos,
                });
            }
            return Ok(GroupExpr::Conditions(conditions));
        }

        Ok(GroupExpr::Conditions(vec![self.parse_condition()?]))
    }

    fn parse(&mut self) -> Result<Expression, ParseError> {
        let mut groups = vec![self.parse_group()?];
        while self.consume_exact(OR_SEPARATOR) {
            groups.push(self.parse_group()?);
        }
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input '{}'", self.found()),
                position: self.pos,
            });
        }
        Ok(Expression { groups })
    }
}

pub fn parse(input: &str) -> Result<Expression, ParseError> {
    Parser::new(input).parse()
}
