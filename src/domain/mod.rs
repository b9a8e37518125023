//! Core domain types and logic.

pub mod error;
pub mod catalog;
pub mod symbol_key;
pub mod condition;
pub mod builder;
pub mod compiler;
pub mod side;
pub mod expression_parser;
pub mod persistence;
pub mod session;
pub mod request;
pub mod strategy_config;
pub mod config_validation;
