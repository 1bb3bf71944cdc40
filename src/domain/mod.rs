//! Core domain types and logic.

pub mod ohlcv;
pub mod fill;
pub mod grid;
pub mod tracker;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
