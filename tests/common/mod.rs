#![allow(dead_code)]

use chrono::NaiveDate;
use gridtrader::domain::backtest::BacktestConfig;
use gridtrader::domain::error::GridtraderError;
pub use gridtrader::domain::ohlcv::OhlcvBar;
use gridtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GridtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GridtraderError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|bar| {
                start_date.is_none_or(|start| bar.date >= start)
                    && end_date.is_none_or(|end| bar.date <= end)
            })
            .collect();
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, GridtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GridtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GridtraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day: &str, low: f64, high: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
        open: close,
        high,
        low,
        close,
        volume: 10_000,
    }
}

pub fn flat_bar(day: &str, price: f64) -> OhlcvBar {
    make_bar(day, price, price, price)
}

/// Flat bars at the given prices, one per day from 2024-01-01.
pub fn flat_series(prices: &[f64]) -> Vec<OhlcvBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| OhlcvBar {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: p,
            high: p,
            low: p,
            close: p,
            volume: 10_000,
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_capital: 100_000.0,
        center_price: Some(100.0),
        step: 1.0,
        level_count: 2,
        order_size: 1.0,
        allow_margin: false,
        commission_per_fill: 0.0,
        commission_pct: 0.0,
        risk_free_rate: 0.0,
        start_date: None,
        end_date: None,
    }
}
