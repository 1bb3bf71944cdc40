//! Backtest driver: wires the ladder, the tracker and the bar loop together.

use chrono::NaiveDate;

use super::error::GridtraderError;
use super::grid::{DropEvent, GridConfig, GridLadder, RejectedFill};
use super::ohlcv::OhlcvBar;
use super::tracker::{FeeSchedule, PositionTracker};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Grid center. When unset the first bar's close is used.
    pub center_price: Option<f64>,
    pub step: f64,
    pub level_count: usize,
    pub order_size: f64,
    pub allow_margin: bool,
    pub commission_per_fill: f64,
    pub commission_pct: f64,
    pub risk_free_rate: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Final state of a completed run. The tracker carries the fill log and
/// equity curve; drop and rejection events are collected across all bars.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub tracker: PositionTracker,
    pub ladder: GridLadder,
    pub drops: Vec<DropEvent>,
    pub rejected: Vec<RejectedFill>,
}

/// Run the grid over `bars` in date order. Configuration errors surface
/// before any bar is processed; an empty (or fully filtered) series is a
/// data error.
pub fn run_backtest(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, GridtraderError> {
    if config.initial_capital <= 0.0 || !config.initial_capital.is_finite() {
        return Err(GridtraderError::Config {
            param: "initial_capital".into(),
            reason: "must be positive".into(),
        });
    }

    let in_window: Vec<&OhlcvBar> = bars
        .iter()
        .filter(|bar| {
            config.start_date.is_none_or(|start| bar.date >= start)
                && config.end_date.is_none_or(|end| bar.date <= end)
        })
        .collect();

    let first = in_window.first().ok_or_else(|| GridtraderError::Data {
        reason: "no bars in the requested date range".into(),
    })?;

    let grid_config = GridConfig {
        center_price: config.center_price.unwrap_or(first.close),
        step: config.step,
        level_count: config.level_count,
        order_size: config.order_size,
    };
    let mut ladder = GridLadder::new(&grid_config)?;

    let fees = FeeSchedule {
        per_fill: config.commission_per_fill,
        pct: config.commission_pct,
    };
    let mut tracker = PositionTracker::new(config.initial_capital, config.allow_margin, fees);

    let mut drops = Vec::new();
    let mut rejected = Vec::new();

    for bar in in_window {
        let outcome = ladder.on_bar(bar, &mut tracker);
        drops.extend(outcome.drops);
        rejected.extend(outcome.rejected);
        tracker.mark_to_market(bar.date, bar.close);
    }

    Ok(BacktestResult {
        tracker,
        ladder,
        drops,
        rejected,
    })
}
