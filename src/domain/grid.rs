//! Grid ladder construction and the per-bar fill engine.
//!
//! The ladder owns one order slot per level. A filled buy re-arms as a sell
//! one step up (and vice versa), so each completed pair of fills locks in the
//! per-step spread. Orders re-armed beyond the ladder bounds are cancelled
//! permanently rather than extending the ladder.

use chrono::NaiveDate;

use super::error::GridtraderError;
use super::fill::{FillEvent, Side};
use super::ohlcv::OhlcvBar;
use super::tracker::PositionTracker;

/// Immutable ladder parameters, validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub center_price: f64,
    pub step: f64,
    /// Number of levels on each side of the center.
    pub level_count: usize,
    /// Quantity per level order.
    pub order_size: f64,
}

/// Per-level order state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelState {
    Armed(Side),
    Filled,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLevel {
    pub index: usize,
    /// Current order price. Shifts by one step on each re-arm; construction
    /// prices strictly increase with index.
    pub price: f64,
    pub state: LevelState,
}

impl GridLevel {
    pub fn is_armed(&self) -> bool {
        matches!(self.state, LevelState::Armed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, LevelState::Cancelled)
    }

    /// Limit-order trigger: a resting buy executes once the bar trades at or
    /// below its price, a resting sell at or above. The simulated execution
    /// price is always the level price itself, never the bar close.
    fn triggered_by(&self, bar: &OhlcvBar) -> bool {
        match self.state {
            LevelState::Armed(Side::Buy) => bar.low <= self.price,
            LevelState::Armed(Side::Sell) => bar.high >= self.price,
            _ => false,
        }
    }
}

/// An order re-armed outside the ladder bounds and dropped. Recorded, never
/// silently discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct DropEvent {
    pub level_index: usize,
    pub attempted_price: f64,
    pub date: NaiveDate,
}

/// A buy fill rejected by the tracker; the level stays armed.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFill {
    pub level_index: usize,
    pub price: f64,
    pub date: NaiveDate,
}

/// Everything that happened while processing one bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarOutcome {
    pub fills: Vec<FillEvent>,
    pub drops: Vec<DropEvent>,
    pub rejected: Vec<RejectedFill>,
}

impl BarOutcome {
    /// Fills that re-armed a level (i.e. did not hit a boundary drop).
    pub fn rearm_count(&self) -> usize {
        self.fills.len() - self.drops.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLadder {
    levels: Vec<GridLevel>,
    center_price: f64,
    step: f64,
    order_size: f64,
    lower_bound: f64,
    upper_bound: f64,
}

impl GridLadder {
    /// Build a ladder with `level_count` armed buys below the center and
    /// `level_count` armed sells above it, spaced `step` apart.
    pub fn new(config: &GridConfig) -> Result<Self, GridtraderError> {
        if config.center_price <= 0.0 || !config.center_price.is_finite() {
            return Err(GridtraderError::Config {
                param: "center_price".into(),
                reason: "must be positive".into(),
            });
        }
        if config.step <= 0.0 || !config.step.is_finite() {
            return Err(GridtraderError::Config {
                param: "step".into(),
                reason: "must be positive".into(),
            });
        }
        if config.level_count == 0 {
            return Err(GridtraderError::Config {
                param: "level_count".into(),
                reason: "must be at least 1".into(),
            });
        }
        if config.order_size <= 0.0 || !config.order_size.is_finite() {
            return Err(GridtraderError::Config {
                param: "order_size".into(),
                reason: "must be positive".into(),
            });
        }

        let n = config.level_count;
        let mut levels = Vec::with_capacity(2 * n);
        for i in 0..n {
            levels.push(GridLevel {
                index: i,
                price: config.center_price - (n - i) as f64 * config.step,
                state: LevelState::Armed(Side::Buy),
            });
        }
        for i in 0..n {
            levels.push(GridLevel {
                index: n + i,
                price: config.center_price + (i + 1) as f64 * config.step,
                state: LevelState::Armed(Side::Sell),
            });
        }

        Ok(GridLadder {
            levels,
            center_price: config.center_price,
            step: config.step,
            order_size: config.order_size,
            lower_bound: config.center_price - n as f64 * config.step,
            upper_bound: config.center_price + n as f64 * config.step,
        })
    }

    /// Process one bar: fill every level armed at bar start that the bar's
    /// `[low, high]` range triggers, nearest to the center first (ties broken
    /// by index, so behavior is independent of storage layout).
    ///
    /// Fills are applied to `tracker` one at a time. A rejected buy leaves
    /// its level armed and does not stop the remaining levels. Levels
    /// re-armed during this bar cannot fill again until the next bar, so a
    /// gap crossing N armed levels yields exactly N fills.
    pub fn on_bar(&mut self, bar: &OhlcvBar, tracker: &mut PositionTracker) -> BarOutcome {
        let mut candidates: Vec<(f64, usize)> = self
            .levels
            .iter()
            .filter(|level| level.triggered_by(bar))
            .map(|level| ((level.price - self.center_price).abs(), level.index))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut outcome = BarOutcome::default();

        for (_, index) in candidates {
            let (price, side) = match self.levels[index].state {
                LevelState::Armed(side) => (self.levels[index].price, side),
                _ => continue,
            };

            let fill = FillEvent {
                level_index: index,
                price,
                quantity: self.order_size,
                date: bar.date,
                side,
            };

            if tracker.apply_fill(&fill).is_err() {
                // Starved buy: keep the level armed, move on.
                outcome.rejected.push(RejectedFill {
                    level_index: index,
                    price,
                    date: bar.date,
                });
                continue;
            }

            self.levels[index].state = LevelState::Filled;
            outcome.fills.push(fill);
            self.rearm(index, price, side, bar.date, &mut outcome);
        }

        outcome
    }

    /// Flip the filled order to the opposite side one step away, or cancel it
    /// if that lands outside the ladder bounds.
    fn rearm(
        &mut self,
        index: usize,
        fill_price: f64,
        side: Side,
        date: NaiveDate,
        outcome: &mut BarOutcome,
    ) {
        let new_price = match side {
            Side::Buy => fill_price + self.step,
            Side::Sell => fill_price - self.step,
        };

        let level = &mut self.levels[index];
        if new_price < self.lower_bound || new_price > self.upper_bound {
            level.state = LevelState::Cancelled;
            outcome.drops.push(DropEvent {
                level_index: index,
                attempted_price: new_price,
                date,
            });
        } else {
            level.price = new_price;
            level.state = LevelState::Armed(side.flip());
        }
    }

    /// Read-only ordered view of all level states.
    pub fn snapshot(&self) -> &[GridLevel] {
        &self.levels
    }

    pub fn armed_count(&self) -> usize {
        self.levels.iter().filter(|l| l.is_armed()).count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.levels.iter().filter(|l| l.is_cancelled()).count()
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn center_price(&self) -> f64 {
        self.center_price
    }

    pub fn order_size(&self) -> f64 {
        self.order_size
    }
}
