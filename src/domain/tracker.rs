//! Cash, position and PnL accounting for grid fills.
//!
//! The tracker keeps a signed position with an average cost basis. Realized
//! PnL is booked whenever a fill reduces the open position; commissions are
//! charged to cash and to realized PnL at fill time, so at any mark the
//! identity `cash + holdings * close == initial_cash + realized + unrealized`
//! holds exactly.
//!
//! Applying the same fill twice double-counts it. Replay protection belongs
//! to the caller; the backtest driver applies each fill exactly once.

use chrono::NaiveDate;

use super::error::GridtraderError;
use super::fill::{FillEvent, Side};

/// One point on the equity curve, recorded at each bar close.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Commission model: a flat amount per fill plus a fraction of notional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeSchedule {
    pub per_fill: f64,
    pub pct: f64,
}

impl FeeSchedule {
    pub fn commission(&self, notional: f64) -> f64 {
        self.per_fill + self.pct * notional
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionTracker {
    pub cash: f64,
    pub initial_cash: f64,
    /// Signed quantity held; negative when short.
    pub holdings: f64,
    /// Average cost basis of the open position. Zero when flat.
    pub avg_cost: f64,
    pub realized: f64,
    pub allow_margin: bool,
    pub fees: FeeSchedule,
    pub fills: Vec<FillEvent>,
    pub equity_curve: Vec<EquityPoint>,
}

impl PositionTracker {
    pub fn new(initial_capital: f64, allow_margin: bool, fees: FeeSchedule) -> Self {
        PositionTracker {
            cash: initial_capital,
            initial_cash: initial_capital,
            holdings: 0.0,
            avg_cost: 0.0,
            realized: 0.0,
            allow_margin,
            fees,
            fills: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Apply one fill. A buy whose cost (including commission) exceeds
    /// available cash is rejected without touching any state, unless margin
    /// is allowed.
    pub fn apply_fill(&mut self, fill: &FillEvent) -> Result<(), GridtraderError> {
        let notional = fill.notional();
        let commission = self.fees.commission(notional);

        match fill.side {
            Side::Buy => {
                let required = notional + commission;
                if required > self.cash && !self.allow_margin {
                    return Err(GridtraderError::InsufficientCash {
                        required,
                        available: self.cash,
                    });
                }
                self.cash -= required;
            }
            Side::Sell => {
                self.cash += notional - commission;
            }
        }
        self.realized -= commission;

        let signed_qty = match fill.side {
            Side::Buy => fill.quantity,
            Side::Sell => -fill.quantity,
        };
        let new_holdings = self.holdings + signed_qty;

        if self.holdings == 0.0 {
            self.avg_cost = fill.price;
        } else if (self.holdings > 0.0) == (signed_qty > 0.0) {
            // Same direction: extend the position at a blended basis.
            self.avg_cost =
                (self.avg_cost * self.holdings.abs() + notional) / new_holdings.abs();
        } else {
            let closed = fill.quantity.min(self.holdings.abs());
            let direction = if self.holdings > 0.0 { 1.0 } else { -1.0 };
            self.realized += closed * (fill.price - self.avg_cost) * direction;
            if new_holdings == 0.0 {
                self.avg_cost = 0.0;
            } else if (new_holdings > 0.0) != (self.holdings > 0.0) {
                // Crossed through flat: the residual opens at the fill price.
                self.avg_cost = fill.price;
            }
        }

        self.holdings = new_holdings;
        self.fills.push(fill.clone());
        Ok(())
    }

    /// Record the equity at a bar close and return it.
    pub fn mark_to_market(&mut self, date: NaiveDate, close: f64) -> f64 {
        let equity = self.equity(close);
        self.equity_curve.push(EquityPoint { date, equity });
        equity
    }

    pub fn equity(&self, close: f64) -> f64 {
        self.cash + self.holdings * close
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized
    }

    pub fn unrealized_pnl(&self, close: f64) -> f64 {
        self.holdings * (close - self.avg_cost)
    }
}
