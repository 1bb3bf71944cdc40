//! Fill events and order sides shared between the grid engine and the tracker.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A simulated limit fill at a grid level. Immutable once created; the
/// tracker appends each one to its fill log.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub level_index: usize,
    pub price: f64,
    pub quantity: f64,
    pub date: NaiveDate,
    pub side: Side,
}

impl FillEvent {
    /// price * quantity, before commission.
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }
}
