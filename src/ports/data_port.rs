//! Data access port trait.

use crate::domain::error::GridtraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` in ascending date order, optionally windowed.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GridtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, GridtraderError>;

    /// First date, last date and bar count for `symbol`, or None when no
    /// data exists.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GridtraderError>;
}
