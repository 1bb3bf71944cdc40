//! Report generation port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::GridtraderError;
use crate::domain::metrics::Metrics;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), GridtraderError>;
}
