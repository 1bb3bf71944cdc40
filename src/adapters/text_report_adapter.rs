//! Plain-text report adapter implementing ReportPort.

use std::fmt::Write as _;
use std::fs;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::GridtraderError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn render(result: &BacktestResult, metrics: &Metrics, config: &BacktestConfig) -> String {
        let mut out = String::new();
        let tracker = &result.tracker;

        let _ = writeln!(out, "gridtrader backtest report");
        let _ = writeln!(out, "==========================");
        let _ = writeln!(out);

        let _ = writeln!(out, "[grid]");
        let _ = writeln!(out, "center_price     = {:.4}", result.ladder.center_price());
        let _ = writeln!(out, "step             = {:.4}", config.step);
        let _ = writeln!(out, "level_count      = {}", config.level_count);
        let _ = writeln!(out, "order_size       = {:.4}", config.order_size);
        let _ = writeln!(
            out,
            "bounds           = [{:.4}, {:.4}]",
            result.ladder.lower_bound(),
            result.ladder.upper_bound()
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "[performance]");
        let _ = writeln!(out, "initial_capital  = {:.2}", tracker.initial_cash);
        let _ = writeln!(out, "final_equity     = {:.2}", metrics.final_equity);
        let _ = writeln!(out, "total_return     = {:.2}%", metrics.total_return * 100.0);
        let _ = writeln!(
            out,
            "annualized       = {:.2}%",
            metrics.annualized_return * 100.0
        );
        let _ = writeln!(out, "sharpe_ratio     = {:.3}", metrics.sharpe_ratio);
        let _ = writeln!(out, "sortino_ratio    = {:.3}", metrics.sortino_ratio);
        let _ = writeln!(out, "max_drawdown     = {:.2}%", metrics.max_drawdown * 100.0);
        let _ = writeln!(out, "drawdown_days    = {}", metrics.max_drawdown_duration);
        let _ = writeln!(out);

        let _ = writeln!(out, "[activity]");
        let _ = writeln!(out, "total_fills      = {}", metrics.total_fills);
        let _ = writeln!(out, "buy_fills        = {}", metrics.buy_fills);
        let _ = writeln!(out, "sell_fills       = {}", metrics.sell_fills);
        let _ = writeln!(out, "round_trips      = {}", metrics.round_trips);
        let _ = writeln!(out, "realized_pnl     = {:.2}", metrics.realized_pnl);
        let _ = writeln!(out, "dropped_levels   = {}", metrics.dropped_levels);
        let _ = writeln!(out, "rejected_fills   = {}", metrics.rejected_fills);
        let _ = writeln!(out);

        let _ = writeln!(out, "[final state]");
        let _ = writeln!(out, "cash             = {:.2}", tracker.cash);
        let _ = writeln!(out, "holdings         = {:.4}", tracker.holdings);
        let _ = writeln!(out, "armed_levels     = {}", result.ladder.armed_count());
        let _ = writeln!(out, "cancelled_levels = {}", result.ladder.cancelled_count());

        if !result.drops.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[dropped levels]");
            for drop in &result.drops {
                let _ = writeln!(
                    out,
                    "{} level {} at {:.4}",
                    drop.date, drop.level_index, drop.attempted_price
                );
            }
        }

        out
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), GridtraderError> {
        let report = Self::render(result, metrics, config);
        fs::write(output_path, report)?;
        Ok(())
    }
}
