//! Performance metrics over a completed backtest.

use chrono::NaiveDate;

use super::backtest::BacktestResult;
use super::fill::Side;
use super::tracker::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub total_fills: usize,
    pub buy_fills: usize,
    pub sell_fills: usize,
    /// Completed buy/sell pairs; each one banks roughly one step of spread.
    pub round_trips: usize,
    pub realized_pnl: f64,
    pub dropped_levels: usize,
    pub rejected_fills: usize,
    pub final_equity: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, risk_free_rate: f64) -> Self {
        let equity_curve = &result.tracker.equity_curve;
        let initial_capital = result.tracker.initial_cash;

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let trading_days = equity_curve.len() as f64;
        let years = trading_days / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(equity_curve, daily_rf);

        let buy_fills = result
            .tracker
            .fills
            .iter()
            .filter(|f| f.side == Side::Buy)
            .count();
        let total_fills = result.tracker.fills.len();
        let sell_fills = total_fills - buy_fills;

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            total_fills,
            buy_fills,
            sell_fills,
            round_trips: buy_fills.min(sell_fills),
            realized_pnl: result.tracker.realized_pnl(),
            dropped_levels: result.drops.len(),
            rejected_fills: result.rejected.len(),
            final_equity,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    if equity_curve.is_empty() {
        return (0.0, 0);
    }

    let mut peak = equity_curve[0].equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut dd_start: Option<NaiveDate> = None;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
            dd_start = None;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            if dd_start.is_none() {
                dd_start = Some(point.date);
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_risk_adjusted(equity_curve: &[EquityPoint], daily_rf: f64) -> (f64, f64) {
    if equity_curve.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;

    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let excess_return = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_returns: Vec<f64> = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .collect();

    let downside_stddev = if !downside_returns.is_empty() {
        let ds_variance: f64 = downside_returns.iter().sum::<f64>() / n;
        ds_variance.sqrt()
    } else {
        0.0
    };

    let sortino = if downside_stddev > 0.0 {
        (excess_return / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
