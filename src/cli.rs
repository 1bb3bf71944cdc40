//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_data_config, validate_grid_config,
};
use crate::domain::error::GridtraderError;
use crate::domain::fill::FillEvent;
use crate::domain::grid::{GridConfig, GridLadder};
use crate::domain::metrics::Metrics;
use crate::domain::tracker::EquityPoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "gridtrader", about = "Grid trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export every fill to a CSV file
        #[arg(long)]
        fills_csv: Option<PathBuf>,
        /// Export the equity curve to a CSV file
        #[arg(long)]
        equity_csv: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            fills_csv,
            equity_csv,
            symbol,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest_command(
                    &config,
                    output.as_ref(),
                    fills_csv.as_ref(),
                    equity_csv.as_ref(),
                    symbol.as_deref(),
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = GridtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), GridtraderError> {
    validate_backtest_config(adapter)?;
    validate_grid_config(adapter)?;
    validate_data_config(adapter)?;
    Ok(())
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
) -> Result<BacktestConfig, GridtraderError> {
    let center_price = match adapter.get_string("grid", "center_price") {
        Some(_) => Some(adapter.get_float("grid", "center_price", 0.0)),
        None => None,
    };

    Ok(BacktestConfig {
        initial_capital: adapter.get_float("backtest", "initial_capital", 100_000.0),
        center_price,
        step: adapter.get_float("grid", "step", 0.0),
        level_count: adapter.get_int("grid", "level_count", 0) as usize,
        order_size: adapter.get_float("grid", "order_size", 0.0),
        allow_margin: adapter.get_bool("backtest", "allow_margin", false),
        commission_per_fill: adapter.get_float("backtest", "commission_per_fill", 0.0),
        commission_pct: adapter.get_float("backtest", "commission_pct", 0.0),
        risk_free_rate: adapter.get_float("backtest", "risk_free_rate", 0.05),
        start_date: parse_optional_date(adapter, "start_date")?,
        end_date: parse_optional_date(adapter, "end_date")?,
    })
}

fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    if let Some(s) = symbol_override {
        return Some(s.to_uppercase());
    }
    config
        .get_string("data", "symbol")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

fn run_backtest_command(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    fills_csv: Option<&PathBuf>,
    equity_csv: Option<&PathBuf>,
    symbol_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Build BacktestConfig
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Resolve data source and symbol
    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Some(s) => s,
        None => {
            eprintln!("error: no symbol configured");
            return ExitCode::from(2);
        }
    };
    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .unwrap_or_else(|| ".".to_string());
    let data_port = CsvAdapter::new(PathBuf::from(csv_dir));

    // Stage 4: Fetch bars
    eprintln!("Fetching bars for {}...", symbol);
    let bars = match data_port.fetch_ohlcv(&symbol, bt_config.start_date, bt_config.end_date) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} bars loaded", bars.len());

    // Stage 5: Run the grid
    let result = match run_backtest(&bars, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for drop in &result.drops {
        eprintln!(
            "warning: level {} dropped on {} (re-arm target {:.4} out of range)",
            drop.level_index, drop.date, drop.attempted_price
        );
    }

    // Stage 6: Compute metrics and print summary to stderr
    let metrics = Metrics::compute(&result, bt_config.risk_free_rate);

    eprintln!("\n=== Results for {} ===", symbol);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Fills:            {} ({} buys / {} sells)", metrics.total_fills, metrics.buy_fills, metrics.sell_fills);
    eprintln!("Round Trips:      {}", metrics.round_trips);
    eprintln!("Realized PnL:     {:.2}", metrics.realized_pnl);
    if metrics.dropped_levels > 0 {
        eprintln!("Dropped Levels:   {}", metrics.dropped_levels);
    }
    if metrics.rejected_fills > 0 {
        eprintln!("Rejected Fills:   {}", metrics.rejected_fills);
    }

    // Stage 7: Optional CSV exports
    if let Some(path) = fills_csv {
        if let Err(e) = write_fills_csv(path, &result.tracker.fills) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Fills written to: {}", path.display());
    }
    if let Some(path) = equity_csv {
        if let Err(e) = write_equity_csv(path, &result.tracker.equity_curve) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Equity curve written to: {}", path.display());
    }

    // Stage 8: Write the report
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("report.txt"));
    let report_port = TextReportAdapter::new();
    match report_port.write(&result, &metrics, &bt_config, &output.display().to_string()) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

pub fn write_fills_csv(path: &PathBuf, fills: &[FillEvent]) -> Result<(), GridtraderError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| GridtraderError::Data {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;
    writer
        .write_record(["date", "side", "level_index", "price", "quantity"])
        .map_err(csv_error)?;
    for fill in fills {
        writer
            .write_record([
                fill.date.to_string(),
                fill.side.to_string(),
                fill.level_index.to_string(),
                format!("{:.4}", fill.price),
                format!("{:.4}", fill.quantity),
            ])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_equity_csv(path: &PathBuf, curve: &[EquityPoint]) -> Result<(), GridtraderError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| GridtraderError::Data {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;
    writer.write_record(["date", "equity"]).map_err(csv_error)?;
    for point in curve {
        writer
            .write_record([point.date.to_string(), format!("{:.2}", point.equity)])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> GridtraderError {
    GridtraderError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Config validated successfully");

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // A ladder can only be previewed with an explicit center; otherwise it
    // is derived from data at run time.
    match bt_config.center_price {
        Some(center) => {
            let grid_config = GridConfig {
                center_price: center,
                step: bt_config.step,
                level_count: bt_config.level_count,
                order_size: bt_config.order_size,
            };
            match GridLadder::new(&grid_config) {
                Ok(ladder) => {
                    eprintln!("\nGrid ladder:");
                    for level in ladder.snapshot() {
                        eprintln!("  level {:>3}: {:.4} {:?}", level.index, level.price, level.state);
                    }
                    eprintln!(
                        "  bounds: [{:.4}, {:.4}]",
                        ladder.lower_bound(),
                        ladder.upper_bound()
                    );
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
        None => {
            eprintln!("\ncenter_price not set; it will default to the first bar's close");
        }
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_all(&adapter) {
        Ok(()) => {
            eprintln!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let csv_dir = match config.get_string("data", "csv_dir") {
        Some(d) => d,
        None => {
            eprintln!("error: [data] csv_dir is required for list-symbols");
            return ExitCode::from(2);
        }
    };

    let adapter = CsvAdapter::new(PathBuf::from(csv_dir));
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &config) {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required (use --symbol or set in config)");
            return ExitCode::from(2);
        }
    };

    let csv_dir = match config.get_string("data", "csv_dir") {
        Some(d) => d,
        None => {
            eprintln!("error: [data] csv_dir is required for info");
            return ExitCode::from(2);
        }
    };

    let adapter = CsvAdapter::new(PathBuf::from(csv_dir));
    match adapter.get_data_range(&symbol) {
        Ok(Some((min_date, max_date, count))) => {
            println!("{}: {} bars, {} to {}", symbol, count, min_date, max_date);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", symbol);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error querying {}: {}", symbol, e);
            (&e).into()
        }
    }
}
