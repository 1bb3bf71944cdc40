//! Configuration validation.
//!
//! All config fields are checked before a backtest runs, so bad input fails
//! fast instead of partway through a bar loop.

use crate::domain::error::GridtraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    validate_initial_capital(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_grid_config(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    validate_center_price(config)?;
    validate_step(config)?;
    validate_level_count(config)?;
    validate_order_size(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    validate_csv_dir(config)?;
    validate_symbol(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let value = config.get_float("backtest", "initial_capital", 0.0);
    if value <= 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let per_fill = config.get_float("backtest", "commission_per_fill", 0.0);
    if per_fill < 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_per_fill".to_string(),
            reason: "commission_per_fill must be non-negative".to_string(),
        });
    }
    let pct = config.get_float("backtest", "commission_pct", 0.0);
    if pct < 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_pct".to_string(),
            reason: "commission_pct must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let value = config.get_float("backtest", "risk_free_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(GridtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

/// Both window dates are optional; an absent date leaves that end of the
/// window open.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, GridtraderError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
            GridtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_center_price(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    // Optional; when absent the first bar's close is used.
    if config.get_string("grid", "center_price").is_none() {
        return Ok(());
    }
    let value = config.get_float("grid", "center_price", 0.0);
    if value <= 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "grid".to_string(),
            key: "center_price".to_string(),
            reason: "center_price must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_step(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let value = config.get_float("grid", "step", 0.0);
    if value <= 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "grid".to_string(),
            key: "step".to_string(),
            reason: "step must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_level_count(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let value = config.get_int("grid", "level_count", 0);
    if value < 1 {
        return Err(GridtraderError::ConfigInvalid {
            section: "grid".to_string(),
            key: "level_count".to_string(),
            reason: "level_count must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_order_size(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    let value = config.get_float("grid", "order_size", 0.0);
    if value <= 0.0 {
        return Err(GridtraderError::ConfigInvalid {
            section: "grid".to_string(),
            key: "order_size".to_string(),
            reason: "order_size must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_csv_dir(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    match config.get_string("data", "csv_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(GridtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        }),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), GridtraderError> {
    match config.get_string("data", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(GridtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        }),
    }
}
