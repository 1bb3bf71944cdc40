//! CSV file data adapter.
//!
//! Reads one `{SYMBOL}.csv` per symbol with a `date,open,high,low,close,volume`
//! header, and serves bars in ascending date order.

use crate::domain::error::GridtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, GridtraderError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(GridtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| GridtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| GridtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| GridtraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                    GridtraderError::Data {
                        reason: format!("invalid date format: {}", e),
                    }
                })?;

            let bar = OhlcvBar {
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: record
                    .get(5)
                    .ok_or_else(|| GridtraderError::Data {
                        reason: "missing volume column".into(),
                    })?
                    .parse()
                    .map_err(|e| GridtraderError::Data {
                        reason: format!("invalid volume value: {}", e),
                    })?,
            };

            if !bar.is_coherent() {
                return Err(GridtraderError::Data {
                    reason: format!("incoherent OHLC values on {}", bar.date),
                });
            }

            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, GridtraderError> {
    record
        .get(index)
        .ok_or_else(|| GridtraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| GridtraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GridtraderError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|bar| {
                start_date.is_none_or(|start| bar.date >= start)
                    && end_date.is_none_or(|end| bar.date <= end)
            })
            .collect();
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, GridtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| GridtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GridtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GridtraderError> {
        let bars = self.read_all(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
