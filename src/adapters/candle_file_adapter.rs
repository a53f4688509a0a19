//! CSV candle file adapter.
//!
//! Candle files live in one directory as `<INSTRUMENT>.csv` or
//! `<INSTRUMENT>-<anything>.csv`; everything up to the first `-` of the file
//! stem names the instrument, so yearly exports concatenate naturally.
//! Rows are `ts,open,high,low,close` with RFC 3339-style timestamps.

use crate::domain::candle::Candle;
use crate::domain::error::LaddersimError;
use crate::ports::candle_port::CandlePort;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CandleFileAdapter {
    base_path: PathBuf,
}

impl CandleFileAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn instrument_of(file_name: &str) -> Option<&str> {
        let stem = file_name.strip_suffix(".csv")?;
        Some(stem.split('-').next().unwrap_or(stem))
    }

    fn files_for(&self, instrument: &str) -> Result<Vec<PathBuf>, LaddersimError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if Self::instrument_of(&name_str) == Some(instrument) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn parse_file(
        &self,
        path: &PathBuf,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        out: &mut Vec<Candle>,
    ) -> Result<(), LaddersimError> {
        let content = fs::read_to_string(path).map_err(|e| LaddersimError::CandleData {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        for result in rdr.records() {
            let record = result.map_err(|e| LaddersimError::CandleData {
                reason: format!("CSV parse error in {}: {e}", path.display()),
            })?;

            let ts_str = record.get(0).ok_or_else(|| LaddersimError::CandleData {
                reason: "missing ts column".into(),
            })?;
            let ts = NaiveDateTime::parse_from_str(ts_str, "%Y-%m-%dT%H:%M:%S")
                .map_err(|e| LaddersimError::CandleData {
                    reason: format!("invalid timestamp '{ts_str}': {e}"),
                })?
                .and_utc();

            if ts < start || ts > end {
                continue;
            }

            let field = |idx: usize, name: &str| -> Result<f64, LaddersimError> {
                record
                    .get(idx)
                    .ok_or_else(|| LaddersimError::CandleData {
                        reason: format!("missing {name} column"),
                    })?
                    .parse()
                    .map_err(|e| LaddersimError::CandleData {
                        reason: format!("invalid {name} value: {e}"),
                    })
            };

            out.push(Candle {
                instrument: instrument.to_string(),
                ts,
                open: field(1, "open")?,
                high: field(2, "high")?,
                low: field(3, "low")?,
                close: field(4, "close")?,
            });
        }
        Ok(())
    }
}

impl CandlePort for CandleFileAdapter {
    fn fetch_candles(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, LaddersimError> {
        let paths = self.files_for(instrument)?;
        if paths.is_empty() {
            return Err(LaddersimError::NoData {
                instrument: instrument.to_string(),
            });
        }
        let mut candles = Vec::new();
        for path in &paths {
            self.parse_file(path, instrument, start, end, &mut candles)?;
        }
        Ok(candles)
    }

    fn list_instruments(&self) -> Result<Vec<String>, LaddersimError> {
        let mut instruments = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(instrument) = Self::instrument_of(&name_str) {
                instruments.push(instrument.to_string());
            }
        }
        instruments.sort();
        instruments.dedup();
        Ok(instruments)
    }
}
