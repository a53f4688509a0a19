//! Per-instrument candle series and unified timeline.
//!
//! Candle files may be concatenated out of order and may repeat timestamps;
//! the series keys on timestamp, keeping the first record seen for each one.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

use super::candle::Candle;

#[derive(Debug, Clone)]
pub struct CandleSeries {
    pub instrument: String,
    pub candles: Vec<Candle>,
    ts_index: HashMap<DateTime<Utc>, usize>,
}

impl CandleSeries {
    pub fn new(instrument: String, raw: Vec<Candle>) -> Self {
        let mut seen: HashMap<DateTime<Utc>, Candle> = HashMap::new();
        for candle in raw {
            seen.entry(candle.ts).or_insert(candle);
        }
        let mut candles: Vec<Candle> = seen.into_values().collect();
        candles.sort_by_key(|c| c.ts);
        let ts_index = candles
            .iter()
            .enumerate()
            .map(|(i, c)| (c.ts, i))
            .collect();
        Self {
            instrument,
            candles,
            ts_index,
        }
    }

    pub fn candle_count(&self) -> usize {
        self.candles.len()
    }

    pub fn get_candle(&self, ts: DateTime<Utc>) -> Option<&Candle> {
        self.ts_index.get(&ts).map(|&i| &self.candles[i])
    }
}

/// Merge every timestamp any series contains into one sorted timeline.
pub fn build_unified_timeline(series: &[CandleSeries]) -> Vec<DateTime<Utc>> {
    let unique: BTreeSet<DateTime<Utc>> = series
        .iter()
        .flat_map(|s| s.candles.iter().map(|c| c.ts))
        .collect();
    unique.into_iter().collect()
}
