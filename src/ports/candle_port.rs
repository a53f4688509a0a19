//! Candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::LaddersimError;
use chrono::{DateTime, Utc};

/// A finite, restartable source of candles per instrument. The source is
/// expected to hand back records that may repeat timestamps across files;
/// deduplication happens in the series layer.
pub trait CandlePort {
    fn fetch_candles(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, LaddersimError>;

    fn list_instruments(&self) -> Result<Vec<String>, LaddersimError>;
}
