//! Price candle representation.

use chrono::{DateTime, Utc};

/// One time-bucketed price observation for an instrument.
///
/// The simulator only ever trades on `open`; high/low/close travel along for
/// reporting and for building reference aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub instrument: String,
    pub ts: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}
