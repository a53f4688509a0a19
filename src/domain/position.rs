//! Position tranches and their closed history.

use chrono::{DateTime, Utc};

/// A discrete unit of committed capital for one instrument.
///
/// Created by the allocation policy, owned by the ledger, immutable until
/// the ledger removes it on close.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument: String,
    pub entry_price: f64,
    pub value: f64,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Value of the tranche marked at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        price / self.entry_price * self.value
    }
}

/// A closed tranche. Created exactly once per close; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPosition {
    pub position: Position,
    pub close_price: f64,
    pub closed_at: DateTime<Utc>,
}

impl ClosedPosition {
    /// Realized profit: can be negative even though the close rule itself
    /// never initiates a close below the entry of the cheapest tranche.
    pub fn realized_profit(&self) -> f64 {
        self.close_price / self.position.entry_price * self.position.value
            - self.position.value
    }
}
