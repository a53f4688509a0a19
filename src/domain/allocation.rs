//! Allocation policy: sizing a new tranche from deployable capital.
//!
//! Deployable capital is split evenly across the instruments that currently
//! have at least one open position. Momentum-driven adds ("above portfolio")
//! are sized smaller than dip-buys and first entries.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::ledger::Ledger;
use super::position::Position;
use super::rule::OpenReason;

/// Minimum tranche value per instrument: a default plus overrides.
#[derive(Debug, Clone)]
pub struct MinPositionSize {
    default: f64,
    overrides: HashMap<String, f64>,
}

impl MinPositionSize {
    pub const DEFAULT: f64 = 50.0;

    pub fn new(default: f64) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, instrument: &str, minimum: f64) -> Self {
        self.overrides.insert(instrument.to_uppercase(), minimum);
        self
    }

    pub fn for_instrument(&self, instrument: &str) -> f64 {
        self.overrides
            .get(&instrument.to_uppercase())
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for MinPositionSize {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

/// Outcome of a sizing attempt. Skips are expected, non-fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    Open(Position),
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Overinvested,
    InsufficientBalance,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::Overinvested => "already overinvested",
            SkipReason::InsufficientBalance => "insufficient balance",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct AllocationPolicy {
    min_sizes: MinPositionSize,
}

impl AllocationPolicy {
    pub fn new(min_sizes: MinPositionSize) -> Self {
        Self { min_sizes }
    }

    pub fn min_sizes(&self) -> &MinPositionSize {
        &self.min_sizes
    }

    /// Size a new tranche for `instrument` at `price`.
    ///
    /// The allowed amount is an even split of deployable capital across
    /// currently active instruments; the headroom is what this instrument
    /// has left of its share. Momentum adds commit a fifth of the headroom,
    /// everything else commits half, both falling back to the full headroom
    /// when the fraction would dip below the instrument's minimum.
    pub fn size_open(
        &self,
        ledger: &Ledger,
        instrument: &str,
        price: f64,
        reason: OpenReason,
        at: DateTime<Utc>,
    ) -> AllocationOutcome {
        let already_invested = ledger.invested_in(instrument);
        let active = ledger.active_instruments().max(1);
        let allowed_amount = (ledger.invested() + ledger.balance()) / active as f64;
        let minimum = self.min_sizes.for_instrument(instrument);
        let headroom = allowed_amount - already_invested;

        if allowed_amount < already_invested || headroom < minimum {
            return AllocationOutcome::Skip(SkipReason::Overinvested);
        }

        let value = match reason {
            OpenReason::AbovePortfolio => {
                if headroom / 5.0 > minimum {
                    headroom / 5.0
                } else {
                    headroom
                }
            }
            _ => {
                if headroom / 2.0 > minimum {
                    headroom / 2.0
                } else {
                    headroom
                }
            }
        };

        // Never overdraw the balance on an open; skip instead.
        if value > ledger.balance() {
            return AllocationOutcome::Skip(SkipReason::InsufficientBalance);
        }

        AllocationOutcome::Open(Position {
            instrument: instrument.to_string(),
            entry_price: price,
            value,
            opened_at: at,
        })
    }
}
