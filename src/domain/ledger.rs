//! The position ledger: open tranches, closed history, deposits, balance.
//!
//! The ledger owns all mutation of capital state. One ledger per simulation
//! run; nothing here is shared or static.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::deposit::Deposit;
use super::error::LaddersimError;
use super::position::{ClosedPosition, Position};

#[derive(Debug, Clone)]
pub struct Ledger {
    balance: f64,
    initial_balance: f64,
    positions: HashMap<String, Vec<Position>>,
    history: Vec<ClosedPosition>,
    deposits: Vec<Deposit>,
}

impl Ledger {
    pub fn new(initial_balance: f64) -> Self {
        Ledger {
            balance: initial_balance,
            initial_balance,
            positions: HashMap::new(),
            history: Vec::new(),
            deposits: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn positions_for(&self, instrument: &str) -> &[Position] {
        self.positions
            .get(instrument)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    pub fn history(&self) -> &[ClosedPosition] {
        &self.history
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    /// Sum of values of all open positions across all instruments.
    pub fn invested(&self) -> f64 {
        self.positions
            .values()
            .flat_map(|list| list.iter())
            .map(|p| p.value)
            .sum()
    }

    /// Sum of open-position values for one instrument.
    pub fn invested_in(&self, instrument: &str) -> f64 {
        self.positions_for(instrument).iter().map(|p| p.value).sum()
    }

    /// Number of instruments with at least one open position.
    pub fn active_instruments(&self) -> usize {
        self.positions.values().filter(|list| !list.is_empty()).count()
    }

    /// Instruments with at least one open position, sorted for stable output.
    pub fn open_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .positions
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(instrument, list)| (instrument.clone(), list.len()))
            .collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));
        counts
    }

    /// Append a new tranche, deducting its value from the balance.
    ///
    /// A non-positive value is a logic error, fatal to the run.
    pub fn open_position(&mut self, position: Position) -> Result<(), LaddersimError> {
        if position.value <= 0.0 {
            return Err(LaddersimError::InvalidPositionValue {
                value: position.value,
            });
        }
        self.balance -= position.value;
        self.positions
            .entry(position.instrument.clone())
            .or_default()
            .push(position);
        Ok(())
    }

    /// Close the cheapest open tranche for `instrument` at `close_price`.
    ///
    /// Always the minimum entry price, earliest-opened on ties; never more
    /// than one per call. Credits the balance with the tranche value plus
    /// realized profit.
    pub fn close_position(
        &mut self,
        instrument: &str,
        close_price: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<ClosedPosition, LaddersimError> {
        let list = self
            .positions
            .get_mut(instrument)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| LaddersimError::NoOpenPosition {
                instrument: instrument.to_string(),
            })?;

        let mut min_idx = 0;
        for (i, position) in list.iter().enumerate() {
            if position.entry_price < list[min_idx].entry_price {
                min_idx = i;
            }
        }
        let position = list.remove(min_idx);

        let closed = ClosedPosition {
            position,
            close_price,
            closed_at,
        };
        self.balance += closed.position.value;
        self.balance += closed.realized_profit();
        self.history.push(closed.clone());
        Ok(closed)
    }

    /// Record a capital injection, crediting the balance.
    pub fn record_deposit(&mut self, deposit: Deposit) {
        self.balance += deposit.amount;
        self.deposits.push(deposit);
    }
}
