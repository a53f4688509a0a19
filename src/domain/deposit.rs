//! Recurring capital deposits.

use chrono::{DateTime, Duration, Utc};

use super::ledger::Ledger;

/// One capital injection. Append-only log entry owned by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    pub at: DateTime<Utc>,
    pub amount: f64,
}

/// Decides when a recurring deposit is due and records it.
#[derive(Debug, Clone)]
pub struct DepositScheduler {
    amount: f64,
    interval: Duration,
}

impl DepositScheduler {
    pub fn new(amount: f64, interval_days: i64) -> Self {
        Self {
            amount,
            interval: Duration::days(interval_days),
        }
    }

    /// Record a deposit if none exists yet, or if the most recent one
    /// (by timestamp, not log order) is older than the interval.
    pub fn deposit_if_due(&self, ledger: &mut Ledger, at: DateTime<Utc>) -> bool {
        let last = ledger.deposits().iter().map(|d| d.at).max();
        let due = match last {
            None => true,
            Some(last) => last + self.interval < at,
        };
        if due {
            ledger.record_deposit(Deposit {
                at,
                amount: self.amount,
            });
        }
        due
    }
}
