//! Derived profit views over the ledger.
//!
//! All views are recomputed on demand so they always reflect the latest
//! ledger state; nothing here is cached.

use super::ledger::Ledger;

/// Snapshot of the capital accounts, taken for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitSummary {
    pub deposited: f64,
    pub invested: f64,
    pub balance: f64,
    pub profit: f64,
    /// `None` when nothing has been deposited yet.
    pub profit_pct: Option<f64>,
    pub open_counts: Vec<(String, usize)>,
}

pub fn deposited(ledger: &Ledger) -> f64 {
    ledger.deposits().iter().map(|d| d.amount).sum()
}

pub fn profit(ledger: &Ledger) -> f64 {
    ledger.history().iter().map(|c| c.realized_profit()).sum()
}

pub fn profit_pct(ledger: &Ledger) -> Option<f64> {
    let total = deposited(ledger);
    if total == 0.0 {
        None
    } else {
        Some(profit(ledger) / total * 100.0)
    }
}

pub fn summarize(ledger: &Ledger) -> ProfitSummary {
    ProfitSummary {
        deposited: deposited(ledger),
        invested: ledger.invested(),
        balance: ledger.balance(),
        profit: profit(ledger),
        profit_pct: profit_pct(ledger),
        open_counts: ledger.open_counts(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deposit::Deposit;
    use crate::domain::position::Position;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    fn funded_ledger() -> Ledger {
        let mut ledger = Ledger::new(0.0);
        ledger.record_deposit(Deposit {
            at: at(1),
            amount: 1000.0,
        });
        ledger
    }

    #[test]
    fn deposited_sums_all_deposits() {
        let mut ledger = funded_ledger();
        ledger.record_deposit(Deposit {
            at: at(15),
            amount: 500.0,
        });
        assert_relative_eq!(deposited(&ledger), 1500.0);
    }

    #[test]
    fn profit_sums_closed_positions() {
        let mut ledger = funded_ledger();
        ledger
            .open_position(Position {
                instrument: "TSLA".into(),
                entry_price: 100.0,
                value: 500.0,
                opened_at: at(2),
            })
            .unwrap();
        ledger.close_position("TSLA", 130.0, at(10)).unwrap();
        // 130/100 * 500 - 500 = 150
        assert_relative_eq!(profit(&ledger), 150.0);
        assert_relative_eq!(profit_pct(&ledger).unwrap(), 15.0);
    }

    #[test]
    fn profit_pct_unavailable_without_deposits() {
        let ledger = Ledger::new(1000.0);
        assert_eq!(profit_pct(&ledger), None);
        assert_eq!(summarize(&ledger).profit_pct, None);
    }

    #[test]
    fn summary_reflects_latest_state() {
        let mut ledger = funded_ledger();
        ledger
            .open_position(Position {
                instrument: "TSLA".into(),
                entry_price: 100.0,
                value: 400.0,
                opened_at: at(2),
            })
            .unwrap();

        let summary = summarize(&ledger);
        assert_relative_eq!(summary.deposited, 1000.0);
        assert_relative_eq!(summary.invested, 400.0);
        assert_relative_eq!(summary.balance, 600.0);
        assert_relative_eq!(summary.profit, 0.0);
        assert_eq!(summary.open_counts, vec![("TSLA".to_string(), 1)]);

        ledger.close_position("TSLA", 110.0, at(10)).unwrap();
        let summary = summarize(&ledger);
        assert_relative_eq!(summary.invested, 0.0);
        assert_relative_eq!(summary.profit, 40.0);
        assert!(summary.open_counts.is_empty());
    }
}
