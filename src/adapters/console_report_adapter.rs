//! Console report adapter.

use crate::domain::accounting::{summarize, ProfitSummary};
use crate::domain::error::LaddersimError;
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

pub struct ConsoleReportAdapter;

impl ConsoleReportAdapter {
    pub fn render(summary: &ProfitSummary) -> String {
        let mut out = String::new();
        out.push_str("==========\n");
        for (instrument, count) in &summary.open_counts {
            out.push_str(&format!("Number of opened for {instrument}: {count}\n"));
        }
        out.push_str(&format!("Deposited: {:.0}$\n", summary.deposited));
        out.push_str(&format!("Currently invested: {:.0}$\n", summary.invested));
        out.push_str(&format!("Balance: {:.0}$\n", summary.balance));
        match summary.profit_pct {
            Some(pct) => out.push_str(&format!(
                "Profit: {:.0}$ ({:.0}%)\n",
                summary.profit, pct
            )),
            None => out.push_str(&format!("Profit: {:.0}$ (n/a)\n", summary.profit)),
        }
        out.push_str("==========");
        out
    }
}

impl ReportPort for ConsoleReportAdapter {
    fn write(&self, result: &SimulationResult) -> Result<(), LaddersimError> {
        println!("{}", Self::render(&summarize(&result.ledger)));
        println!(
            "opened: {}, closed: {}, rejected: {}",
            result.opened, result.closed, result.rejected
        );
        Ok(())
    }
}
