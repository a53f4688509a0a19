//! Simulation engine and event loop.
//!
//! Single-threaded and deterministic: timeline steps strictly increase, and
//! within a step instruments are handled in the order their series were
//! supplied. A missing candle for an instrument at a step means no decision
//! for that instrument.

use chrono::{DateTime, Utc};

use super::allocation::{AllocationOutcome, AllocationPolicy};
use super::candle::Candle;
use super::deposit::DepositScheduler;
use super::error::LaddersimError;
use super::ledger::Ledger;
use super::rule::{OpenReason, RuleSet, Signal};
use super::series::CandleSeries;
use crate::ports::diagnostics_port::DiagnosticsPort;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub initial_balance: f64,
    /// Open a replacement tranche right after every close. Bounded: at most
    /// one extra open per close, and that open never re-evaluates rules.
    pub reopen_immediately: bool,
}

#[derive(Debug)]
pub struct SimulationResult {
    pub ledger: Ledger,
    pub opened: usize,
    pub closed: usize,
    pub rejected: usize,
}

pub fn run_simulation(
    series: &[CandleSeries],
    timeline: &[DateTime<Utc>],
    rules: &RuleSet,
    policy: &AllocationPolicy,
    scheduler: &DepositScheduler,
    config: &SimulationConfig,
    diagnostics: &dyn DiagnosticsPort,
) -> Result<SimulationResult, LaddersimError> {
    let mut ledger = Ledger::new(config.initial_balance);
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut rejected = 0usize;

    let steps = timeline
        .iter()
        .copied()
        .filter(|ts| *ts >= config.start && *ts <= config.end);

    for ts in steps {
        if scheduler.deposit_if_due(&mut ledger, ts) {
            diagnostics.note(&format!("deposit recorded at {ts}"));
        }

        for s in series {
            let Some(candle) = s.get_candle(ts) else {
                continue;
            };

            match rules.evaluate(ledger.positions_for(&s.instrument), candle) {
                Signal::Open(reason) => {
                    if try_open(&mut ledger, policy, candle, reason, diagnostics)? {
                        opened += 1;
                    } else {
                        rejected += 1;
                    }
                }
                Signal::Close(reason) => {
                    let done =
                        ledger.close_position(&candle.instrument, candle.open, ts)?;
                    closed += 1;
                    diagnostics.note(&format!(
                        "closed position for {} because {reason} (entry {}, close {})",
                        candle.instrument, done.position.entry_price, done.close_price
                    ));
                    if config.reopen_immediately {
                        if try_open(
                            &mut ledger,
                            policy,
                            candle,
                            OpenReason::ImmediateReopen,
                            diagnostics,
                        )? {
                            opened += 1;
                        } else {
                            rejected += 1;
                        }
                    }
                }
                Signal::Hold => {}
            }
        }
    }

    Ok(SimulationResult {
        ledger,
        opened,
        closed,
        rejected,
    })
}

fn try_open(
    ledger: &mut Ledger,
    policy: &AllocationPolicy,
    candle: &Candle,
    reason: OpenReason,
    diagnostics: &dyn DiagnosticsPort,
) -> Result<bool, LaddersimError> {
    match policy.size_open(ledger, &candle.instrument, candle.open, reason, candle.ts) {
        AllocationOutcome::Open(position) => {
            diagnostics.note(&format!(
                "opening position for {} because {reason} (price {}, value {})",
                candle.instrument, position.entry_price, position.value
            ));
            ledger.open_position(position)?;
            Ok(true)
        }
        AllocationOutcome::Skip(skip) => {
            diagnostics.note(&format!(
                "skipping open for {}: {skip}",
                candle.instrument
            ));
            Ok(false)
        }
    }
}
