//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::candle_file_adapter::CandleFileAdapter;
use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::diagnostics::StderrDiagnostics;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::{AllocationPolicy, MinPositionSize};
use crate::domain::config_validation::{validate_data_config, validate_simulation_config};
use crate::domain::deposit::DepositScheduler;
use crate::domain::error::LaddersimError;
use crate::domain::rule::{parse_rules, RuleSet};
use crate::domain::series::{build_unified_timeline, CandleSeries};
use crate::domain::simulation::{run_simulation, SimulationConfig};
use crate::ports::candle_port::CandlePort;
use crate::ports::config_port::ConfigPort;
use crate::ports::diagnostics_port::DiagnosticsPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "laddersim", about = "Threshold-ladder portfolio simulator and alert engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay candle history through the configured rules
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Restrict the run to one instrument
        #[arg(long)]
        instrument: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate stored triggers against portfolio snapshots
    Alerts {
        #[arg(short, long)]
        config: PathBuf,
        /// Restrict the cycle to one user id
        #[arg(long)]
        user: Option<i64>,
    },
    /// List instruments found in the candle directory
    ListInstruments {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            instrument,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_simulate(&config, instrument.as_deref())
            }
        }
        Command::Alerts { config, user } => run_alerts(&config, user),
        Command::ListInstruments { config } => run_list_instruments(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = LaddersimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn fail(err: &LaddersimError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn build_simulation_config(
    config: &dyn ConfigPort,
) -> Result<SimulationConfig, LaddersimError> {
    let start = parse_config_date(config, "start_date")?;
    let end = parse_config_date(config, "end_date")?;
    Ok(SimulationConfig {
        start: start.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        // Inclusive of the whole end day.
        end: end.and_hms_opt(23, 59, 59).unwrap().and_utc(),
        initial_balance: config.get_float("simulation", "initial_balance", 0.0),
        reopen_immediately: config.get_bool("simulation", "reopen_immediately", false),
    })
}

fn parse_config_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<NaiveDate, LaddersimError> {
    let value =
        config
            .get_string("simulation", key)
            .ok_or_else(|| LaddersimError::ConfigMissing {
                section: "simulation".to_string(),
                key: key.to_string(),
            })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| LaddersimError::ConfigInvalid {
        section: "simulation".to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub fn build_rule_set(config: &dyn ConfigPort) -> Result<RuleSet, LaddersimError> {
    let rules =
        config
            .get_string("simulation", "rules")
            .ok_or_else(|| LaddersimError::ConfigMissing {
                section: "simulation".to_string(),
                key: "rules".to_string(),
            })?;
    parse_rules(&rules)
}

pub fn build_allocation_policy(
    config: &dyn ConfigPort,
) -> Result<AllocationPolicy, LaddersimError> {
    let default = config.get_float("allocation", "min_position_size", MinPositionSize::DEFAULT);
    let mut sizes = MinPositionSize::new(default);
    for (instrument, value) in config.get_section("min_position_size") {
        let minimum: f64 = value.parse().map_err(|_| LaddersimError::ConfigInvalid {
            section: "min_position_size".to_string(),
            key: instrument.clone(),
            reason: format!("expected a number, got '{value}'"),
        })?;
        sizes = sizes.with_override(&instrument, minimum);
    }
    Ok(AllocationPolicy::new(sizes))
}

pub fn build_deposit_scheduler(config: &dyn ConfigPort) -> DepositScheduler {
    DepositScheduler::new(
        config.get_float("simulation", "deposit_amount", 0.0),
        config.get_int("simulation", "deposit_interval_days", 30),
    )
}

/// Load one series per instrument, skipping instruments whose data fails to
/// load; one instrument's failure never aborts the run.
pub fn load_series(
    candles: &dyn CandlePort,
    instruments: &[String],
    config: &SimulationConfig,
    diagnostics: &dyn DiagnosticsPort,
) -> Vec<CandleSeries> {
    let mut series = Vec::new();
    for instrument in instruments {
        let raw = match candles.fetch_candles(instrument, config.start, config.end) {
            Ok(raw) => raw,
            Err(e) => {
                diagnostics.note(&format!("warning: skipping {instrument} ({e})"));
                continue;
            }
        };
        if raw.is_empty() {
            diagnostics.note(&format!(
                "warning: skipping {instrument} (no candles in range)"
            ));
            continue;
        }
        let s = CandleSeries::new(instrument.clone(), raw);
        diagnostics.note(&format!("  {instrument}: {} candles [OK]", s.candle_count()));
        series.push(s);
    }
    series
}

fn run_simulate(config_path: &PathBuf, instrument: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }

    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let rules = match build_rule_set(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let policy = match build_allocation_policy(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let scheduler = build_deposit_scheduler(&adapter);

    let candle_path = adapter
        .get_string("data", "candle_path")
        .expect("validated above");
    let candles = CandleFileAdapter::new(PathBuf::from(candle_path));
    let diagnostics = StderrDiagnostics;

    let instruments = match instrument {
        Some(one) => vec![one.to_string()],
        None => match candles.list_instruments() {
            Ok(list) => list,
            Err(e) => return fail(&e),
        },
    };

    let series = load_series(&candles, &instruments, &sim_config, &diagnostics);
    if series.is_empty() {
        return fail(&LaddersimError::NoData {
            instrument: "all instruments".to_string(),
        });
    }

    let timeline = build_unified_timeline(&series);
    let result = match run_simulation(
        &series,
        &timeline,
        &rules,
        &policy,
        &scheduler,
        &sim_config,
        &diagnostics,
    ) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    match ConsoleReportAdapter.write(&result) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }
    let sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let rules = match build_rule_set(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    println!("Configuration OK");
    println!("  window: {} .. {}", sim_config.start, sim_config.end);
    println!("  initial balance: {}", sim_config.initial_balance);
    println!("  reopen immediately: {}", sim_config.reopen_immediately);
    println!("  rules ({}): {:?}", rules.rules().len(), rules.rules());
    ExitCode::SUCCESS
}

#[cfg(feature = "sqlite")]
fn run_alerts(config_path: &PathBuf, user: Option<i64>) -> ExitCode {
    use crate::adapters::console_notify_adapter::ConsoleNotifyAdapter;
    use crate::adapters::snapshot_file_adapter::SnapshotFileAdapter;
    use crate::adapters::sqlite_store_adapter::SqliteStoreAdapter;
    use crate::domain::alerting::AlertCycle;
    use chrono::Utc;

    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let store = match SqliteStoreAdapter::from_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if let Err(e) = store.initialize_schema() {
        return fail(&e);
    }

    let snapshot_path = match adapter.get_string("snapshots", "path") {
        Some(p) => p,
        None => {
            return fail(&LaddersimError::ConfigMissing {
                section: "snapshots".to_string(),
                key: "path".to_string(),
            });
        }
    };
    let snapshots = SnapshotFileAdapter::new(PathBuf::from(snapshot_path));
    let diagnostics = StderrDiagnostics;

    let cycle = AlertCycle::new(&store, &snapshots, &ConsoleNotifyAdapter, &diagnostics);
    match cycle.run(user, Utc::now()) {
        Ok(sent) => {
            println!("{sent} alert(s) sent");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(not(feature = "sqlite"))]
fn run_alerts(_config_path: &PathBuf, _user: Option<i64>) -> ExitCode {
    eprintln!("error: alerts require the sqlite feature");
    ExitCode::FAILURE
}

fn run_list_instruments(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }
    let candle_path = adapter
        .get_string("data", "candle_path")
        .expect("validated above");
    let candles = CandleFileAdapter::new(PathBuf::from(candle_path));
    match candles.list_instruments() {
        Ok(instruments) => {
            for instrument in instruments {
                println!("{instrument}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

pub fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(&e);
    }
    println!("Configuration OK");
    ExitCode::SUCCESS
}
