//! Configuration validation.
//!
//! Every field is checked before a run; invalid configuration aborts instead
//! of proceeding with undefined behavior.

use chrono::NaiveDate;

use crate::domain::error::LaddersimError;
use crate::domain::rule::parse_rules;
use crate::ports::config_port::ConfigPort;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    validate_dates(config)?;
    validate_initial_balance(config)?;
    validate_deposits(config)?;
    validate_rules(config)?;
    validate_min_position_sizes(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    if config.get_string("data", "candle_path").is_none() {
        return Err(LaddersimError::ConfigMissing {
            section: "data".to_string(),
            key: "candle_path".to_string(),
        });
    }
    Ok(())
}

fn parse_date(
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
        reason: format!("expected YYYY-MM-DD: {e}"),
    })
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start >= end {
        return Err(LaddersimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    let value = config.get_float("simulation", "initial_balance", 0.0);
    if value < 0.0 {
        return Err(LaddersimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_deposits(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    let amount = config.get_float("simulation", "deposit_amount", 0.0);
    if amount < 0.0 {
        return Err(LaddersimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "deposit_amount".to_string(),
            reason: "deposit_amount must be non-negative".to_string(),
        });
    }
    let interval = config.get_int("simulation", "deposit_interval_days", 30);
    if interval <= 0 {
        return Err(LaddersimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "deposit_interval_days".to_string(),
            reason: "deposit_interval_days must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_rules(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    let rules =
        config
            .get_string("simulation", "rules")
            .ok_or_else(|| LaddersimError::ConfigMissing {
                section: "simulation".to_string(),
                key: "rules".to_string(),
            })?;
    parse_rules(&rules)?;
    Ok(())
}

fn validate_min_position_sizes(config: &dyn ConfigPort) -> Result<(), LaddersimError> {
    let default = config.get_float("allocation", "min_position_size", 50.0);
    if default <= 0.0 {
        return Err(LaddersimError::ConfigInvalid {
            section: "allocation".to_string(),
            key: "min_position_size".to_string(),
            reason: "min_position_size must be positive".to_string(),
        });
    }
    for (instrument, value) in config.get_section("min_position_size") {
        let minimum: f64 = value.parse().map_err(|_| LaddersimError::ConfigInvalid {
            section: "min_position_size".to_string(),
            key: instrument.clone(),
            reason: format!("expected a number, got '{value}'"),
        })?;
        if minimum <= 0.0 {
            return Err(LaddersimError::ConfigInvalid {
                section: "min_position_size".to_string(),
                key: instrument,
                reason: "override must be positive".to_string(),
            });
        }
    }
    Ok(())
}
