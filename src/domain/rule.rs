//! Threshold rules and ordered rule-set evaluation.
//!
//! A rule is exactly one of:
//! - `Open { threshold }` — signed fraction. Positive: open when the candle
//!   opens above the most expensive held position by more than the threshold.
//!   Negative: open when it opens below the cheapest held position.
//! - `Close { threshold }` — non-negative fraction. Close when the candle
//!   opens above the cheapest held position by more than the threshold.
//!
//! Declaration order is semantic: the first rule whose condition matches
//! terminates evaluation for that candle.

use super::candle::Candle;
use super::error::LaddersimError;
use super::position::Position;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Open { threshold: f64 },
    Close { threshold: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    FirstPosition,
    AbovePortfolio,
    BelowPortfolio,
    ImmediateReopen,
}

impl std::fmt::Display for OpenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            OpenReason::FirstPosition => "first position",
            OpenReason::AbovePortfolio => "above portfolio",
            OpenReason::BelowPortfolio => "below portfolio",
            OpenReason::ImmediateReopen => "immediate reopen",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    AbovePortfolio,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::AbovePortfolio => write!(f, "above portfolio"),
        }
    }
}

/// Outcome of rule evaluation for one instrument at one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Open(OpenReason),
    Close(CloseReason),
    Hold,
}

/// An ordered, validated list of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// A close rule with a negative threshold would initiate closes at a
    /// loss, which is a configuration error.
    pub fn new(rules: Vec<Rule>) -> Result<Self, LaddersimError> {
        for rule in &rules {
            if let Rule::Close { threshold } = rule {
                if *threshold < 0.0 {
                    return Err(LaddersimError::RuleInvalid {
                        reason: format!(
                            "close threshold must be non-negative, got {threshold}"
                        ),
                    });
                }
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate the rule set against the instrument's open positions.
    ///
    /// With no open positions every candle opens a first position, before
    /// any rule is consulted.
    pub fn evaluate(&self, positions: &[Position], candle: &Candle) -> Signal {
        if positions.is_empty() {
            return Signal::Open(OpenReason::FirstPosition);
        }

        let max_price = positions
            .iter()
            .map(|p| p.entry_price)
            .fold(f64::MIN, f64::max);
        let min_price = positions
            .iter()
            .map(|p| p.entry_price)
            .fold(f64::MAX, f64::min);

        for rule in &self.rules {
            match *rule {
                Rule::Open { threshold } if threshold > 0.0 => {
                    if candle.open > max_price * (1.0 + threshold) {
                        return Signal::Open(OpenReason::AbovePortfolio);
                    }
                }
                Rule::Open { threshold } if threshold < 0.0 => {
                    if candle.open < min_price * (1.0 + threshold) {
                        return Signal::Open(OpenReason::BelowPortfolio);
                    }
                }
                Rule::Open { .. } => {}
                Rule::Close { threshold } => {
                    if candle.open > min_price * (1.0 + threshold) {
                        return Signal::Close(CloseReason::AbovePortfolio);
                    }
                }
            }
        }

        Signal::Hold
    }
}

/// Parse an ordered rule list of the form `open:0.15, close:0.2, open:-0.1`.
pub fn parse_rules(input: &str) -> Result<RuleSet, LaddersimError> {
    let mut rules = Vec::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(LaddersimError::RuleInvalid {
                reason: "empty token in rule list".into(),
            });
        }
        let (kind, value) =
            trimmed
                .split_once(':')
                .ok_or_else(|| LaddersimError::RuleInvalid {
                    reason: format!("expected kind:threshold, got '{trimmed}'"),
                })?;
        let threshold: f64 =
            value
                .trim()
                .parse()
                .map_err(|_| LaddersimError::RuleInvalid {
                    reason: format!("invalid threshold '{}'", value.trim()),
                })?;
        match kind.trim().to_lowercase().as_str() {
            "open" => rules.push(Rule::Open { threshold }),
            "close" => rules.push(Rule::Close { threshold }),
            other => {
                return Err(LaddersimError::RuleInvalid {
                    reason: format!("unknown rule kind '{other}'"),
                });
            }
        }
    }

    RuleSet::new(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(instrument: &str, open: f64) -> Candle {
        Candle {
            instrument: instrument.to_string(),
            ts: Utc.with_ymd_and_hms(2020, 6, 1, 10, 0, 0).unwrap(),
            open,
            high: open,
            low: open,
            close: open,
        }
    }

    fn position(instrument: &str, entry_price: f64, value: f64) -> Position {
        Position {
            instrument: instrument.to_string(),
            entry_price,
            value,
            opened_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn negative_close_threshold_fails_construction() {
        let result = RuleSet::new(vec![Rule::Close { threshold: -0.1 }]);
        assert!(matches!(result, Err(LaddersimError::RuleInvalid { .. })));
    }

    #[test]
    fn zero_close_threshold_is_allowed() {
        assert!(RuleSet::new(vec![Rule::Close { threshold: 0.0 }]).is_ok());
    }

    #[test]
    fn no_positions_always_opens_first() {
        let rules = RuleSet::new(vec![Rule::Close { threshold: 0.2 }]).unwrap();
        let signal = rules.evaluate(&[], &candle("TSLA", 1.0));
        assert_eq!(signal, Signal::Open(OpenReason::FirstPosition));
    }

    #[test]
    fn no_positions_opens_even_with_empty_rule_set() {
        let rules = RuleSet::new(vec![]).unwrap();
        let signal = rules.evaluate(&[], &candle("TSLA", 1.0));
        assert_eq!(signal, Signal::Open(OpenReason::FirstPosition));
    }

    #[test]
    fn open_above_portfolio() {
        // 116 > 100 * 1.15 = 115
        let rules = RuleSet::new(vec![Rule::Open { threshold: 0.15 }]).unwrap();
        let held = [position("TSLA", 100.0, 500.0)];
        let signal = rules.evaluate(&held, &candle("TSLA", 116.0));
        assert_eq!(signal, Signal::Open(OpenReason::AbovePortfolio));
    }

    #[test]
    fn open_above_portfolio_requires_strictly_above() {
        let rules = RuleSet::new(vec![Rule::Open { threshold: 0.15 }]).unwrap();
        let held = [position("TSLA", 100.0, 500.0)];
        assert_eq!(rules.evaluate(&held, &candle("TSLA", 115.0)), Signal::Hold);
    }

    #[test]
    fn open_above_uses_most_expensive_position() {
        let rules = RuleSet::new(vec![Rule::Open { threshold: 0.1 }]).unwrap();
        let held = [
            position("TSLA", 100.0, 500.0),
            position("TSLA", 200.0, 500.0),
        ];
        // 215 is above 100*1.1 but not above 200*1.1
        assert_eq!(rules.evaluate(&held, &candle("TSLA", 215.0)), Signal::Hold);
        assert_eq!(
            rules.evaluate(&held, &candle("TSLA", 221.0)),
            Signal::Open(OpenReason::AbovePortfolio)
        );
    }

    #[test]
    fn open_below_portfolio() {
        let rules = RuleSet::new(vec![Rule::Open { threshold: -0.1 }]).unwrap();
        let held = [
            position("TSLA", 100.0, 500.0),
            position("TSLA", 200.0, 500.0),
        ];
        // Cheapest held position is 100; 100 * 0.9 = 90
        assert_eq!(
            rules.evaluate(&held, &candle("TSLA", 89.0)),
            Signal::Open(OpenReason::BelowPortfolio)
        );
        assert_eq!(rules.evaluate(&held, &candle("TSLA", 90.0)), Signal::Hold);
    }

    #[test]
    fn close_above_cheapest_position() {
        let rules = RuleSet::new(vec![Rule::Close { threshold: 0.2 }]).unwrap();
        let held = [
            position("TSLA", 100.0, 500.0),
            position("TSLA", 300.0, 500.0),
        ];
        // 100 * 1.2 = 120
        assert_eq!(
            rules.evaluate(&held, &candle("TSLA", 121.0)),
            Signal::Close(CloseReason::AbovePortfolio)
        );
        assert_eq!(rules.evaluate(&held, &candle("TSLA", 120.0)), Signal::Hold);
    }

    #[test]
    fn declaration_order_decides_between_matching_rules() {
        let held = [position("TSLA", 100.0, 500.0)];
        let candle = candle("TSLA", 130.0);

        // Both rules match at 130; the first declared wins either way round.
        let open_first = RuleSet::new(vec![
            Rule::Open { threshold: 0.15 },
            Rule::Close { threshold: 0.2 },
        ])
        .unwrap();
        assert_eq!(
            open_first.evaluate(&held, &candle),
            Signal::Open(OpenReason::AbovePortfolio)
        );

        let close_first = RuleSet::new(vec![
            Rule::Close { threshold: 0.2 },
            Rule::Open { threshold: 0.15 },
        ])
        .unwrap();
        assert_eq!(
            close_first.evaluate(&held, &candle),
            Signal::Close(CloseReason::AbovePortfolio)
        );
    }

    #[test]
    fn no_rule_matches_holds() {
        let rules = parse_rules("open:0.15, close:0.2, open:-0.1").unwrap();
        let held = [position("TSLA", 100.0, 500.0)];
        assert_eq!(rules.evaluate(&held, &candle("TSLA", 105.0)), Signal::Hold);
    }

    #[test]
    fn parse_rules_basic() {
        let rules = parse_rules("open:0.15, close:0.2, open:-0.1").unwrap();
        assert_eq!(
            rules.rules(),
            &[
                Rule::Open { threshold: 0.15 },
                Rule::Close { threshold: 0.2 },
                Rule::Open { threshold: -0.1 },
            ]
        );
    }

    #[test]
    fn parse_rules_rejects_garbage() {
        assert!(parse_rules("open").is_err());
        assert!(parse_rules("open:abc").is_err());
        assert!(parse_rules("hold:0.1").is_err());
        assert!(parse_rules("open:0.1,,close:0.2").is_err());
    }

    #[test]
    fn parse_rules_rejects_negative_close() {
        assert!(matches!(
            parse_rules("close:-0.2"),
            Err(LaddersimError::RuleInvalid { .. })
        ));
    }
}
