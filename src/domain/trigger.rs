//! User-defined alert triggers and their evaluation.
//!
//! A trigger compares a holding's current price against a reference price
//! (portfolio average, or a daily/weekly/monthly candle aggregate) and fires
//! when the relative move exceeds the threshold in the configured direction.

use super::error::LaddersimError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleWindow {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerReference {
    /// Average portfolio entry price of the holding.
    Portfolio,
    /// Candle aggregate over the past window.
    Candle(CandleWindow),
}

impl TriggerReference {
    /// The string code the store persists.
    pub fn code(&self) -> &'static str {
        match self {
            TriggerReference::Portfolio => "PORTFOLIO",
            TriggerReference::Candle(CandleWindow::Daily) => "CANDLE_1D",
            TriggerReference::Candle(CandleWindow::Weekly) => "CANDLE_1W",
            TriggerReference::Candle(CandleWindow::Monthly) => "CANDLE_1M",
        }
    }
}

impl FromStr for TriggerReference {
    type Err = LaddersimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PORTFOLIO" => Ok(TriggerReference::Portfolio),
            "CANDLE_1D" => Ok(TriggerReference::Candle(CandleWindow::Daily)),
            "CANDLE_1W" => Ok(TriggerReference::Candle(CandleWindow::Weekly)),
            "CANDLE_1M" => Ok(TriggerReference::Candle(CandleWindow::Monthly)),
            other => Err(LaddersimError::UnknownReference {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Increase => "INCREASE",
            Direction::Decrease => "DECREASE",
        }
    }
}

impl FromStr for Direction {
    type Err = LaddersimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "INCREASE" => Ok(Direction::Increase),
            "DECREASE" => Ok(Direction::Decrease),
            other => Err(LaddersimError::UnknownDirection {
                value: other.to_string(),
            }),
        }
    }
}

/// One live holding as the snapshot source serves it.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub name: String,
    pub instrument: String,
    pub current_price: f64,
    pub portfolio_price: f64,
    pub daily_price: f64,
    pub weekly_price: f64,
    pub monthly_price: f64,
}

impl PositionSnapshot {
    pub fn candle_price(&self, window: CandleWindow) -> f64 {
        match window {
            CandleWindow::Daily => self.daily_price,
            CandleWindow::Weekly => self.weekly_price,
            CandleWindow::Monthly => self.monthly_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub id: i64,
    pub user_id: i64,
    /// None means any instrument in the portfolio.
    pub instrument: Option<String>,
    pub reference: TriggerReference,
    pub direction: Direction,
    /// Percentage points, e.g. 5 fires on a move above 5%.
    pub threshold: f64,
}

impl Trigger {
    pub fn is_triggered(&self, snapshot: &PositionSnapshot) -> bool {
        if let Some(instrument) = &self.instrument {
            if *instrument != snapshot.instrument {
                return false;
            }
        }
        let reference_price = match self.reference {
            TriggerReference::Portfolio => snapshot.portfolio_price,
            TriggerReference::Candle(window) => snapshot.candle_price(window),
        };
        self.is_triggered_by_reference(reference_price, snapshot.current_price)
    }

    fn is_triggered_by_reference(&self, reference_price: f64, current_price: f64) -> bool {
        match self.direction {
            // Equal prices fall through to the magnitude check, which then
            // fails the strict threshold comparison on its own.
            Direction::Increase if current_price < reference_price => return false,
            Direction::Decrease if current_price > reference_price => return false,
            _ => {}
        }
        (1.0 - current_price / reference_price).abs() * 100.0 > self.threshold
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self.direction {
            Direction::Increase => "Increased",
            Direction::Decrease => "Dropped",
        };
        let reference = match self.reference {
            TriggerReference::Portfolio => "from portfolio",
            TriggerReference::Candle(CandleWindow::Daily) => "in a day",
            TriggerReference::Candle(CandleWindow::Weekly) => "in a week",
            TriggerReference::Candle(CandleWindow::Monthly) => "in a month",
        };
        write!(f, "{action} by more than {}% {reference}", self.threshold)
    }
}
