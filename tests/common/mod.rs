#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use laddersim::domain::alert::Alert;
use laddersim::domain::candle::Candle;
use laddersim::domain::error::LaddersimError;
use laddersim::domain::trigger::{Direction, PositionSnapshot, Trigger, TriggerReference};
use laddersim::domain::user::User;
use laddersim::ports::candle_port::CandlePort;
use laddersim::ports::diagnostics_port::DiagnosticsPort;
use laddersim::ports::notify_port::NotifyPort;
use laddersim::ports::snapshot_port::SnapshotPort;
use laddersim::ports::store_port::StorePort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, day, hour, 0, 0).unwrap()
}

pub fn make_candle(instrument: &str, at: DateTime<Utc>, open: f64) -> Candle {
    Candle {
        instrument: instrument.to_string(),
        ts: at,
        open,
        high: open + 1.0,
        low: open - 1.0,
        close: open,
    }
}

pub fn make_user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        channel_id: format!("chat-{id}"),
        broker_token: format!("token-{id}"),
    }
}

pub fn make_trigger(id: i64, user_id: i64, instrument: Option<&str>) -> Trigger {
    Trigger {
        id,
        user_id,
        instrument: instrument.map(str::to_string),
        reference: TriggerReference::Portfolio,
        direction: Direction::Increase,
        threshold: 5.0,
    }
}

pub fn make_snapshot(instrument: &str, current: f64, portfolio: f64) -> PositionSnapshot {
    PositionSnapshot {
        name: format!("{instrument} Inc."),
        instrument: instrument.to_string(),
        current_price: current,
        portfolio_price: portfolio,
        daily_price: portfolio,
        weekly_price: portfolio,
        monthly_price: portfolio,
    }
}

pub struct MockCandlePort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandlePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, instrument: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(instrument.to_string(), candles);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors
            .insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl CandlePort for MockCandlePort {
    fn fetch_candles(
        &self,
        instrument: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, LaddersimError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(LaddersimError::CandleData {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(instrument).cloned().unwrap_or_default())
    }

    fn list_instruments(&self) -> Result<Vec<String>, LaddersimError> {
        let mut instruments: Vec<String> = self.data.keys().cloned().collect();
        instruments.sort();
        Ok(instruments)
    }
}

/// In-memory store with interior mutability; single-threaded tests only.
pub struct MemoryStore {
    pub stored_users: Vec<User>,
    pub triggers: RefCell<Vec<Trigger>>,
    pub alerts: RefCell<Vec<Alert>>,
    next_alert_id: Cell<i64>,
}

impl MemoryStore {
    pub fn new(users: Vec<User>, triggers: Vec<Trigger>) -> Self {
        Self {
            stored_users: users,
            triggers: RefCell::new(triggers),
            alerts: RefCell::new(Vec::new()),
            next_alert_id: Cell::new(1),
        }
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.borrow().len()
    }
}

impl StorePort for MemoryStore {
    fn users(&self) -> Result<Vec<User>, LaddersimError> {
        Ok(self.stored_users.clone())
    }

    fn triggers_for_user(&self, user_id: i64) -> Result<Vec<Trigger>, LaddersimError> {
        Ok(self
            .triggers
            .borrow()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    fn delete_triggers_for_instrument(
        &self,
        user_id: i64,
        instrument: &str,
    ) -> Result<(), LaddersimError> {
        self.triggers.borrow_mut().retain(|t| {
            t.user_id != user_id || t.instrument.as_deref() != Some(instrument)
        });
        Ok(())
    }

    fn alerts_for_trigger(&self, trigger_id: i64) -> Result<Vec<Alert>, LaddersimError> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .borrow()
            .iter()
            .filter(|a| a.trigger_id == trigger_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    fn recent_alerts_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Alert>, LaddersimError> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .borrow()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.truncate(limit);
        Ok(alerts)
    }

    fn record_alert(
        &self,
        user_id: i64,
        trigger_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), LaddersimError> {
        let id = self.next_alert_id.get();
        self.next_alert_id.set(id + 1);
        self.alerts.borrow_mut().push(Alert {
            id,
            user_id,
            trigger_id,
            created_at,
        });
        Ok(())
    }
}

pub struct MockSnapshotPort {
    pub positions: HashMap<i64, Vec<PositionSnapshot>>,
    pub errors: HashMap<i64, String>,
}

impl MockSnapshotPort {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_positions(mut self, user_id: i64, positions: Vec<PositionSnapshot>) -> Self {
        self.positions.insert(user_id, positions);
        self
    }

    pub fn with_error(mut self, user_id: i64, reason: &str) -> Self {
        self.errors.insert(user_id, reason.to_string());
        self
    }
}

impl SnapshotPort for MockSnapshotPort {
    fn positions_for_user(&self, user: &User) -> Result<Vec<PositionSnapshot>, LaddersimError> {
        if let Some(reason) = self.errors.get(&user.id) {
            return Err(LaddersimError::NoData {
                instrument: reason.clone(),
            });
        }
        Ok(self.positions.get(&user.id).cloned().unwrap_or_default())
    }
}

pub struct RecordingNotifier {
    pub sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
        }
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, user: &User, text: &str) -> Result<(), LaddersimError> {
        self.sent
            .borrow_mut()
            .push((user.username.clone(), text.to_string()));
        Ok(())
    }
}

pub struct Quiet;

impl DiagnosticsPort for Quiet {
    fn note(&self, _message: &str) {}
}

pub struct CollectingDiagnostics {
    pub notes: RefCell<Vec<String>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self {
            notes: RefCell::new(Vec::new()),
        }
    }
}

impl DiagnosticsPort for CollectingDiagnostics {
    fn note(&self, message: &str) {
        self.notes.borrow_mut().push(message.to_string());
    }
}
