//! Alert records and cool-down suppression.

use chrono::{DateTime, Duration, Utc};

use super::trigger::{CandleWindow, Trigger, TriggerReference};

/// One delivered notification. Append-only; feeds both the user-facing
/// history and the suppression check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    pub trigger_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Cool-down window per reference kind. Daily references renotify after a
/// day, monthly after thirty; portfolio and weekly share the default week.
pub fn cooldown_window(reference: TriggerReference) -> Duration {
    match reference {
        TriggerReference::Candle(CandleWindow::Daily) => Duration::days(1),
        TriggerReference::Candle(CandleWindow::Monthly) => Duration::days(30),
        _ => Duration::days(7),
    }
}

/// Suppress when any prior alert for this trigger falls inside the window.
/// Per-trigger: other triggers on the same instrument fire independently.
pub fn should_ignore(trigger: &Trigger, prior_alerts: &[Alert], now: DateTime<Utc>) -> bool {
    let floor = now - cooldown_window(trigger.reference);
    prior_alerts.iter().any(|alert| alert.created_at > floor)
}
