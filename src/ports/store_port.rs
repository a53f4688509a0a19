//! Trigger/alert store port trait.
//!
//! The store is durable and external; the core only needs create, read and
//! delete-by-filter, with writes visible to the next read in-process.

use chrono::{DateTime, Utc};

use crate::domain::alert::Alert;
use crate::domain::error::LaddersimError;
use crate::domain::trigger::Trigger;
use crate::domain::user::User;

pub trait StorePort {
    fn users(&self) -> Result<Vec<User>, LaddersimError>;

    fn triggers_for_user(&self, user_id: i64) -> Result<Vec<Trigger>, LaddersimError>;

    /// Remove every trigger of `user_id` filtered to `instrument`.
    fn delete_triggers_for_instrument(
        &self,
        user_id: i64,
        instrument: &str,
    ) -> Result<(), LaddersimError>;

    /// Alerts for one trigger, newest first.
    fn alerts_for_trigger(&self, trigger_id: i64) -> Result<Vec<Alert>, LaddersimError>;

    /// Recent alerts for one user, newest first, at most `limit`.
    fn recent_alerts_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Alert>, LaddersimError>;

    fn record_alert(
        &self,
        user_id: i64,
        trigger_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), LaddersimError>;
}
