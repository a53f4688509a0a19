//! The alert cycle: evaluate every user's triggers against live holdings.

use chrono::{DateTime, Utc};

use super::alert::should_ignore;
use super::error::LaddersimError;
use super::trigger::{PositionSnapshot, Trigger};
use super::user::User;
use crate::ports::diagnostics_port::DiagnosticsPort;
use crate::ports::notify_port::NotifyPort;
use crate::ports::snapshot_port::SnapshotPort;
use crate::ports::store_port::StorePort;

pub struct AlertCycle<'a> {
    store: &'a dyn StorePort,
    snapshots: &'a dyn SnapshotPort,
    notifier: &'a dyn NotifyPort,
    diagnostics: &'a dyn DiagnosticsPort,
}

impl<'a> AlertCycle<'a> {
    pub fn new(
        store: &'a dyn StorePort,
        snapshots: &'a dyn SnapshotPort,
        notifier: &'a dyn NotifyPort,
        diagnostics: &'a dyn DiagnosticsPort,
    ) -> Self {
        Self {
            store,
            snapshots,
            notifier,
            diagnostics,
        }
    }

    /// Run one cycle over every stored user (or one, when filtered).
    /// Returns the number of alerts sent.
    ///
    /// A user whose snapshot source fails is skipped with a note; store and
    /// notification failures propagate.
    pub fn run(
        &self,
        user_filter: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<usize, LaddersimError> {
        let mut sent = 0;
        for user in self.store.users()? {
            if let Some(id) = user_filter {
                if user.id != id {
                    continue;
                }
            }
            match self.run_for_user(&user, now) {
                Ok(count) => sent += count,
                Err(LaddersimError::NoData { instrument }) => {
                    self.diagnostics.note(&format!(
                        "skipping {}: no snapshot data ({instrument})",
                        user.username
                    ));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(sent)
    }

    fn run_for_user(&self, user: &User, now: DateTime<Utc>) -> Result<usize, LaddersimError> {
        let triggers = self.store.triggers_for_user(user.id)?;
        let positions = self.snapshots.positions_for_user(user)?;
        let triggers = self.clean_unused_triggers(user, triggers, &positions)?;

        let mut sent = 0;
        for position in &positions {
            for trigger in &triggers {
                if !trigger.is_triggered(position) {
                    continue;
                }
                let prior = self.store.alerts_for_trigger(trigger.id)?;
                if should_ignore(trigger, &prior, now) {
                    self.diagnostics.note(&format!(
                        "suppressing trigger {} for {} (within cool-down)",
                        trigger.id, user.username
                    ));
                    continue;
                }
                let text = format!("{}\n{trigger}", position.name);
                self.notifier.send(user, &text)?;
                self.store.record_alert(user.id, trigger.id, now)?;
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Drop triggers filtered to instruments the user no longer holds, both
    /// from the store and from the working set.
    fn clean_unused_triggers(
        &self,
        user: &User,
        triggers: Vec<Trigger>,
        positions: &[PositionSnapshot],
    ) -> Result<Vec<Trigger>, LaddersimError> {
        let mut kept = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let unused = trigger
                .instrument
                .as_deref()
                .is_some_and(|instrument| {
                    !positions.iter().any(|p| p.instrument == instrument)
                });
            if unused {
                let instrument = trigger.instrument.as_deref().unwrap_or_default();
                self.diagnostics.note(&format!(
                    "removing trigger {} for {}: {instrument} no longer held",
                    trigger.id, user.username
                ));
                self.store
                    .delete_triggers_for_instrument(user.id, instrument)?;
            } else {
                kept.push(trigger);
            }
        }
        Ok(kept)
    }
}
