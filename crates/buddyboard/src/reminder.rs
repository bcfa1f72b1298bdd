//! Reminder reconciliation.
//!
//! Deciding which records need a reminder is pure ([`plan`]); moving them to
//! the reminder status is a separate step ([`reconcile`]) that the caller
//! runs once per load, never from a read path.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::classifier::is_due_in;
use crate::gateway::PersistenceGateway;
use crate::notify::{notify_best_effort, NotificationSink};
use crate::record::{Fields, Lead, LeadStatus, Record, Tracked};

/// A record type with an automatic reminder transition.
pub trait Remindable: Tracked {
    /// The status a due record is moved to.
    fn reminder_status() -> Self::Status;

    /// False once the record already reached the reminder step.
    fn reminder_pending(&self) -> bool;
}

impl Remindable for Lead {
    fn reminder_status() -> LeadStatus {
        LeadStatus::SendReminder
    }

    fn reminder_pending(&self) -> bool {
        !self.status.is_reminder()
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.failed.is_empty()
    }
}

/// Ids of records due in exactly `lead_days` that still need the transition.
pub fn plan<T: Remindable>(records: &[T], today: NaiveDate, lead_days: i64) -> Vec<String> {
    records
        .iter()
        .filter(|r| is_due_in(*r, today, lead_days) && r.reminder_pending())
        .map(|r| r.id().to_string())
        .collect()
}

/// Applies [`plan`]: persists the reminder status, patches `records` in
/// place and sends a notification for each transition.
///
/// A failure on one record is logged and recorded in the report; the others
/// are still processed.
pub async fn reconcile<T: Remindable>(
    gateway: &PersistenceGateway,
    notifier: &dyn NotificationSink,
    records: &mut [T],
    today: NaiveDate,
    lead_days: i64,
) -> ReconcileReport {
    let due = plan(records, today, lead_days);
    let span = info_span!("reminder.reconcile", collection = T::COLLECTION, due = due.len());
    apply(gateway, notifier, records, due).instrument(span).await
}

async fn apply<T: Remindable>(
    gateway: &PersistenceGateway,
    notifier: &dyn NotificationSink,
    records: &mut [T],
    due: Vec<String>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    if due.is_empty() {
        return report;
    }

    let Some(status) = reminder_status_value::<T>() else {
        log::error!("Cannot encode reminder status '{}'", T::reminder_status());
        report.failed = due;
        return report;
    };

    for id in due {
        let mut patch = Fields::new();
        patch.insert("status".to_string(), status.clone());

        match gateway.update_as::<T>(&id, patch).await {
            Ok(Some(updated)) => {
                let message = format!("Reminder due: {}", updated.label());
                if let Some(slot) = records.iter_mut().find(|r| r.id() == id) {
                    *slot = updated;
                }
                notify_best_effort(notifier, &message, Some(&id)).await;
                log::info!("Moved {}/{} to '{}'", T::COLLECTION, id, T::reminder_status());
                report.updated.push(id);
            }
            Ok(None) => {
                log::warn!("Reminder target {}/{} no longer exists", T::COLLECTION, id);
                report.failed.push(id);
            }
            Err(e) => {
                log::warn!("Reminder update for {}/{} failed: {}", T::COLLECTION, id, e);
                report.failed.push(id);
            }
        }
    }

    report
}

/// Status value used in the patch, as stored.
pub fn reminder_status_value<T: Remindable>() -> Option<Value> {
    serde_json::to_value(T::reminder_status()).ok()
}
