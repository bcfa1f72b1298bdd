//! Page-level control flow over one collection.
//!
//! A [`Board`] holds the records fetched for a page. Views are recomputed on
//! every call: classify into a bucket, then search, filter and sort.
//! Mutations go through the gateway and then patch the in-memory list, which
//! may drift from the store until the next [`Board::reload`].

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info_span, Instrument};

use crate::classifier::{
    classify, classify_due_in, Bucket, DEFAULT_REMINDER_LEAD_DAYS,
};
use crate::error::{BuddyboardError, Result};
use crate::gateway::PersistenceGateway;
use crate::notify::{notify_best_effort, NotificationSink};
use crate::record::{Draft, EditRules, Fields, Record, Tracked};
use crate::reminder::{self, ReconcileReport, Remindable};
use crate::table::{unique_months, unique_values, TableField, TableState};

pub struct Board<T: Tracked> {
    gateway: PersistenceGateway,
    notifier: Arc<dyn NotificationSink>,
    rules: EditRules,
    lead_days: i64,
    records: Vec<T>,
}

impl<T: Tracked> Board<T> {
    /// Fetches the collection, falling back to the local cache when the
    /// store is unreachable.
    pub async fn load(
        gateway: PersistenceGateway,
        notifier: Arc<dyn NotificationSink>,
        rules: EditRules,
    ) -> Result<Self> {
        let mut board = Self {
            gateway,
            notifier,
            rules,
            lead_days: DEFAULT_REMINDER_LEAD_DAYS,
            records: Vec::new(),
        };
        board.reload().await?;
        Ok(board)
    }

    /// Re-lists the collection, replacing the in-memory copy.
    pub async fn reload(&mut self) -> Result<()> {
        self.records = self
            .gateway
            .list_as::<T>()
            .instrument(info_span!("board.reload", collection = T::COLLECTION))
            .await?;
        log::debug!("Loaded {} {} records", self.records.len(), T::COLLECTION);
        Ok(())
    }

    /// Sets how many days ahead the needs-reminder view looks.
    pub fn with_lead_days(mut self, lead_days: i64) -> Self {
        self.lead_days = lead_days;
        self
    }

    pub fn lead_days(&self) -> i64 {
        self.lead_days
    }

    /// All fetched records, newest first.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The records of `bucket` on `today`, with `state` applied.
    pub fn view(&self, bucket: Bucket, today: NaiveDate, state: &TableState<T::Field>) -> Vec<T> {
        let records = match bucket {
            Bucket::NeedsReminder => classify_due_in(&self.records, today, self.lead_days),
            _ => classify(&self.records, bucket, today),
        };
        state.apply(&records)
    }

    /// Every record with `state` applied.
    pub fn all(&self, state: &TableState<T::Field>) -> Vec<T> {
        state.apply(&self.records)
    }

    /// Filter-dropdown options of a column.
    pub fn filter_options(&self, field: T::Field) -> Vec<String> {
        unique_values(&self.records, field)
    }

    /// `MM/YYYY` options of a date column, newest first.
    pub fn month_options(&self, field: T::Field) -> Vec<String> {
        unique_months(&self.records, field)
    }

    /// Validates and stores a draft. Nothing is persisted when validation
    /// fails.
    pub async fn create<D: Draft>(&mut self, draft: D) -> Result<T> {
        let label = draft.label();
        let fields = draft.into_fields(&self.rules)?;
        let record = self
            .gateway
            .create_as::<T>(fields)
            .instrument(info_span!("board.create", collection = T::COLLECTION))
            .await?;
        self.records.insert(0, record.clone());

        let message = format!("New {} added: {}", T::NOUN, label);
        notify_best_effort(self.notifier.as_ref(), &message, Some(record.id())).await;
        Ok(record)
    }

    pub async fn set_status(&mut self, id: &str, status: T::Status) -> Result<T> {
        let mut patch = Fields::new();
        patch.insert("status".to_string(), serde_json::to_value(status)?);

        let record = self.apply_patch(id, patch).await?;
        let message = format!("Status of {} changed to {}", record.label(), status);
        notify_best_effort(self.notifier.as_ref(), &message, Some(id)).await;
        Ok(record)
    }

    /// Inline cell edit. The raw text is converted and validated per field.
    pub async fn edit_field(&mut self, id: &str, field: T::Field, raw: &str) -> Result<T> {
        let patch = T::patch_for(field, raw, &self.rules)?;
        let record = self.apply_patch(id, patch).await?;
        let message = format!("Updated {} for {}", field.key(), record.label());
        notify_best_effort(self.notifier.as_ref(), &message, Some(id)).await;
        Ok(record)
    }

    /// Removes a record permanently.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let deleted = self
            .gateway
            .delete(T::COLLECTION, id)
            .instrument(info_span!("board.delete", collection = T::COLLECTION, id))
            .await?;
        if !deleted {
            return Err(not_found::<T>(id));
        }

        let label = self.find(id).map(|r| r.label());
        self.records.retain(|r| r.id() != id);

        let message = match label {
            Some(label) => format!("{} deleted: {}", capitalized(T::NOUN), label),
            None => format!("A {} has been deleted", T::NOUN),
        };
        notify_best_effort(self.notifier.as_ref(), &message, Some(id)).await;
        Ok(())
    }

    async fn apply_patch(&mut self, id: &str, patch: Fields) -> Result<T> {
        let updated = self
            .gateway
            .update_as::<T>(id, patch)
            .instrument(info_span!("board.update", collection = T::COLLECTION, id))
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.records.insert(0, updated.clone()),
        }
        Ok(updated)
    }
}

impl<T: Remindable> Board<T> {
    /// Loads the collection and runs the reminder transition once.
    pub async fn load_with_reminders(
        gateway: PersistenceGateway,
        notifier: Arc<dyn NotificationSink>,
        rules: EditRules,
        today: NaiveDate,
        lead_days: i64,
    ) -> Result<(Self, ReconcileReport)> {
        let mut board = Self::load(gateway, notifier, rules)
            .await?
            .with_lead_days(lead_days);
        let report = board.reconcile_reminders(today, lead_days).await;
        Ok((board, report))
    }

    /// Moves records due in `lead_days` to the reminder status.
    pub async fn reconcile_reminders(
        &mut self,
        today: NaiveDate,
        lead_days: i64,
    ) -> ReconcileReport {
        let report = reminder::reconcile(
            &self.gateway,
            self.notifier.as_ref(),
            &mut self.records,
            today,
            lead_days,
        )
        .await;
        if !report.failed.is_empty() {
            log::warn!(
                "{} of {} reminder updates failed",
                report.failed.len(),
                report.failed.len() + report.updated.len()
            );
        }
        report
    }
}

fn not_found<T: Record>(id: &str) -> BuddyboardError {
    BuddyboardError::NotFound {
        collection: T::COLLECTION.to_string(),
        id: id.to_string(),
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
