//! Service leads: a customer booking with a provider over a date window.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::{
    immutable, optional_text, require_date, require_text, single_patch, Draft, EditRules, Fields,
    Record, Tracked,
};
use crate::classifier::{Classifiable, Stage};
use crate::error::ValidationError;
use crate::table::{FieldKind, TableField, Tabular};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "Send Reminder")]
    SendReminder,
    #[serde(rename = "Reminder Sent")]
    ReminderSent,
    #[serde(rename = "Pending Service")]
    PendingService,
    #[serde(rename = "Service In Progress")]
    ServiceInProgress,
    #[serde(rename = "To Reschedule")]
    ToReschedule,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "Completed")]
    Completed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::SendReminder,
        LeadStatus::ReminderSent,
        LeadStatus::PendingService,
        LeadStatus::ServiceInProgress,
        LeadStatus::ToReschedule,
        LeadStatus::Cancelled,
        LeadStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::SendReminder => "Send Reminder",
            LeadStatus::ReminderSent => "Reminder Sent",
            LeadStatus::PendingService => "Pending Service",
            LeadStatus::ServiceInProgress => "Service In Progress",
            LeadStatus::ToReschedule => "To Reschedule",
            LeadStatus::Cancelled => "Cancelled",
            LeadStatus::Completed => "Completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn stage(self) -> Stage {
        match self {
            LeadStatus::Completed => Stage::Completed,
            LeadStatus::Cancelled => Stage::Cancelled,
            _ => Stage::Open,
        }
    }

    /// Whether the reminder step has already been reached.
    pub fn is_reminder(self) -> bool {
        matches!(self, LeadStatus::SendReminder | LeadStatus::ReminderSent)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub service_provider_name: String,
    #[serde(default)]
    pub service_provider_contact: String,
    #[serde(default)]
    pub service_start_date: String,
    #[serde(default)]
    pub service_end_date: String,
    #[serde(default)]
    pub service_start_time: String,
    #[serde(default)]
    pub service_end_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub total_price: f64,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_by: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Typed column keys of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadField {
    CustomerName,
    CustomerContact,
    CustomerAddress,
    ServiceProviderName,
    ServiceProviderContact,
    ServiceStartDate,
    ServiceEndDate,
    ServiceStartTime,
    ServiceEndTime,
    Notes,
    TotalPrice,
    Status,
    HandledBy,
    CreatedAt,
    UpdatedAt,
}

impl TableField for LeadField {
    fn kind(self) -> FieldKind {
        match self {
            LeadField::ServiceStartDate
            | LeadField::ServiceEndDate
            | LeadField::CreatedAt
            | LeadField::UpdatedAt => FieldKind::Date,
            LeadField::TotalPrice => FieldKind::Numeric,
            _ => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            LeadField::CustomerName => "customer_name",
            LeadField::CustomerContact => "customer_contact",
            LeadField::CustomerAddress => "customer_address",
            LeadField::ServiceProviderName => "service_provider_name",
            LeadField::ServiceProviderContact => "service_provider_contact",
            LeadField::ServiceStartDate => "service_start_date",
            LeadField::ServiceEndDate => "service_end_date",
            LeadField::ServiceStartTime => "service_start_time",
            LeadField::ServiceEndTime => "service_end_time",
            LeadField::Notes => "notes",
            LeadField::TotalPrice => "total_price",
            LeadField::Status => "status",
            LeadField::HandledBy => "handled_by",
            LeadField::CreatedAt => "createdAt",
            LeadField::UpdatedAt => "updatedAt",
        }
    }
}

fn non_empty(value: &str) -> Option<Cow<'_, str>> {
    (!value.is_empty()).then_some(Cow::Borrowed(value))
}

impl Tabular for Lead {
    type Field = LeadField;

    fn field_value(&self, field: LeadField) -> Option<Cow<'_, str>> {
        match field {
            LeadField::CustomerName => non_empty(&self.customer_name),
            LeadField::CustomerContact => non_empty(&self.customer_contact),
            LeadField::CustomerAddress => self.customer_address.as_deref().and_then(non_empty),
            LeadField::ServiceProviderName => non_empty(&self.service_provider_name),
            LeadField::ServiceProviderContact => non_empty(&self.service_provider_contact),
            LeadField::ServiceStartDate => non_empty(&self.service_start_date),
            LeadField::ServiceEndDate => non_empty(&self.service_end_date),
            LeadField::ServiceStartTime => non_empty(&self.service_start_time),
            LeadField::ServiceEndTime => non_empty(&self.service_end_time),
            LeadField::Notes => non_empty(&self.notes),
            LeadField::TotalPrice => Some(Cow::Owned(self.total_price.to_string())),
            LeadField::Status => Some(Cow::Borrowed(self.status.as_str())),
            LeadField::HandledBy => self.handled_by.as_deref().and_then(non_empty),
            LeadField::CreatedAt => Some(Cow::Owned(self.created_at.to_rfc3339())),
            LeadField::UpdatedAt => Some(Cow::Owned(self.updated_at.to_rfc3339())),
        }
    }
}

impl Classifiable for Lead {
    fn primary_date(&self) -> &str {
        &self.service_start_date
    }

    fn secondary_date(&self) -> &str {
        &self.service_end_date
    }

    fn stage(&self) -> Stage {
        self.status.stage()
    }
}

impl Record for Lead {
    const COLLECTION: &'static str = "leads";
    const NOUN: &'static str = "lead";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.customer_name, self.service_provider_name)
    }
}

fn price_value(field: &str, raw: &str) -> Result<Value, ValidationError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::single(field, "Price must be a number"))?;
    if !(price > 0.0) {
        return Err(ValidationError::single(field, "Price must be positive"));
    }
    Number::from_f64(price)
        .map(Value::Number)
        .ok_or_else(|| ValidationError::single(field, "Price must be a number"))
}

impl Tracked for Lead {
    type Status = LeadStatus;

    fn status(&self) -> LeadStatus {
        self.status
    }

    fn patch_for(
        field: LeadField,
        raw: &str,
        rules: &EditRules,
    ) -> Result<Fields, ValidationError> {
        let key = field.key();
        let mut fields = Fields::new();
        let mut errors = ValidationError::new();

        match field {
            LeadField::CreatedAt | LeadField::UpdatedAt => return Err(immutable(key)),
            LeadField::TotalPrice => return Ok(single_patch(key, price_value(key, raw)?)),
            LeadField::Status => {
                let status = LeadStatus::parse(raw).ok_or_else(|| {
                    ValidationError::single(key, format!("Unknown status '{}'", raw))
                })?;
                return Ok(single_patch(key, Value::String(status.as_str().to_string())));
            }
            LeadField::HandledBy => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(single_patch(key, Value::Null));
                }
                rules.check_handler(key, raw, &mut errors);
                errors.into_result()?;
                return Ok(single_patch(key, Value::String(raw.to_string())));
            }
            LeadField::ServiceStartDate | LeadField::ServiceEndDate => {
                require_date(&mut fields, &mut errors, key, "Date", raw)
            }
            LeadField::Notes | LeadField::CustomerAddress => optional_text(&mut fields, key, raw),
            LeadField::CustomerName
            | LeadField::CustomerContact
            | LeadField::ServiceProviderName
            | LeadField::ServiceProviderContact
            | LeadField::ServiceStartTime
            | LeadField::ServiceEndTime => {
                require_text(&mut fields, &mut errors, key, "Value", raw)
            }
        }

        errors.into_result()?;
        Ok(fields)
    }
}

/// Input of the new-lead form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLead {
    pub customer_name: String,
    pub customer_contact: String,
    pub customer_address: Option<String>,
    pub service_provider_name: String,
    pub service_provider_contact: String,
    pub service_start_date: String,
    pub service_end_date: String,
    pub service_start_time: String,
    pub service_end_time: String,
    pub notes: String,
    pub total_price: f64,
    pub handled_by: Option<String>,
}

impl Draft for NewLead {
    fn into_fields(self, rules: &EditRules) -> Result<Fields, ValidationError> {
        let mut fields = Fields::new();
        let mut errors = ValidationError::new();

        let required = [
            ("customer_name", "Customer name", &self.customer_name),
            ("customer_contact", "Customer contact", &self.customer_contact),
            ("service_provider_name", "Provider name", &self.service_provider_name),
            ("service_provider_contact", "Provider contact", &self.service_provider_contact),
            ("service_start_time", "Start time", &self.service_start_time),
            ("service_end_time", "End time", &self.service_end_time),
        ];
        for (key, label, value) in required {
            require_text(&mut fields, &mut errors, key, label, value);
        }
        for (key, label, value) in [
            ("service_start_date", "Start date", &self.service_start_date),
            ("service_end_date", "End date", &self.service_end_date),
        ] {
            require_date(&mut fields, &mut errors, key, label, value);
        }
        optional_text(&mut fields, "notes", &self.notes);

        match price_value("total_price", &self.total_price.to_string()) {
            Ok(price) => {
                fields.insert("total_price".to_string(), price);
            }
            Err(e) => errors.errors.extend(e.errors),
        }

        if let Some(address) = self.customer_address.as_deref().filter(|a| !a.trim().is_empty()) {
            optional_text(&mut fields, "customer_address", address);
        }

        if let Some(handler) = self.handled_by.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            rules.check_handler("handled_by", handler, &mut errors);
            fields.insert("handled_by".to_string(), Value::String(handler.to_string()));
        }

        errors.into_result()?;
        Ok(fields)
    }

    fn label(&self) -> String {
        format!("{} ({})", self.customer_name.trim(), self.service_provider_name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> NewLead {
        NewLead {
            customer_name: "John Doe".to_string(),
            customer_contact: "555-123-4567".to_string(),
            customer_address: None,
            service_provider_name: "Best Pet Care".to_string(),
            service_provider_contact: "555-987-6543".to_string(),
            service_start_date: "2026-10-22".to_string(),
            service_end_date: "2026-10-23".to_string(),
            service_start_time: "09:00".to_string(),
            service_end_time: "17:00".to_string(),
            notes: "Premium food only".to_string(),
            total_price: 150.0,
            handled_by: Some("Victoria".to_string()),
        }
    }

    fn rules() -> EditRules {
        EditRules::with_handlers(&["Victoria".to_string(), "Waiyee".to_string()])
    }

    #[test]
    fn test_status_round_trips_through_json() {
        for status in LeadStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, Value::String(status.as_str().to_string()));
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::parse("Done"), None);
    }

    #[test]
    fn test_status_stages() {
        assert_eq!(LeadStatus::Completed.stage(), Stage::Completed);
        assert_eq!(LeadStatus::Cancelled.stage(), Stage::Cancelled);
        assert_eq!(LeadStatus::ToReschedule.stage(), Stage::Open);
        assert!(LeadStatus::ReminderSent.is_reminder());
        assert!(!LeadStatus::PendingService.is_reminder());
    }

    #[test]
    fn test_valid_draft_produces_fields_without_status() {
        let fields = valid_draft().into_fields(&rules()).unwrap();
        assert_eq!(fields["customer_name"], "John Doe");
        assert_eq!(fields["total_price"], 150.0);
        assert_eq!(fields["handled_by"], "Victoria");
        assert!(!fields.contains_key("status"));
        assert!(!fields.contains_key("customer_address"));
    }

    #[test]
    fn test_draft_reports_every_missing_field() {
        let draft = NewLead {
            total_price: -5.0,
            ..NewLead::default()
        };
        let err = draft.into_fields(&rules()).unwrap_err();
        assert_eq!(err.message_for("customer_name"), Some("Customer name is required"));
        assert_eq!(err.message_for("service_start_date"), Some("Start date is required"));
        assert_eq!(err.message_for("total_price"), Some("Price must be positive"));
        assert_eq!(err.errors.len(), 9);
    }

    #[test]
    fn test_draft_rejects_bad_date_and_unknown_handler() {
        let mut draft = valid_draft();
        draft.service_end_date = "next week".to_string();
        draft.handled_by = Some("Mallory".to_string());
        let err = draft.into_fields(&rules()).unwrap_err();
        assert!(err.message_for("service_end_date").is_some());
        assert!(err.message_for("handled_by").unwrap().contains("Mallory"));
    }

    #[test]
    fn test_patch_for_converts_per_field() {
        let rules = rules();
        let patch = Lead::patch_for(LeadField::TotalPrice, "99.5", &rules).unwrap();
        assert_eq!(patch["total_price"], 99.5);

        let patch = Lead::patch_for(LeadField::Status, "Completed", &rules).unwrap();
        assert_eq!(patch["status"], "Completed");

        let patch = Lead::patch_for(LeadField::HandledBy, "  ", &rules).unwrap();
        assert_eq!(patch["handled_by"], Value::Null);

        let patch =
            Lead::patch_for(LeadField::ServiceStartDate, "2026-11-01T00:00:00Z", &rules).unwrap();
        assert_eq!(patch["service_start_date"], "2026-11-01");

        assert!(Lead::patch_for(LeadField::TotalPrice, "free", &rules).is_err());
        assert!(Lead::patch_for(LeadField::Status, "Done", &rules).is_err());
        assert!(Lead::patch_for(LeadField::CustomerName, " ", &rules).is_err());
        assert!(Lead::patch_for(LeadField::CreatedAt, "2026-01-01", &rules).is_err());
        assert!(Lead::patch_for(LeadField::HandledBy, "Mallory", &rules).is_err());
    }

    #[test]
    fn test_lead_decodes_from_document_json() {
        let json = serde_json::json!({
            "id": "abc",
            "customer_name": "Jane Smith",
            "service_provider_name": "Paws & Claws",
            "service_start_date": "2026-10-20",
            "service_end_date": "2026-10-21",
            "total_price": 80,
            "status": "Pending Service",
            "createdAt": "2026-10-01T10:30:00Z",
            "updatedAt": "2026-10-01T10:30:00Z"
        });
        let lead: Lead = serde_json::from_value(json).unwrap();
        assert_eq!(lead.status, LeadStatus::PendingService);
        assert_eq!(lead.total_price, 80.0);
        assert_eq!(lead.handled_by, None);
        assert_eq!(lead.field_value(LeadField::TotalPrice).unwrap(), "80");
        assert_eq!(lead.field_value(LeadField::Notes), None);
        assert_eq!(lead.label(), "Jane Smith (Paws & Claws)");
    }
}
