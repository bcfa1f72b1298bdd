//! Tracked record types and the traits the rest of the crate works through.

use std::fmt::{Debug, Display};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::classifier::Classifiable;
use crate::dates::parse_date;
use crate::error::ValidationError;
use crate::table::Tabular;

pub mod lead;
pub mod notification;
pub mod redemption;

pub use lead::{Lead, LeadField, LeadStatus, NewLead};
pub use notification::Notification;
pub use redemption::{NewRedemption, Redemption, RedemptionField, RedemptionStatus};

/// A JSON object of document fields.
pub type Fields = serde_json::Map<String, Value>;

/// Document envelope keys assigned by the persistence layer.
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "createdAt";
pub const UPDATED_AT_KEY: &str = "updatedAt";

/// A record stored in a named collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    const COLLECTION: &'static str;
    /// Singular noun used in user-facing messages.
    const NOUN: &'static str;

    fn id(&self) -> &str;

    /// Short human-readable label used in notifications.
    fn label(&self) -> String;
}

/// A record shown on a board: classifiable, tabular and editable inline.
pub trait Tracked: Record + Classifiable + Tabular {
    type Status: Copy + PartialEq + Debug + Display + Serialize + Send + Sync;

    fn status(&self) -> Self::Status;

    /// Converts an inline cell edit into a document patch.
    fn patch_for(
        field: Self::Field,
        raw: &str,
        rules: &EditRules,
    ) -> Result<Fields, ValidationError>;
}

/// Input of a create form.
pub trait Draft {
    /// Validates the draft and returns the fields to create.
    fn into_fields(self, rules: &EditRules) -> Result<Fields, ValidationError>;

    fn label(&self) -> String;
}

/// Deployment-specific constraints on user input.
#[derive(Debug, Clone, Default)]
pub struct EditRules {
    /// Allowed owner labels. Empty means unrestricted.
    pub handlers: Vec<String>,
}

impl EditRules {
    pub fn with_handlers(handlers: &[String]) -> Self {
        Self {
            handlers: handlers.to_vec(),
        }
    }

    pub(crate) fn check_handler(&self, field: &str, value: &str, errors: &mut ValidationError) {
        if !self.handlers.is_empty() && !self.handlers.iter().any(|h| h == value) {
            errors.push(
                field,
                format!(
                    "Unknown handler '{}'; expected one of {}",
                    value,
                    self.handlers.join(", ")
                ),
            );
        }
    }
}

pub(crate) fn require_text(
    fields: &mut Fields,
    errors: &mut ValidationError,
    key: &str,
    label: &str,
    value: &str,
) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(key, format!("{} is required", label));
    } else {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
}

pub(crate) fn require_date(
    fields: &mut Fields,
    errors: &mut ValidationError,
    key: &str,
    label: &str,
    value: &str,
) {
    if value.trim().is_empty() {
        errors.push(key, format!("{} is required", label));
        return;
    }
    match parse_date(value) {
        Some(date) => {
            fields.insert(key.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
        }
        None => errors.push(key, format!("{} must be a date (YYYY-MM-DD)", label)),
    }
}

pub(crate) fn optional_text(fields: &mut Fields, key: &str, value: &str) {
    fields.insert(key.to_string(), Value::String(value.trim().to_string()));
}

pub(crate) fn single_patch(key: &str, value: Value) -> Fields {
    let mut fields = Fields::new();
    fields.insert(key.to_string(), value);
    fields
}

pub(crate) fn immutable(key: &str) -> ValidationError {
    ValidationError::single(key, "This field cannot be edited")
}
