//! Birthday perk redemptions.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    immutable, optional_text, require_date, require_text, single_patch, Draft, EditRules, Fields,
    Record, Tracked,
};
use crate::classifier::{Classifiable, Stage};
use crate::error::ValidationError;
use crate::table::{FieldKind, TableField, Tabular};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionStatus {
    #[serde(rename = "To Redeem")]
    ToRedeem,
    #[serde(rename = "Redeemed")]
    Redeemed,
    #[serde(rename = "Expired")]
    Expired,
}

impl RedemptionStatus {
    pub const ALL: [RedemptionStatus; 3] = [
        RedemptionStatus::ToRedeem,
        RedemptionStatus::Redeemed,
        RedemptionStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RedemptionStatus::ToRedeem => "To Redeem",
            RedemptionStatus::Redeemed => "Redeemed",
            RedemptionStatus::Expired => "Expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn stage(self) -> Stage {
        match self {
            RedemptionStatus::Redeemed => Stage::Completed,
            RedemptionStatus::Expired => Stage::Cancelled,
            RedemptionStatus::ToRedeem => Stage::Open,
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    /// Birthday month label, e.g. `"October"`.
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub perks: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub redemption_link: String,
    #[serde(default)]
    pub sign_up_link: String,
    #[serde(default)]
    pub notes: String,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedemptionField {
    Month,
    DateFrom,
    DateTo,
    Name,
    Perks,
    ContactNumber,
    EmailAddress,
    Terms,
    RedemptionLink,
    SignUpLink,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl TableField for RedemptionField {
    fn kind(self) -> FieldKind {
        match self {
            RedemptionField::DateFrom
            | RedemptionField::DateTo
            | RedemptionField::CreatedAt
            | RedemptionField::UpdatedAt => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    fn key(self) -> &'static str {
        match self {
            RedemptionField::Month => "month",
            RedemptionField::DateFrom => "dateFrom",
            RedemptionField::DateTo => "dateTo",
            RedemptionField::Name => "name",
            RedemptionField::Perks => "perks",
            RedemptionField::ContactNumber => "contactNumber",
            RedemptionField::EmailAddress => "emailAddress",
            RedemptionField::Terms => "terms",
            RedemptionField::RedemptionLink => "redemptionLink",
            RedemptionField::SignUpLink => "signUpLink",
            RedemptionField::Notes => "notes",
            RedemptionField::Status => "status",
            RedemptionField::CreatedAt => "createdAt",
            RedemptionField::UpdatedAt => "updatedAt",
        }
    }
}

impl Tabular for Redemption {
    type Field = RedemptionField;

    fn field_value(&self, field: RedemptionField) -> Option<Cow<'_, str>> {
        let text = match field {
            RedemptionField::Month => &self.month,
            RedemptionField::DateFrom => &self.date_from,
            RedemptionField::DateTo => &self.date_to,
            RedemptionField::Name => &self.name,
            RedemptionField::Perks => &self.perks,
            RedemptionField::ContactNumber => &self.contact_number,
            RedemptionField::EmailAddress => &self.email_address,
            RedemptionField::Terms => &self.terms,
            RedemptionField::RedemptionLink => &self.redemption_link,
            RedemptionField::SignUpLink => &self.sign_up_link,
            RedemptionField::Notes => &self.notes,
            RedemptionField::Status => return Some(Cow::Borrowed(self.status.as_str())),
            RedemptionField::CreatedAt => return Some(Cow::Owned(self.created_at.to_rfc3339())),
            RedemptionField::UpdatedAt => return Some(Cow::Owned(self.updated_at.to_rfc3339())),
        };
        (!text.is_empty()).then_some(Cow::Borrowed(text.as_str()))
    }
}

impl Classifiable for Redemption {
    fn primary_date(&self) -> &str {
        &self.date_from
    }

    fn secondary_date(&self) -> &str {
        &self.date_to
    }

    fn stage(&self) -> Stage {
        self.status.stage()
    }
}

impl Record for Redemption {
    const COLLECTION: &'static str = "redemptions";
    const NOUN: &'static str = "redemption";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl Tracked for Redemption {
    type Status = RedemptionStatus;

    fn status(&self) -> RedemptionStatus {
        self.status
    }

    fn patch_for(
        field: RedemptionField,
        raw: &str,
        _rules: &EditRules,
    ) -> Result<Fields, ValidationError> {
        let key = field.key();
        let mut fields = Fields::new();
        let mut errors = ValidationError::new();

        match field {
            RedemptionField::CreatedAt | RedemptionField::UpdatedAt => return Err(immutable(key)),
            RedemptionField::Status => {
                let status = RedemptionStatus::parse(raw).ok_or_else(|| {
                    ValidationError::single(key, format!("Unknown status '{}'", raw))
                })?;
                return Ok(single_patch(key, Value::String(status.as_str().to_string())));
            }
            RedemptionField::DateFrom | RedemptionField::DateTo => {
                require_date(&mut fields, &mut errors, key, "Date", raw)
            }
            RedemptionField::Month | RedemptionField::Name | RedemptionField::Perks => {
                require_text(&mut fields, &mut errors, key, "Value", raw)
            }
            RedemptionField::ContactNumber
            | RedemptionField::EmailAddress
            | RedemptionField::Terms
            | RedemptionField::RedemptionLink
            | RedemptionField::SignUpLink
            | RedemptionField::Notes => optional_text(&mut fields, key, raw),
        }

        errors.into_result()?;
        Ok(fields)
    }
}

/// Input of the new-redemption form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRedemption {
    pub month: String,
    pub date_from: String,
    pub date_to: String,
    pub name: String,
    pub perks: String,
    pub contact_number: String,
    pub email_address: String,
    pub terms: String,
    pub redemption_link: String,
    pub sign_up_link: String,
    pub notes: String,
}

impl Draft for NewRedemption {
    fn into_fields(self, _rules: &EditRules) -> Result<Fields, ValidationError> {
        let mut fields = Fields::new();
        let mut errors = ValidationError::new();

        require_text(&mut fields, &mut errors, "month", "Month", &self.month);
        require_date(&mut fields, &mut errors, "dateFrom", "Date from", &self.date_from);
        require_date(&mut fields, &mut errors, "dateTo", "Date to", &self.date_to);
        require_text(&mut fields, &mut errors, "name", "Name", &self.name);
        require_text(&mut fields, &mut errors, "perks", "Perks", &self.perks);

        let optional = [
            ("contactNumber", &self.contact_number),
            ("emailAddress", &self.email_address),
            ("terms", &self.terms),
            ("redemptionLink", &self.redemption_link),
            ("signUpLink", &self.sign_up_link),
            ("notes", &self.notes),
        ];
        for (key, value) in optional {
            optional_text(&mut fields, key, value);
        }

        errors.into_result()?;
        Ok(fields)
    }

    fn label(&self) -> String {
        self.name.trim().to_string()
    }
}
