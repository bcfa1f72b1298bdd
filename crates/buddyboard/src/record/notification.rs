use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// An entry in the notification inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "read")]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Notification {
    const COLLECTION: &'static str = "notifications";
    const NOUN: &'static str = "notification";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_legacy_read_key() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n1",
            "message": "Lead created",
            "read": true,
            "createdAt": "2026-10-19T09:00:00Z",
            "updatedAt": "2026-10-19T09:00:00Z"
        }))
        .unwrap();
        assert!(n.is_read);
        assert_eq!(n.related_id, None);
        assert_eq!(n.label(), "Lead created");
    }

    #[test]
    fn test_unread_by_default() {
        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n2",
            "title": "Reminder",
            "message": "Send reminder to John Doe",
            "relatedId": "abc",
            "createdAt": "2026-10-19T09:00:00Z",
            "updatedAt": "2026-10-19T09:00:00Z"
        }))
        .unwrap();
        assert!(!n.is_read);
        assert_eq!(n.related_id.as_deref(), Some("abc"));
        assert_eq!(n.label(), "Reminder");
    }
}
