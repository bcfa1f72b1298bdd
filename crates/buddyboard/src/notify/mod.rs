//! Notification sink and inbox.
//!
//! Notifications are emitted after significant mutations. Delivery is best
//! effort: a failing sink is logged and never fails the mutation itself.

use async_trait::async_trait;
use serde_json::Value;

use crate::gateway::{GatewayError, PersistenceGateway};
use crate::record::{Fields, Notification, Record};

pub mod inbox;

pub use inbox::NotificationInbox;

/// Receives user-facing notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: &str, related_id: Option<&str>) -> Result<(), GatewayError>;
}

/// Sends a notification, logging instead of returning a failure.
pub async fn notify_best_effort(
    sink: &dyn NotificationSink,
    message: &str,
    related_id: Option<&str>,
) {
    if let Err(e) = sink.notify(message, related_id).await {
        log::warn!("Notification '{}' not delivered: {}", message, e);
    }
}

/// Stores notifications as documents in the `notifications` collection.
#[derive(Clone)]
pub struct GatewayNotifier {
    gateway: PersistenceGateway,
}

impl GatewayNotifier {
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl NotificationSink for GatewayNotifier {
    async fn notify(&self, message: &str, related_id: Option<&str>) -> Result<(), GatewayError> {
        let mut fields = Fields::new();
        fields.insert("message".to_string(), Value::String(message.to_string()));
        fields.insert("isRead".to_string(), Value::Bool(false));
        if let Some(id) = related_id {
            fields.insert("relatedId".to_string(), Value::String(id.to_string()));
        }
        self.gateway.create(Notification::COLLECTION, fields).await?;
        Ok(())
    }
}
