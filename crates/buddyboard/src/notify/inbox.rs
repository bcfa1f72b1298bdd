use serde_json::Value;

use crate::error::{BuddyboardError, Result};
use crate::gateway::PersistenceGateway;
use crate::record::{Fields, Notification, Record};

/// The notification list shown in the navbar dropdown.
#[derive(Clone)]
pub struct NotificationInbox {
    gateway: PersistenceGateway,
}

fn read_patch() -> Fields {
    let mut patch = Fields::new();
    patch.insert("isRead".to_string(), Value::Bool(true));
    patch
}

fn not_found(id: &str) -> BuddyboardError {
    BuddyboardError::NotFound {
        collection: Notification::COLLECTION.to_string(),
        id: id.to_string(),
    }
}

impl NotificationInbox {
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Every notification, newest first.
    pub async fn all(&self) -> Result<Vec<Notification>> {
        Ok(self.gateway.list_as::<Notification>().await?)
    }

    pub async fn unread(&self) -> Result<Vec<Notification>> {
        let mut all = self.all().await?;
        all.retain(|n| !n.is_read);
        Ok(all)
    }

    pub async fn unread_count(&self) -> Result<usize> {
        Ok(self.unread().await?.len())
    }

    pub async fn mark_read(&self, id: &str) -> Result<Notification> {
        self.gateway
            .update_as::<Notification>(id, read_patch())
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Marks every unread notification read. Returns how many changed.
    pub async fn mark_all_read(&self) -> Result<usize> {
        let mut changed = 0;
        for notification in self.unread().await? {
            if self
                .gateway
                .update(Notification::COLLECTION, &notification.id, read_patch())
                .await?
                .is_some()
            {
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.gateway.delete(Notification::COLLECTION, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
