//! Test harness with a controllable document store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use buddyboard::board::Board;
use buddyboard::db::Database;
use buddyboard::gateway::{
    CollectionDefaults, DocumentStore, GatewayError, LocalCache, PersistenceGateway, SqliteStore,
    StoreError, StoredDocument,
};
use buddyboard::notify::NotificationSink;
use buddyboard::record::{EditRules, Fields, Lead, Redemption};

/// A document store that can be taken offline or made to reject updates.
pub struct FlakyStore {
    inner: SqliteStore,
    offline: AtomicBool,
    failing_updates: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::new(
                Database::open_in_memory().expect("in-memory store"),
                CollectionDefaults::standard(),
            ),
            offline: AtomicBool::new(false),
            failing_updates: Mutex::new(HashSet::new()),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes every update of `id` fail with a non-transient error.
    pub fn fail_updates_of(&self, id: &str) {
        self.failing_updates
            .lock()
            .expect("lock")
            .insert(id.to_string());
    }

    /// Reads straight from the backing store, bypassing the offline switch.
    pub async fn raw_get(&self, collection: &str, id: &str) -> Option<StoredDocument> {
        self.inner.get(collection, id).await.expect("raw get")
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.check()?;
        self.inner.list(collection).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.check()?;
        self.inner.get(collection, id).await
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<StoredDocument, StoreError> {
        self.check()?;
        self.inner.create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.check()?;
        if self.failing_updates.lock().expect("lock").contains(id) {
            return Err(StoreError::Encode(
                serde_json::from_str::<u8>("\"rejected\"").unwrap_err(),
            ));
        }
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.delete(collection, id).await
    }
}

/// A notification sink that records messages, and can be made to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Option<String>)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn related_ids(&self) -> Vec<Option<String>> {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, message: &str, related_id: Option<&str>) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote(StoreError::Unavailable(
                "notifications down".to_string(),
            )));
        }
        self.messages
            .lock()
            .expect("lock")
            .push((message.to_string(), related_id.map(str::to_string)));
        Ok(())
    }
}

/// A gateway over a [`FlakyStore`] and a fresh in-memory cache.
pub struct TestHarness {
    pub store: Arc<FlakyStore>,
    pub gateway: PersistenceGateway,
    pub notifier: Arc<RecordingNotifier>,
    pub rules: EditRules,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::new());
        let cache =
            LocalCache::open_in_memory(CollectionDefaults::standard()).expect("in-memory cache");
        let gateway = PersistenceGateway::new(store.clone(), cache);
        Self {
            store,
            gateway,
            notifier: Arc::new(RecordingNotifier::default()),
            rules: EditRules::with_handlers(&["Victoria".to_string(), "Waiyee".to_string()]),
        }
    }

    pub async fn lead_board(&self) -> Board<Lead> {
        Board::load(
            self.gateway.clone(),
            self.notifier.clone(),
            self.rules.clone(),
        )
        .await
        .expect("load leads")
    }

    pub async fn redemption_board(&self) -> Board<Redemption> {
        Board::load(
            self.gateway.clone(),
            self.notifier.clone(),
            self.rules.clone(),
        )
        .await
        .expect("load redemptions")
    }
}
