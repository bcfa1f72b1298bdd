//! The gateway the rest of the crate persists through.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use super::{
    is_local_id, strip_envelope, DocumentStore, GatewayError, LocalCache, StoreError,
    StoredDocument,
};
use crate::record::{Fields, Record};

/// Remote-first persistence with a local cache fallback.
///
/// Transient store failures are absorbed: the operation is served from the
/// cache and the caller sees a success. Every other failure is returned.
#[derive(Clone)]
pub struct PersistenceGateway {
    remote: Arc<dyn DocumentStore>,
    cache: LocalCache,
}

impl PersistenceGateway {
    pub fn new(remote: Arc<dyn DocumentStore>, cache: LocalCache) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Documents of `collection`, newest first.
    ///
    /// A successful remote list refreshes the cache and includes records
    /// still waiting in the cache under a local id.
    pub async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, GatewayError> {
        self.list_inner(collection)
            .instrument(info_span!("gateway.list", collection))
            .await
    }

    pub async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<StoredDocument>, GatewayError> {
        if is_local_id(id) {
            return Ok(self.cache.get(collection, id)?);
        }
        match self.remote.get(collection, id).await {
            Ok(doc) => Ok(doc),
            Err(e) => {
                fallback_or_fail(collection, "get", e)?;
                Ok(self.cache.get(collection, id)?)
            }
        }
    }

    /// Creates a document. While the store is down the document is kept in
    /// the cache under a local id.
    pub async fn create(
        &self,
        collection: &str,
        mut fields: Fields,
    ) -> Result<StoredDocument, GatewayError> {
        strip_envelope(&mut fields);
        self.create_inner(collection, fields)
            .instrument(info_span!("gateway.create", collection))
            .await
    }

    /// Merges `patch` into a document. `None` when the id does not exist.
    ///
    /// Local ids are updated in the cache only.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        mut patch: Fields,
    ) -> Result<Option<StoredDocument>, GatewayError> {
        strip_envelope(&mut patch);
        self.update_inner(collection, id, patch)
            .instrument(info_span!("gateway.update", collection, id))
            .await
    }

    /// Removes a document permanently. `false` when the id does not exist.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, GatewayError> {
        self.delete_inner(collection, id)
            .instrument(info_span!("gateway.delete", collection, id))
            .await
    }

    async fn list_inner(&self, collection: &str) -> Result<Vec<StoredDocument>, GatewayError> {
        match self.remote.list(collection).await {
            Ok(docs) => {
                if let Err(e) = self.cache.mirror(collection, &docs) {
                    log::warn!("Failed to refresh cache for '{}': {}", collection, e);
                }
                let local = self.cache.list_local(collection).unwrap_or_else(|e| {
                    log::warn!("Failed to read local records of '{}': {}", collection, e);
                    Vec::new()
                });
                Ok(merge_newest_first(local, docs))
            }
            Err(e) => {
                let e = fallback_or_fail(collection, "list", e)?;
                log::warn!("Listing '{}' from local cache: {}", collection, e);
                Ok(self.cache.list(collection)?)
            }
        }
    }

    async fn create_inner(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<StoredDocument, GatewayError> {
        match self.remote.create(collection, fields.clone()).await {
            Ok(doc) => {
                self.cache_copy(collection, &doc);
                log::info!("Created {}/{}", collection, doc.id);
                Ok(doc)
            }
            Err(e) => {
                let e = fallback_or_fail(collection, "create", e)?;
                let doc = self.cache.create_local(collection, fields)?;
                log::warn!(
                    "Created {}/{} locally, store unavailable: {}",
                    collection,
                    doc.id,
                    e
                );
                Ok(doc)
            }
        }
    }

    async fn update_inner(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<StoredDocument>, GatewayError> {
        if is_local_id(id) {
            return Ok(self.cache.update(collection, id, patch)?);
        }
        match self.remote.update(collection, id, patch.clone()).await {
            Ok(Some(doc)) => {
                self.cache_copy(collection, &doc);
                Ok(Some(doc))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                let e = fallback_or_fail(collection, "update", e)?;
                log::warn!("Updating {}/{} in local cache: {}", collection, id, e);
                Ok(self.cache.update(collection, id, patch)?)
            }
        }
    }

    async fn delete_inner(&self, collection: &str, id: &str) -> Result<bool, GatewayError> {
        if is_local_id(id) {
            return Ok(self.cache.delete(collection, id)?);
        }
        match self.remote.delete(collection, id).await {
            Ok(deleted) => {
                if let Err(e) = self.cache.delete(collection, id) {
                    log::warn!("Failed to drop cached {}/{}: {}", collection, id, e);
                }
                Ok(deleted)
            }
            Err(e) => {
                let e = fallback_or_fail(collection, "delete", e)?;
                log::warn!("Deleting {}/{} from local cache: {}", collection, id, e);
                Ok(self.cache.delete(collection, id)?)
            }
        }
    }

    /// Typed [`list`](Self::list). Documents that do not decode as `T` are
    /// logged and skipped.
    pub async fn list_as<T: Record>(&self) -> Result<Vec<T>, GatewayError> {
        let docs = self.list(T::COLLECTION).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match doc.decode::<T>(T::COLLECTION) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping document: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn get_as<T: Record>(&self, id: &str) -> Result<Option<T>, GatewayError> {
        self.get(T::COLLECTION, id)
            .await?
            .map(|doc| doc.decode(T::COLLECTION))
            .transpose()
    }

    pub async fn create_as<T: Record>(&self, fields: Fields) -> Result<T, GatewayError> {
        self.create(T::COLLECTION, fields)
            .await?
            .decode(T::COLLECTION)
    }

    pub async fn update_as<T: Record>(
        &self,
        id: &str,
        patch: Fields,
    ) -> Result<Option<T>, GatewayError> {
        self.update(T::COLLECTION, id, patch)
            .await?
            .map(|doc| doc.decode(T::COLLECTION))
            .transpose()
    }

    fn cache_copy(&self, collection: &str, doc: &StoredDocument) {
        if let Err(e) = self.cache.put(collection, doc) {
            log::warn!("Failed to cache {}/{}: {}", collection, doc.id, e);
        }
    }
}

/// Passes transient errors back for a cache fallback; fails on the rest.
fn fallback_or_fail(collection: &str, op: &str, e: StoreError) -> Result<StoreError, GatewayError> {
    if e.is_transient() {
        Ok(e)
    } else {
        log::error!("Store {} on '{}' failed: {}", op, collection, e);
        Err(GatewayError::Remote(e))
    }
}

fn merge_newest_first(
    local: Vec<StoredDocument>,
    remote: Vec<StoredDocument>,
) -> Vec<StoredDocument> {
    if local.is_empty() {
        return remote;
    }
    let mut merged = local;
    merged.extend(remote);
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}
