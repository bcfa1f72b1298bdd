//! Durable local cache used while the document store is unreachable.

use std::path::Path;

use uuid::Uuid;

use super::{
    find_document, insert_document, list_documents, patch_document, CollectionDefaults,
    StoredDocument,
};
use crate::db::{document_repo, Database, DatabaseError};
use crate::record::Fields;

/// Id prefix of records that only exist in the local cache.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Whether `id` was generated locally and has no remote counterpart.
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Mirror of the remote collections plus the records created offline.
///
/// The cache is created once at startup and handed to the gateway; tests use
/// a fresh in-memory instance each.
#[derive(Clone)]
pub struct LocalCache {
    db: Database,
    defaults: CollectionDefaults,
}

impl LocalCache {
    pub fn new(db: Database, defaults: CollectionDefaults) -> Self {
        Self { db, defaults }
    }

    pub fn open(path: &Path, defaults: CollectionDefaults) -> Result<Self, DatabaseError> {
        Ok(Self::new(Database::open(path)?, defaults))
    }

    pub fn open_in_memory(defaults: CollectionDefaults) -> Result<Self, DatabaseError> {
        Ok(Self::new(Database::open_in_memory()?, defaults))
    }

    /// Cached and local-only documents of `collection`, newest first.
    pub fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, DatabaseError> {
        list_documents(&self.db, collection)
    }

    /// Only the documents created offline.
    pub fn list_local(&self, collection: &str) -> Result<Vec<StoredDocument>, DatabaseError> {
        document_repo::list_with_id_prefix(&self.db, collection, LOCAL_ID_PREFIX)?
            .into_iter()
            .map(StoredDocument::from_row)
            .collect()
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DatabaseError> {
        find_document(&self.db, collection, id)
    }

    /// Creates a document under a fresh `local-` id.
    pub fn create_local(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<StoredDocument, DatabaseError> {
        let id = format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4().simple());
        insert_document(&self.db, &self.defaults, collection, id, fields)
    }

    pub fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<StoredDocument>, DatabaseError> {
        patch_document(&self.db, collection, id, patch)
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        document_repo::delete(&self.db, collection, id)
    }

    /// Stores a copy of a remote document.
    pub fn put(&self, collection: &str, doc: &StoredDocument) -> Result<(), DatabaseError> {
        document_repo::upsert(&self.db, &doc.to_row(collection)?)
    }

    /// Replaces the cached remote documents of `collection` with `docs`,
    /// keeping local-only ones.
    pub fn mirror(&self, collection: &str, docs: &[StoredDocument]) -> Result<(), DatabaseError> {
        let rows = docs
            .iter()
            .map(|d| d.to_row(collection))
            .collect::<Result<Vec<_>, _>>()?;
        document_repo::replace_except_prefix(&self.db, collection, LOCAL_ID_PREFIX, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> LocalCache {
        LocalCache::open_in_memory(CollectionDefaults::standard()).unwrap()
    }

    fn remote_doc(id: &str) -> StoredDocument {
        let ts = chrono::Utc::now();
        StoredDocument {
            id: id.to_string(),
            created_at: ts,
            updated_at: ts,
            fields: json!({"status": "Pending Service"}).as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_local_ids_are_prefixed() {
        let cache = cache();
        let doc = cache.create_local("leads", Fields::new()).unwrap();
        assert!(is_local_id(&doc.id));
        assert_eq!(doc.fields["status"], "Pending Service");
        assert!(!is_local_id("3f2a9c"));
    }

    #[test]
    fn test_mirror_keeps_local_only_documents() {
        let cache = cache();
        let local = cache.create_local("leads", Fields::new()).unwrap();
        cache.mirror("leads", &[remote_doc("a"), remote_doc("b")]).unwrap();
        cache.mirror("leads", &[remote_doc("c")]).unwrap();

        let mut ids: Vec<String> = cache.list("leads").unwrap().into_iter().map(|d| d.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["c".to_string(), local.id.clone()]);

        let local_only = cache.list_local("leads").unwrap();
        assert_eq!(local_only.len(), 1);
        assert_eq!(local_only[0].id, local.id);
    }

    #[test]
    fn test_put_then_update_and_delete() {
        let cache = cache();
        cache.put("leads", &remote_doc("a")).unwrap();
        let updated = cache
            .update("leads", "a", json!({"notes": "offline"}).as_object().cloned().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(updated.fields["notes"], "offline");
        assert!(cache.delete("leads", "a").unwrap());
        assert!(cache.get("leads", "a").unwrap().is_none());
    }

    #[test]
    fn test_durable_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let id = {
            let cache = LocalCache::open(&path, CollectionDefaults::standard()).unwrap();
            cache.create_local("leads", Fields::new()).unwrap().id
        };
        let reopened = LocalCache::open(&path, CollectionDefaults::standard()).unwrap();
        assert!(reopened.get("leads", &id).unwrap().is_some());
    }
}
