//! SQLite-backed document store.

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    find_document, insert_document, list_documents, patch_document, CollectionDefaults,
    DocumentStore, StoreError, StoredDocument,
};
use crate::db::{document_repo, Database};
use crate::record::Fields;

/// A [`DocumentStore`] over a shared SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    defaults: CollectionDefaults,
}

impl SqliteStore {
    pub fn new(db: Database, defaults: CollectionDefaults) -> Self {
        Self { db, defaults }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(list_documents(&self.db, collection)?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(find_document(&self.db, collection, id)?)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<StoredDocument, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let doc = insert_document(&self.db, &self.defaults, collection, id, fields)?;
        log::debug!("Created {}/{}", collection, doc.id);
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<StoredDocument>, StoreError> {
        Ok(patch_document(&self.db, collection, id, patch)?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(document_repo::delete(&self.db, collection, id)?)
    }
}
