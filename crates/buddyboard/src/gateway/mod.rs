//! Persistence gateway: CRUD over named document collections.
//!
//! A [`DocumentStore`] is the remote side (the shared document database). The
//! [`LocalCache`] is a durable on-disk copy used when the store is
//! unreachable. [`PersistenceGateway`] combines the two: reads and writes go
//! to the store first and fall back to the cache on transient failures.
//! Records created while offline get a `local-` id and never go remote.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::db::document_repo::{self, DocumentRow};
use crate::db::{Database, DatabaseError};
use crate::record::{Fields, CREATED_AT_KEY, ID_KEY, UPDATED_AT_KEY};

pub mod cache;
pub mod error;
pub mod persistence;
pub mod sqlite;

pub use cache::{is_local_id, LocalCache, LOCAL_ID_PREFIX};
pub use error::{GatewayError, StoreError};
pub use persistence::PersistenceGateway;
pub use sqlite::SqliteStore;

const STATUS_KEY: &str = "status";

/// A stored document: the persistence envelope plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Document fields, never containing the envelope keys.
    pub fields: Fields,
}

impl StoredDocument {
    /// The document as one JSON object, envelope keys included.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
        map.insert(
            CREATED_AT_KEY.to_string(),
            Value::String(format_timestamp(self.created_at)),
        );
        map.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(format_timestamp(self.updated_at)),
        );
        Value::Object(map)
    }

    /// Decodes the document into a typed record.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, GatewayError> {
        serde_json::from_value(self.to_value()).map_err(|source| GatewayError::Decode {
            collection: collection.to_string(),
            id: self.id.clone(),
            source,
        })
    }

    pub(crate) fn from_row(row: DocumentRow) -> Result<Self, DatabaseError> {
        let mut fields: Fields = serde_json::from_str(&row.body)?;
        strip_envelope(&mut fields);
        Ok(Self {
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            fields,
        })
    }

    pub(crate) fn to_row(&self, collection: &str) -> Result<DocumentRow, DatabaseError> {
        Ok(DocumentRow {
            collection: collection.to_string(),
            id: self.id.clone(),
            body: serde_json::to_string(&self.fields)?,
            created_at: format_timestamp(self.created_at),
            updated_at: format_timestamp(self.updated_at),
        })
    }
}

/// The remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection`, newest first.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Creates a document, assigning its id, timestamps and default status.
    async fn create(&self, collection: &str, fields: Fields) -> Result<StoredDocument, StoreError>;

    /// Merges `patch` into a document and bumps `updatedAt`. `None` when the
    /// id does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Removes a document permanently. `false` when the id does not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}

/// Default status assigned on create when the caller omits one.
#[derive(Debug, Clone, Default)]
pub struct CollectionDefaults {
    statuses: HashMap<String, String>,
}

impl CollectionDefaults {
    /// Defaults of the built-in collections.
    pub fn standard() -> Self {
        Self::default()
            .with_status("leads", "Pending Service")
            .with_status("redemptions", "To Redeem")
    }

    pub fn with_status(mut self, collection: &str, status: &str) -> Self {
        self.statuses
            .insert(collection.to_string(), status.to_string());
        self
    }

    pub fn default_status(&self, collection: &str) -> Option<&str> {
        self.statuses.get(collection).map(String::as_str)
    }

    fn apply(&self, collection: &str, fields: &mut Fields) {
        if fields.contains_key(STATUS_KEY) {
            return;
        }
        if let Some(status) = self.default_status(collection) {
            fields.insert(STATUS_KEY.to_string(), Value::String(status.to_string()));
        }
    }
}

/// Removes caller-supplied envelope keys; the persistence layer owns them.
pub(crate) fn strip_envelope(fields: &mut Fields) {
    fields.remove(ID_KEY);
    fields.remove(CREATED_AT_KEY);
    fields.remove(UPDATED_AT_KEY);
}

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DatabaseError::Timestamp {
            value: value.to_string(),
            source,
        })
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly later than `previous`, at stored precision.
fn bumped(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Inserts a new document with the given id into `db`.
pub(crate) fn insert_document(
    db: &Database,
    defaults: &CollectionDefaults,
    collection: &str,
    id: String,
    mut fields: Fields,
) -> Result<StoredDocument, DatabaseError> {
    strip_envelope(&mut fields);
    defaults.apply(collection, &mut fields);
    let ts = now();
    let doc = StoredDocument {
        id,
        created_at: ts,
        updated_at: ts,
        fields,
    };
    document_repo::insert(db, &doc.to_row(collection)?)?;
    Ok(doc)
}

/// Merges `patch` into a stored document and bumps its `updated_at`.
pub(crate) fn patch_document(
    db: &Database,
    collection: &str,
    id: &str,
    mut patch: Fields,
) -> Result<Option<StoredDocument>, DatabaseError> {
    let Some(row) = document_repo::find_by_id(db, collection, id)? else {
        return Ok(None);
    };
    strip_envelope(&mut patch);
    let mut doc = StoredDocument::from_row(row)?;
    doc.fields.extend(patch);
    doc.updated_at = bumped(doc.updated_at);

    let body = serde_json::to_string(&doc.fields)?;
    let updated_at = format_timestamp(doc.updated_at);
    if !document_repo::update_body(db, collection, id, &body, &updated_at)? {
        return Ok(None);
    }
    Ok(Some(doc))
}

pub(crate) fn list_documents(
    db: &Database,
    collection: &str,
) -> Result<Vec<StoredDocument>, DatabaseError> {
    document_repo::list(db, collection)?
        .into_iter()
        .map(StoredDocument::from_row)
        .collect()
}

pub(crate) fn find_document(
    db: &Database,
    collection: &str,
    id: &str,
) -> Result<Option<StoredDocument>, DatabaseError> {
    document_repo::find_by_id(db, collection, id)?
        .map(StoredDocument::from_row)
        .transpose()
}
