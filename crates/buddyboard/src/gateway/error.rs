//! Persistence error types.

use thiserror::Error;

use crate::db::DatabaseError;

/// Errors reported by a [`DocumentStore`](super::DocumentStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached. The gateway falls back to the local
    /// cache on this error.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document store database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Document could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the failure is an I/O-level outage rather than a rejected request.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Errors surfaced by the [`PersistenceGateway`](super::PersistenceGateway).
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Remote store failed: {0}")]
    Remote(#[source] StoreError),

    #[error("Local cache failed: {0}")]
    Cache(#[from] DatabaseError),

    #[error("Document '{id}' in '{collection}' does not match its record type: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
