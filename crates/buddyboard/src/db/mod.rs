//! SQLite storage for JSON documents.
//!
//! The document store and the offline cache share one schema: a single
//! `documents` table keyed by `(collection, id)`. They differ only in the
//! file they are opened on.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod document_repo;
pub mod error;
pub mod migrations;

pub use error::DatabaseError;

/// Shared handle to one migrated SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the file at `path`, creating missing parent directories.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self::migrated(conn)?;
        log::info!("Document database ready at {}", path.display());
        Ok(db)
    }

    /// A throwaway database, used for tests and ephemeral caches.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".buddyboard").join("data"))
}

/// `~/.buddyboard/data/store.db`
pub fn default_store_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("store.db"))
}

/// `~/.buddyboard/data/cache.db`
pub fn default_cache_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("cache.db"))
}
