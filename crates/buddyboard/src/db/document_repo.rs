//! CRUD operations for the `documents` table.
//!
//! Each row is one JSON document in a named collection. Bodies are stored as
//! JSON text; timestamps as RFC 3339 strings in a fixed-width UTC format so
//! that lexical order matches chronological order.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw document row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            collection: row.get("collection")?,
            id: row.get("id")?,
            body: row.get("body")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new document row.
pub fn insert(db: &Database, doc: &DocumentRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO documents (collection, id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                doc.collection,
                doc.id,
                doc.body,
                doc.created_at,
                doc.updated_at
            ],
        )?;
        Ok(())
    })
}

/// Inserts or replaces a document row, keyed by `(collection, id)`.
pub fn upsert(db: &Database, doc: &DocumentRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO documents (collection, id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(collection, id) DO UPDATE SET
               body = excluded.body,
               created_at = excluded.created_at,
               updated_at = excluded.updated_at",
            params![
                doc.collection,
                doc.id,
                doc.body,
                doc.created_at,
                doc.updated_at
            ],
        )?;
        Ok(())
    })
}

/// Overwrites the body and `updated_at` of an existing row.
///
/// Returns `false` when no row matched.
pub fn update_body(
    db: &Database,
    collection: &str,
    id: &str,
    body: &str,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE documents SET body = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
            params![collection, id, body, updated_at],
        )?;
        Ok(changed > 0)
    })
}

/// Finds a document by collection and id.
pub fn find_by_id(
    db: &Database,
    collection: &str,
    id: &str,
) -> Result<Option<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM documents WHERE collection = ?1 AND id = ?2")?;
        let mut rows = stmt.query_map(params![collection, id], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists every document of a collection, newest first.
pub fn list(db: &Database, collection: &str) -> Result<Vec<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents WHERE collection = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows: Vec<DocumentRow> = stmt
            .query_map(params![collection], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Lists the documents of a collection whose id starts with `prefix`, newest first.
pub fn list_with_id_prefix(
    db: &Database,
    collection: &str,
    prefix: &str,
) -> Result<Vec<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents WHERE collection = ?1 AND substr(id, 1, length(?2)) = ?2
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows: Vec<DocumentRow> = stmt
            .query_map(params![collection, prefix], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Deletes a document. Returns `false` when no row matched.
pub fn delete(db: &Database, collection: &str, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(changed > 0)
    })
}

/// Replaces every row of `collection` whose id does NOT start with
/// `keep_prefix` by `rows`, in one transaction.
pub fn replace_except_prefix(
    db: &Database,
    collection: &str,
    keep_prefix: &str,
    rows: &[DocumentRow],
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM documents WHERE collection = ?1 AND substr(id, 1, length(?2)) != ?2",
            params![collection, keep_prefix],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO documents (collection, id, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(params![
                    collection,
                    row.id,
                    row.body,
                    row.created_at,
                    row.updated_at
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_doc(collection: &str, id: &str, created_at: &str) -> DocumentRow {
        DocumentRow {
            collection: collection.to_string(),
            id: id.to_string(),
            body: r#"{"status":"Pending Service"}"#.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        insert(&db, &sample_doc("leads", "d1", "2026-01-01T00:00:00.000000Z")).unwrap();

        let found = find_by_id(&db, "leads", "d1").unwrap().unwrap();
        assert_eq!(found.body, r#"{"status":"Pending Service"}"#);
        assert!(find_by_id(&db, "redemptions", "d1").unwrap().is_none());
    }

    #[test]
    fn test_list_is_newest_first_and_scoped() {
        let db = test_db();
        insert(&db, &sample_doc("leads", "old", "2026-01-01T00:00:00.000000Z")).unwrap();
        insert(&db, &sample_doc("leads", "new", "2026-03-01T00:00:00.000000Z")).unwrap();
        insert(&db, &sample_doc("redemptions", "r1", "2026-02-01T00:00:00.000000Z")).unwrap();

        let ids: Vec<String> = list(&db, "leads").unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_update_body_reports_missing() {
        let db = test_db();
        insert(&db, &sample_doc("leads", "u1", "2026-01-01T00:00:00.000000Z")).unwrap();

        assert!(update_body(&db, "leads", "u1", "{}", "2026-01-02T00:00:00.000000Z").unwrap());
        assert!(!update_body(&db, "leads", "nope", "{}", "2026-01-02T00:00:00.000000Z").unwrap());

        let found = find_by_id(&db, "leads", "u1").unwrap().unwrap();
        assert_eq!(found.body, "{}");
        assert_eq!(found.updated_at, "2026-01-02T00:00:00.000000Z");
        assert_eq!(found.created_at, "2026-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_upsert_overwrites() {
        let db = test_db();
        let mut doc = sample_doc("leads", "x", "2026-01-01T00:00:00.000000Z");
        upsert(&db, &doc).unwrap();
        doc.body = r#"{"status":"Completed"}"#.to_string();
        upsert(&db, &doc).unwrap();

        assert_eq!(list(&db, "leads").unwrap().len(), 1);
        assert_eq!(find_by_id(&db, "leads", "x").unwrap().unwrap().body, doc.body);
    }

    #[test]
    fn test_delete() {
        let db = test_db();
        insert(&db, &sample_doc("leads", "gone", "2026-01-01T00:00:00.000000Z")).unwrap();
        assert!(delete(&db, "leads", "gone").unwrap());
        assert!(!delete(&db, "leads", "gone").unwrap());
    }

    #[test]
    fn test_replace_except_prefix_keeps_local_rows() {
        let db = test_db();
        insert(&db, &sample_doc("leads", "local-1", "2026-01-01T00:00:00.000000Z")).unwrap();
        insert(&db, &sample_doc("leads", "stale", "2026-01-02T00:00:00.000000Z")).unwrap();
        insert(&db, &sample_doc("redemptions", "other", "2026-01-02T00:00:00.000000Z")).unwrap();

        let fresh = vec![sample_doc("leads", "fresh", "2026-01-03T00:00:00.000000Z")];
        replace_except_prefix(&db, "leads", "local-", &fresh).unwrap();

        let ids: Vec<String> = list(&db, "leads").unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["fresh", "local-1"]);
        assert!(find_by_id(&db, "redemptions", "other").unwrap().is_some());

        let local = list_with_id_prefix(&db, "leads", "local-").unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].id, "local-1");
    }
}
