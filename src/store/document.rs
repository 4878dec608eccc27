use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentStore};
use crate::error::StoreError;

/// SQLite-backed document store.
///
/// Documents are kept as JSON text, one row per document, tagged with the
/// collection they were inserted into.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db_path: PathBuf,
}

impl SqliteDocumentStore {
    /// Open (or create) the database and make sure the schema exists
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        store.init_schema()?;

        info!("Document store initialized at: {}", store.db_path.display());
        Ok(store)
    }

    /// rusqlite::Connection is not Sync, so every operation opens its own
    /// connection instead of sharing one across worker threads
    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id              TEXT PRIMARY KEY,
                collection      TEXT NOT NULL,
                body_json       TEXT NOT NULL,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection
             ON documents(collection, created_at)",
            [],
        )?;

        Ok(())
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Fetch a document by the id `insert` returned
    #[cfg(test)]
    pub fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT body_json FROM documents WHERE id = ?1")?;
        let mut rows = stmt.query([id])?;

        let body: Option<String> = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert(&self, collection: &str, document: &Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(document)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO documents (id, collection, body_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![&id, collection, &body, Utc::now().timestamp()],
        )?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let dir = TempDir::new().unwrap();
        let store = SqliteDocumentStore::open(dir.path().join("db").join("forms.db")).unwrap();

        let doc = document(json!({
            "nameBangla": "জন",
            "singleSelect": true,
            "imageUrl": ""
        }));
        let id = store.insert("forms", &doc).unwrap();

        assert_eq!(store.get(&id).unwrap(), Some(doc));
        assert_eq!(store.get("no-such-id").unwrap(), None);
    }

    #[test]
    fn test_count_per_collection() {
        let dir = TempDir::new().unwrap();
        let store = SqliteDocumentStore::open(dir.path().join("forms.db")).unwrap();
        let doc = document(json!({ "id": "x" }));

        store.insert("forms", &doc).unwrap();
        store.insert("forms", &doc).unwrap();
        store.insert("other", &doc).unwrap();

        assert_eq!(store.count("forms").unwrap(), 2);
        assert_eq!(store.count("other").unwrap(), 1);
        assert_eq!(store.count("empty").unwrap(), 0);
    }

    #[test]
    fn test_reopen_keeps_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forms.db");

        let id = {
            let store = SqliteDocumentStore::open(&path).unwrap();
            store.insert("forms", &document(json!({ "a": 1 }))).unwrap()
        };

        let store = SqliteDocumentStore::open(&path).unwrap();
        assert!(store.get(&id).unwrap().is_some());
    }
}
