//! Document storage.
//!
//! A document is a JSON object; a collection is a named bag of documents.
//! [`LibsqlStore`] keeps each collection as a libSQL table with one JSON text
//! column and acquires a fresh connection for every call. Nothing is pooled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use libsql::{Connection, Database, params};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Where persisted documents go.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts one document into `collection`, creating the collection on
    /// first use.
    async fn insert(&self, collection: &str, document: &Value) -> Result<()>;
}

/// Collection names become table names, so only identifiers are accepted.
pub fn validate_collection(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid collection name `{name}`")))
    }
}

// ── libSQL ────────────────────────────────────────────────────────────────────

/// A local libSQL database file.
#[derive(Clone, Debug)]
pub struct LibsqlStore {
    path: PathBuf,
}

/// One connection, released when dropped.
struct Session {
    _db: Database,
    conn: Connection,
}

impl LibsqlStore {
    /// Nothing is opened until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<Session> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let db = libsql::Builder::new_local(&self.path)
            .build()
            .await
            .map_err(Error::storage)?;
        let conn = db.connect().map_err(Error::storage)?;
        debug!(path = %self.path.display(), "storage connection opened");
        Ok(Session { _db: db, conn })
    }

    async fn ensure_collection(conn: &Connection, collection: &str) -> Result<()> {
        validate_collection(collection)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {collection} (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    document TEXT NOT NULL
                )"
            ),
            params![],
        )
        .await
        .map_err(Error::storage)?;
        Ok(())
    }

    /// Number of documents in `collection`; zero if it was never created.
    pub async fn count(&self, collection: &str) -> Result<u64> {
        let session = self.open().await?;
        Self::ensure_collection(&session.conn, collection).await?;
        let mut rows = session.conn
            .query(&format!("SELECT COUNT(*) FROM {collection}"), params![])
            .await
            .map_err(Error::storage)?;
        let count = match rows.next().await.map_err(Error::storage)? {
            Some(row) => row.get::<i64>(0).map_err(Error::storage)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// All documents in `collection`, in insertion order.
    pub async fn documents(&self, collection: &str) -> Result<Vec<Value>> {
        let session = self.open().await?;
        Self::ensure_collection(&session.conn, collection).await?;
        let mut rows = session.conn
            .query(&format!("SELECT document FROM {collection} ORDER BY id"), params![])
            .await
            .map_err(Error::storage)?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await.map_err(Error::storage)? {
            let text = row.get::<String>(0).map_err(Error::storage)?;
            documents.push(serde_json::from_str(&text)?);
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for LibsqlStore {
    async fn insert(&self, collection: &str, document: &Value) -> Result<()> {
        let session = self.open().await?;
        Self::ensure_collection(&session.conn, collection).await?;
        session.conn
            .execute(
                &format!("INSERT INTO {collection} (document) VALUES (?1)"),
                params![document.to_string()],
            )
            .await
            .map_err(Error::storage)?;
        Ok(())
    }
}

// ── In-process ────────────────────────────────────────────────────────────────

/// Documents held in memory; for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .map(|c| c.get(collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: &Value) -> Result<()> {
        validate_collection(collection)?;
        let mut collections = self.collections
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".into()))?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .push(document.clone());
        Ok(())
    }
}
