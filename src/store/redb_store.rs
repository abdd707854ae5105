//! `redb`-backed store.
//!
//! Both blobs live in a single table. Each write or delete is its own
//! committed write transaction, which is what makes the store atomic per key.

use super::{LocalStore, StoreError};
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const BLOBS: TableDefinition<&str, &[u8]> = TableDefinition::new("blobs");

/// Durable store persisted to a single `redb` database file.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(redb::Error::from)?;
        debug!("Opened local store at {}", path.display());
        Ok(Self { db: Arc::new(db) })
    }

    fn read_blocking(db: &Database, key: &str) -> Result<Option<Vec<u8>>, redb::Error> {
        let txn = db.begin_read()?;
        let table = match txn.open_table(BLOBS) {
            Ok(table) => table,
            // Nothing has been written yet
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = table.get(key)?.map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn write_blocking(db: &Database, key: &str, value: &[u8]) -> Result<(), redb::Error> {
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(BLOBS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete_blocking(db: &Database, key: &str) -> Result<(), redb::Error> {
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(BLOBS)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }
}

// Store calls run on the blocking pool. Once spawned, the task runs to
// completion even if the awaiting future is dropped.
#[async_trait]
impl LocalStore for RedbStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let db = self.db.clone();
        let key = key.to_string();
        let value = tokio::task::spawn_blocking(move || Self::read_blocking(&db, &key)).await??;
        Ok(value)
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::write_blocking(&db, &key, &value)).await??;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::delete_blocking(&db, &key)).await??;
        Ok(())
    }
}
