//! Durable FIFO of ratings that still need to reach the server.
//!
//! The outbox keeps no copy of its own: every operation reads the blob from
//! the store, and every mutation writes the whole sequence back before
//! returning. A crash after a successful `append` therefore cannot lose the
//! entry, and a write that completes after its caller went away is still
//! seen by the next operation.

use crate::model::PendingRating;
use crate::store::{decode_blob, encode_blob, BlobKind, LocalStore, StoreError, OUTBOX_KEY};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub struct Outbox {
    store: Arc<dyn LocalStore>,
    /// Serializes read-modify-write cycles; one write completes before the
    /// next begins.
    write_lock: Mutex<()>,
}

impl Outbox {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<PendingRating>, StoreError> {
        match self.store.read(OUTBOX_KEY).await? {
            Some(bytes) => decode_blob(BlobKind::PendingRatings, &bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[PendingRating]) -> Result<(), StoreError> {
        let bytes = encode_blob(BlobKind::PendingRatings, entries)?;
        self.store.write(OUTBOX_KEY, bytes).await
    }

    /// Append `rating` at the back. Returns only once the entry is durable.
    pub async fn append(&self, rating: PendingRating) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        debug!(
            "Queueing {} rating for word {} (position {})",
            rating.rating,
            rating.word_id,
            entries.len()
        );
        entries.push(rating);
        self.save(&entries).await
    }

    /// All queued entries, oldest first.
    pub async fn peek_all(&self) -> Result<Vec<PendingRating>, StoreError> {
        self.load().await
    }

    /// Remove the first `n` entries, keeping everything behind them in order.
    ///
    /// Returns how many entries remain queued.
    pub async fn remove_through_index(&self, n: usize) -> Result<usize, StoreError> {
        if n == 0 {
            return Ok(self.len().await?);
        }
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        let removed = n.min(entries.len());
        entries.drain(..removed);

        if entries.is_empty() {
            self.store.delete(OUTBOX_KEY).await?;
        } else {
            self.save(&entries).await?;
        }
        info!(
            "Removed {} acknowledged ratings from outbox, {} remaining",
            removed,
            entries.len()
        );
        Ok(entries.len())
    }

    /// Take the write lock if the outbox is empty.
    ///
    /// While the returned guard is held no append can land, so the caller
    /// can act on "empty" without racing a concurrent writer.
    pub async fn lock_if_empty(&self) -> Result<Option<MutexGuard<'_, ()>>, StoreError> {
        let guard = self.write_lock.lock().await;
        if self.load().await?.is_empty() {
            Ok(Some(guard))
        } else {
            Ok(None)
        }
    }

    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.load().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}
