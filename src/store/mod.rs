//! Durable key-value storage for the cached deck and the rating outbox.
//!
//! Both logical tables live behind the [`LocalStore`] trait as opaque blobs.
//! Every write replaces the whole value for its key, so a crash can leave
//! either the old value or the new one visible, never a mix.

mod codec;
mod error;
mod memory;
mod redb_store;

pub use codec::{decode_blob, encode_blob, BlobKind, BLOB_VERSION};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use async_trait::async_trait;

/// Key for the cached review deck blob.
pub const DECK_KEY: &str = "offline_vocabulary_cards";
/// Key for the pending rating outbox blob.
pub const OUTBOX_KEY: &str = "pending_vocabulary_ratings";

/// Atomic per-key blob storage that survives process restart.
///
/// Implementations must finish a write they have started even if the
/// calling future is dropped.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the value stored under `key`.
    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
