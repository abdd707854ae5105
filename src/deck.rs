//! Review deck cache: network first, last persisted deck as fallback.

use crate::error::ReviewError;
use crate::model::ReviewItem;
use crate::remote::ReviewRemote;
use crate::store::{decode_blob, encode_blob, BlobKind, LocalStore, StoreError, DECK_KEY};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a loaded deck came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckSource {
    Network,
    Cache,
}

/// A deck ready for a session. Its order does not change once loaded.
#[derive(Debug, Clone)]
pub struct LoadedDeck {
    pub items: Vec<ReviewItem>,
    pub source: DeckSource,
}

pub struct ReviewDeckCache {
    remote: Arc<dyn ReviewRemote>,
    store: Arc<dyn LocalStore>,
}

impl ReviewDeckCache {
    pub fn new(remote: Arc<dyn ReviewRemote>, store: Arc<dyn LocalStore>) -> Self {
        Self { remote, store }
    }

    /// Load the deck.
    ///
    /// A successful fetch replaces the persisted deck wholesale. If the fetch
    /// fails, the last persisted deck is returned; with no persisted deck the
    /// result is [`ReviewError::NoCachedData`].
    ///
    /// Failing to persist a freshly fetched deck is logged, not returned: the
    /// session can still run from the network copy.
    pub async fn load(&self) -> Result<LoadedDeck, ReviewError> {
        match self.remote.fetch_review_items().await {
            Ok(items) => {
                if let Err(e) = self.persist(&items).await {
                    warn!("Failed to cache review deck: {}", e);
                }
                info!("Loaded {} review items from network", items.len());
                Ok(LoadedDeck {
                    items,
                    source: DeckSource::Network,
                })
            }
            Err(e) => {
                warn!("Deck fetch failed, falling back to cache: {}", e);
                self.load_cached().await
            }
        }
    }

    /// Load the last persisted deck without touching the network.
    pub async fn load_cached(&self) -> Result<LoadedDeck, ReviewError> {
        match self.cached().await? {
            Some(items) => {
                info!("Loaded {} review items from cache", items.len());
                Ok(LoadedDeck {
                    items,
                    source: DeckSource::Cache,
                })
            }
            None => Err(ReviewError::NoCachedData),
        }
    }

    /// The last persisted deck, if any.
    pub async fn cached(&self) -> Result<Option<Vec<ReviewItem>>, StoreError> {
        match self.store.read(DECK_KEY).await? {
            Some(bytes) => Ok(Some(decode_blob(BlobKind::ReviewItems, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn persist(&self, items: &[ReviewItem]) -> Result<(), StoreError> {
        let bytes = encode_blob(BlobKind::ReviewItems, items)?;
        self.store.write(DECK_KEY, bytes).await
    }

    /// Drop the persisted deck.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.delete(DECK_KEY).await
    }
}
