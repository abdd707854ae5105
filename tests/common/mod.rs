//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use vocab_review::store::{LocalStore, MemoryStore, StoreError, OUTBOX_KEY};
use vocab_review::{
    CardState, ConnectivityMonitor, Outbox, PendingRating, RemoteError, ReviewDeckCache,
    ReviewItem, ReviewRemote, SessionController, SyncEngine,
};

pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// In-process review service with scripted failures.
///
/// Every submission attempt is recorded, successful or not.
#[derive(Default)]
pub struct ScriptedRemote {
    deck: Mutex<Vec<ReviewItem>>,
    offline: AtomicBool,
    /// 1-based submission call numbers that fail
    failing_calls: Mutex<HashSet<usize>>,
    submit_delay: Mutex<Option<Duration>>,
    attempts: Mutex<Vec<PendingRating>>,
    acknowledged: Mutex<Vec<PendingRating>>,
    fetch_calls: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deck(items: Vec<ReviewItem>) -> Self {
        let remote = Self::default();
        *remote.deck.lock().unwrap() = items;
        remote
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_call(&self, call_number: usize) {
        self.failing_calls.lock().unwrap().insert(call_number);
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    pub fn attempts(&self) -> Vec<PendingRating> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn acknowledged(&self) -> Vec<PendingRating> {
        self.acknowledged.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total calls of either kind
    pub fn network_calls(&self) -> usize {
        self.fetch_calls() + self.attempts().len()
    }
}

#[async_trait]
impl ReviewRemote for ScriptedRemote {
    async fn fetch_review_items(&self) -> Result<Vec<ReviewItem>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        Ok(self.deck.lock().unwrap().clone())
    }

    async fn submit_rating(&self, rating: &PendingRating) -> Result<(), RemoteError> {
        let call_number = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(rating.clone());
            attempts.len()
        };

        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        if self.failing_calls.lock().unwrap().contains(&call_number) {
            return Err(RemoteError::Rejected("scheduler unavailable".to_string()));
        }
        self.acknowledged.lock().unwrap().push(rating.clone());
        Ok(())
    }
}

/// Store wrapper that yields on every write, so a write is observably in flight.
#[derive(Clone)]
pub struct SlowStore {
    pub inner: MemoryStore,
    pub delay: Duration,
}

#[async_trait]
impl LocalStore for SlowStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

/// Store that, once armed, stalls the first outbox read finding nothing
/// queued. The value returned is the one read before the stall.
pub struct StallingStore {
    pub inner: MemoryStore,
    pub delay: Duration,
    armed: AtomicBool,
    /// Notified when the stall begins
    pub stalled: Notify,
}

impl StallingStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
            armed: AtomicBool::new(false),
            stalled: Notify::new(),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocalStore for StallingStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self.inner.read(key).await?;
        if key == OUTBOX_KEY && value.is_none() && self.armed.swap(false, Ordering::SeqCst) {
            self.stalled.notify_one();
            tokio::time::sleep(self.delay).await;
        }
        Ok(value)
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

/// Store whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl LocalStore for BrokenStore {
    async fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    async fn write(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }
}

pub fn card(n: u32) -> ReviewItem {
    ReviewItem {
        id: format!("card-{}", n),
        word_id: format!("word-{}", n),
        word: format!("mot {}", n),
        meaning: format!("word {}", n),
        pronunciation: Some("mo".to_string()),
        translation: Some(format!("translation {}", n)),
        part_of_speech: Some("noun".to_string()),
        examples: vec![format!("Le mot {} est ici.", n)],
        stability: 1.0 + f64::from(n),
        difficulty: Some("intermediate".to_string()),
        state: CardState::Review,
        due: Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap(),
    }
}

pub fn deck(n: u32) -> Vec<ReviewItem> {
    (1..=n).map(card).collect()
}

/// A fully wired session over the given parts.
pub struct Harness {
    pub store: Arc<dyn LocalStore>,
    pub remote: Arc<ScriptedRemote>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub engine: Arc<SyncEngine>,
    pub session: SessionController,
}

impl Harness {
    pub async fn new(
        store: Arc<dyn LocalStore>,
        remote: Arc<ScriptedRemote>,
        online: bool,
    ) -> Self {
        Self::with_timeout(store, remote, online, SUBMIT_TIMEOUT).await
    }

    pub async fn with_timeout(
        store: Arc<dyn LocalStore>,
        remote: Arc<ScriptedRemote>,
        online: bool,
        timeout: Duration,
    ) -> Self {
        let monitor = Arc::new(ConnectivityMonitor::with_state(online));
        let engine = Arc::new(
            SyncEngine::open(Outbox::new(store.clone()), remote.clone(), timeout)
                .await
                .unwrap(),
        );
        let deck_cache = ReviewDeckCache::new(remote.clone(), store.clone());
        let session = SessionController::new(deck_cache, engine.clone(), monitor.clone());
        Self {
            store,
            remote,
            monitor,
            engine,
            session,
        }
    }

    pub async fn outbox(&self) -> Vec<PendingRating> {
        self.engine.outbox().peek_all().await.unwrap()
    }
}

/// Persist `items` as the cached deck by loading them once from a throwaway remote.
pub async fn seed_deck_cache(store: Arc<dyn LocalStore>, items: Vec<ReviewItem>) {
    let remote = Arc::new(ScriptedRemote::with_deck(items));
    ReviewDeckCache::new(remote, store).load().await.unwrap();
}
