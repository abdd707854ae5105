//! Review session state machine.
//!
//! `Loading -> Active(card_index, show_answer) -> ... -> Complete`, with
//! `EmptyDeck` and `Error` as the other terminal states. Ratings go straight
//! to the server when that is safe and to the outbox otherwise; either way
//! the learner's progress advances.

use crate::connectivity::ConnectivityMonitor;
use crate::deck::{DeckSource, ReviewDeckCache};
use crate::error::ReviewError;
use crate::model::{PendingRating, Rating, ReviewItem, SessionStats, SyncStatus};
use crate::sync::SyncEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Active { card_index: usize, show_answer: bool },
    /// The deck loaded but had nothing due
    EmptyDeck,
    Complete { accuracy: f64 },
    Error(String),
}

/// How an accepted rating left the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Acknowledged by the server
    Submitted,
    /// Queued in the outbox
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The rating was counted and the session advanced
    Recorded { delivery: Delivery, completed: bool },
    /// Dropped: another submission was in flight or no card is showing
    Ignored,
}

struct SessionInner {
    state: SessionState,
    deck: Vec<ReviewItem>,
    deck_source: Option<DeckSource>,
    stats: SessionStats,
    started_at: Option<Instant>,
}

impl SessionInner {
    fn elapsed_stats(&self) -> SessionStats {
        let mut stats = self.stats;
        if let Some(started) = self.started_at {
            if !matches!(self.state, SessionState::Complete { .. }) {
                stats.elapsed = started.elapsed();
            }
        }
        stats
    }
}

/// Releases the in-flight flag when the submission finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn try_enter(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionController {
    deck_cache: ReviewDeckCache,
    engine: Arc<SyncEngine>,
    monitor: Arc<ConnectivityMonitor>,
    inner: Mutex<SessionInner>,
    in_flight: AtomicBool,
}

impl SessionController {
    pub fn new(
        deck_cache: ReviewDeckCache,
        engine: Arc<SyncEngine>,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            deck_cache,
            engine,
            monitor,
            inner: Mutex::new(SessionInner {
                state: SessionState::Loading,
                deck: Vec::new(),
                deck_source: None,
                stats: SessionStats::default(),
                started_at: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    // The lock is never held across an await, so a poisoned lock can only
    // come from a panic in a projection; the data is still consistent.
    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new session: reset stats and load the deck.
    pub async fn start(&self) -> SessionState {
        {
            let mut inner = self.inner();
            inner.state = SessionState::Loading;
            inner.deck.clear();
            inner.deck_source = None;
            inner.stats = SessionStats::default();
            inner.started_at = None;
        }

        // Offline sessions never touch the network, not even for the deck.
        let loaded = if self.monitor.is_online() {
            self.deck_cache.load().await
        } else {
            self.deck_cache.load_cached().await
        };

        let mut inner = self.inner();
        let state = match loaded {
            Ok(deck) if deck.items.is_empty() => {
                info!("No cards due for review");
                inner.deck_source = Some(deck.source);
                SessionState::EmptyDeck
            }
            Ok(deck) => {
                info!("Starting review session with {} cards", deck.items.len());
                inner.deck = deck.items;
                inner.deck_source = Some(deck.source);
                inner.started_at = Some(Instant::now());
                SessionState::Active {
                    card_index: 0,
                    show_answer: false,
                }
            }
            Err(e) => {
                error!("Failed to load review deck: {}", e);
                SessionState::Error(e.to_string())
            }
        };
        inner.state = state.clone();
        state
    }

    pub fn state(&self) -> SessionState {
        self.inner().state.clone()
    }

    pub fn deck_source(&self) -> Option<DeckSource> {
        self.inner().deck_source
    }

    pub fn deck_len(&self) -> usize {
        self.inner().deck.len()
    }

    /// Show the answer side of the current card. Idempotent.
    pub fn reveal_answer(&self) {
        let mut inner = self.inner();
        if let SessionState::Active { show_answer, .. } = &mut inner.state {
            *show_answer = true;
        }
    }

    /// The card being shown, if the session is active.
    pub fn current_card(&self) -> Option<ReviewItem> {
        let inner = self.inner();
        match inner.state {
            SessionState::Active { card_index, .. } => inner.deck.get(card_index).cloned(),
            _ => None,
        }
    }

    /// Fraction of the deck already rated, in `0.0..=1.0`.
    pub fn progress_fraction(&self) -> f64 {
        let inner = self.inner();
        match inner.state {
            SessionState::Active { card_index, .. } if !inner.deck.is_empty() => {
                card_index as f64 / inner.deck.len() as f64
            }
            SessionState::Complete { .. } => 1.0,
            _ => 0.0,
        }
    }

    pub fn session_stats(&self) -> SessionStats {
        self.inner().elapsed_stats()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.engine.status()
    }

    pub fn request_sync_now(&self) {
        self.engine.request_sync_now();
    }

    /// Rate the current card.
    ///
    /// While a previous call is still in flight this returns
    /// [`SubmitOutcome::Ignored`] without counting anything. A network
    /// failure never loses the rating: it is queued instead. A storage
    /// failure while queueing moves the session to `Error` and is returned.
    pub async fn submit_rating(&self, rating: Rating) -> Result<SubmitOutcome, ReviewError> {
        if !rating.is_review_grade() {
            return Err(ReviewError::InvalidRating(rating));
        }
        let Some(_in_flight) = InFlight::try_enter(&self.in_flight) else {
            return Ok(SubmitOutcome::Ignored);
        };

        let (card_index, word_id) = {
            let inner = self.inner();
            match inner.state {
                SessionState::Active { card_index, .. } => match inner.deck.get(card_index) {
                    Some(card) => (card_index, card.word_id.clone()),
                    None => return Ok(SubmitOutcome::Ignored),
                },
                _ => return Ok(SubmitOutcome::Ignored),
            }
        };

        let pending = PendingRating::new(word_id, rating);
        let delivery = match self.deliver(pending).await {
            Ok(delivery) => delivery,
            Err(e) => {
                error!("Failed to save rating: {}", e);
                self.inner().state = SessionState::Error(e.to_string());
                return Err(e);
            }
        };

        let mut inner = self.inner();
        inner.stats.record(rating);
        let next = card_index + 1;
        let completed = next >= inner.deck.len();
        if completed {
            if let Some(started) = inner.started_at {
                inner.stats.elapsed = started.elapsed();
            }
            let accuracy = inner.stats.accuracy();
            info!(
                "Review session complete: {}/{} correct",
                inner.stats.correct, inner.stats.total
            );
            inner.state = SessionState::Complete { accuracy };
        } else {
            inner.state = SessionState::Active {
                card_index: next,
                show_answer: false,
            };
        }

        Ok(SubmitOutcome::Recorded {
            delivery,
            completed,
        })
    }

    /// Send directly when online with nothing queued ahead; queue otherwise.
    async fn deliver(&self, pending: PendingRating) -> Result<Delivery, ReviewError> {
        let online = self.monitor.is_online();
        let queue_ahead = self.engine.is_draining() || !self.engine.outbox().is_empty().await?;

        if online && !queue_ahead {
            match self.engine.submit_direct(&pending).await {
                Ok(()) => return Ok(Delivery::Submitted),
                Err(e) => {
                    let err = ReviewError::SubmissionFailed(e);
                    warn!("{}; queueing rating for later sync", err);
                }
            }
        }

        self.engine.enqueue(pending).await?;
        if online {
            self.engine.request_sync_now();
        }
        Ok(Delivery::Queued)
    }
}
