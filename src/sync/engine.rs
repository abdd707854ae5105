//! Outbox drain engine.
//!
//! Queued ratings are submitted one at a time, oldest first. An entry leaves
//! the outbox only after the server has acknowledged it and every entry in
//! front of it. The first failure stops the drain with the failed entry still
//! at the head of the queue, so the server never sees ratings out of order.
//! A crash between an acknowledgement and the local removal replays that
//! entry on the next drain; the server tolerates the duplicate.

use super::state::{DrainGuard, DrainReport, EngineState};
use crate::connectivity::ConnectivityMonitor;
use crate::error::ReviewError;
use crate::model::{PendingRating, SyncStatus};
use crate::outbox::Outbox;
use crate::remote::{RemoteError, ReviewRemote};
use crate::store::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

/// Submit `rating`, treating a call that outlives `timeout` as failed.
pub async fn submit_with_timeout(
    remote: &dyn ReviewRemote,
    rating: &PendingRating,
    timeout: Duration,
) -> Result<(), RemoteError> {
    match tokio::time::timeout(timeout, remote.submit_rating(rating)).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout),
    }
}

pub struct SyncEngine {
    outbox: Outbox,
    remote: Arc<dyn ReviewRemote>,
    submit_timeout: Duration,
    status: watch::Sender<SyncStatus>,
    draining: AtomicBool,
    sync_requested: Notify,
}

impl SyncEngine {
    /// Build the engine and derive the initial status from what is queued.
    pub async fn open(
        outbox: Outbox,
        remote: Arc<dyn ReviewRemote>,
        submit_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let queued = outbox.len().await?;
        if queued > 0 {
            info!("Found {} ratings queued from a previous session", queued);
        }
        let (status, _) = watch::channel(EngineState::resting(queued).status());
        Ok(Self {
            outbox,
            remote,
            submit_timeout,
            status,
            draining: AtomicBool::new(false),
            sync_requested: Notify::new(),
        })
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn remote(&self) -> &Arc<dyn ReviewRemote> {
        &self.remote
    }

    pub fn submit_timeout(&self) -> Duration {
        self.submit_timeout
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Submit a rating directly, bypassing the outbox.
    pub async fn submit_direct(&self, rating: &PendingRating) -> Result<(), RemoteError> {
        submit_with_timeout(self.remote.as_ref(), rating, self.submit_timeout).await
    }

    /// Durably queue a rating behind everything already queued.
    ///
    /// Accepts any rating, including `Manual` entries from administrative
    /// tooling.
    pub async fn enqueue(&self, rating: PendingRating) -> Result<(), StoreError> {
        self.outbox.append(rating).await?;
        if !self.is_draining() {
            self.status
                .send_replace(EngineState::IdleWithPending.status());
        }
        Ok(())
    }

    /// Ask the background loop to drain as soon as possible.
    pub fn request_sync_now(&self) {
        debug!("Manual sync requested");
        self.sync_requested.notify_one();
    }

    /// Drain the outbox now.
    ///
    /// Returns `DrainFailed` when a submission fails; the failed entry and
    /// everything behind it stay queued. If a drain is already running the
    /// call returns at once with `coalesced` set.
    pub async fn drain(&self) -> Result<DrainReport, ReviewError> {
        let Some(guard) = DrainGuard::acquire(&self.draining, &self.status) else {
            debug!("Drain already in progress, coalescing request");
            return Ok(DrainReport {
                submitted: 0,
                remaining: self.outbox.len().await?,
                coalesced: true,
            });
        };

        let mut submitted = 0;
        loop {
            // Entries appended while draining are picked up by the next pass.
            let batch = self.outbox.peek_all().await?;
            if batch.is_empty() {
                // Settle on Synced only while appends are held off; an
                // enqueue racing the read above lands in another pass.
                if let Some(_write) = self.outbox.lock_if_empty().await? {
                    info!("Outbox drained, {} ratings synced", submitted);
                    guard.finish(0);
                    return Ok(DrainReport {
                        submitted,
                        remaining: 0,
                        coalesced: false,
                    });
                }
                continue;
            }
            info!("Draining {} queued ratings", batch.len());

            for entry in &batch {
                match self.submit_direct(entry).await {
                    Ok(()) => {
                        self.outbox.remove_through_index(1).await?;
                        submitted += 1;
                        debug!(
                            "Synced {} rating for word {} ({})",
                            entry.rating, entry.word_id, entry.id
                        );
                    }
                    Err(source) => {
                        let remaining = self.outbox.len().await?;
                        warn!(
                            "Drain stopped after {} ratings, {} still queued: {}",
                            submitted, remaining, source
                        );
                        guard.finish(remaining);
                        return Err(ReviewError::DrainFailed {
                            index: submitted,
                            source,
                        });
                    }
                }
            }
        }
    }

    async fn drain_if_pending(&self) {
        match self.outbox.is_empty().await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = self.drain().await {
                    warn!("Background sync did not complete: {}", e);
                }
            }
            Err(e) => warn!("Failed to read outbox: {}", e),
        }
    }

    /// Drive drains from connectivity flips and manual requests until
    /// `shutdown` changes or its sender is dropped.
    pub async fn run(&self, monitor: &ConnectivityMonitor, mut shutdown: watch::Receiver<bool>) {
        let mut connectivity = monitor.subscribe();
        if monitor.is_online() {
            self.drain_if_pending().await;
        }

        loop {
            tokio::select! {
                changed = connectivity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = connectivity.borrow_and_update().is_online();
                    if online {
                        self.drain_if_pending().await;
                    }
                }
                _ = self.sync_requested.notified() => {
                    if let Err(e) = self.drain().await {
                        warn!("Manual sync did not complete: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    debug!("Sync loop shutting down");
                    break;
                }
            }
        }
    }
}
