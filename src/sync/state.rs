//! Drain state tracking for the sync engine.
//!
//! The engine moves `Idle -> Draining -> (Idle | IdleWithPending)`. The
//! public [`SyncStatus`] is a projection of that state; the re-entrancy flag
//! and the status channel are kept consistent by [`DrainGuard`], including
//! when a drain future is dropped half way.

use crate::model::SyncStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Internal engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Outbox empty, nothing to do
    Idle,
    /// A drain is submitting queued ratings
    Draining,
    /// Outbox non-empty and no drain running
    IdleWithPending,
}

impl EngineState {
    /// Resting state for an outbox holding `remaining` entries.
    pub fn resting(remaining: usize) -> Self {
        if remaining == 0 {
            EngineState::Idle
        } else {
            EngineState::IdleWithPending
        }
    }

    pub fn status(self) -> SyncStatus {
        match self {
            EngineState::Idle => SyncStatus::Synced,
            EngineState::Draining => SyncStatus::Syncing,
            EngineState::IdleWithPending => SyncStatus::Pending,
        }
    }
}

/// Outcome of a drain that did not hit a submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Ratings acknowledged by the server during this drain
    pub submitted: usize,
    /// Ratings still queued when the drain stopped
    pub remaining: usize,
    /// True when another drain was already running and this request was folded into it
    pub coalesced: bool,
}

/// Held for the duration of one drain.
///
/// Dropping the guard releases the re-entrancy flag. If the drain never
/// called [`DrainGuard::finish`] (it was cancelled), the status falls back to
/// `Pending`: entries may still be queued and the next drain will find out.
pub struct DrainGuard<'a> {
    flag: &'a AtomicBool,
    status: &'a watch::Sender<SyncStatus>,
    finished: bool,
}

impl<'a> DrainGuard<'a> {
    /// Try to enter `Draining`. Returns `None` if a drain is already running.
    pub fn acquire(flag: &'a AtomicBool, status: &'a watch::Sender<SyncStatus>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        status.send_replace(EngineState::Draining.status());
        Some(Self {
            flag,
            status,
            finished: false,
        })
    }

    /// Leave `Draining` with `remaining` entries still queued.
    pub fn finish(mut self, remaining: usize) {
        self.status
            .send_replace(EngineState::resting(remaining).status());
        self.finished = true;
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.status
                .send_replace(EngineState::IdleWithPending.status());
        }
        self.flag.store(false, Ordering::Release);
    }
}
