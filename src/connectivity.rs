//! Network reachability tracking.
//!
//! The monitor is advisory. When no reachability signal is available it
//! reports online, so a real submission attempt decides and the outbox
//! catches the failure.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Last known reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// No signal has been reported yet (treated as online)
    Unknown,
    Online,
    Offline,
}

impl Reachability {
    pub fn is_online(self) -> bool {
        !matches!(self, Reachability::Offline)
    }
}

/// Publishes reachability changes to any number of subscribers.
///
/// Subscribers are only woken when the effective online/offline state flips;
/// reporting the same state twice is silent.
pub struct ConnectivityMonitor {
    tx: watch::Sender<Reachability>,
}

impl ConnectivityMonitor {
    /// Create a monitor with no signal yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Reachability::Unknown);
        Self { tx }
    }

    /// Create a monitor with a known initial state.
    pub fn with_state(online: bool) -> Self {
        let monitor = Self::new();
        monitor.set_reachable(online);
        monitor
    }

    pub fn reachability(&self) -> Reachability {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.reachability().is_online()
    }

    /// Report the current platform signal.
    ///
    /// Returns `true` if this report flipped the effective state.
    pub fn set_reachable(&self, online: bool) -> bool {
        let next = if online {
            Reachability::Online
        } else {
            Reachability::Offline
        };
        let flipped = self.tx.send_if_modified(|current| {
            let was_online = current.is_online();
            *current = next;
            was_online != next.is_online()
        });
        if flipped {
            info!("Connectivity changed: {}", if online { "online" } else { "offline" });
        }
        flipped
    }

    /// Subscribe to effective state flips.
    pub fn subscribe(&self) -> watch::Receiver<Reachability> {
        self.tx.subscribe()
    }

    /// Poll `url` every `interval` and report the result.
    ///
    /// Any HTTP response counts as reachable. Transport failures and probes
    /// that take longer than `interval` count as offline.
    pub fn spawn_http_probe(
        self: &Arc<Self>,
        url: String,
        interval: Duration,
    ) -> Result<JoinHandle<()>, reqwest::Error> {
        let client = Client::builder().timeout(interval).build()?;
        let monitor = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reachable = match client.head(&url).send().await {
                    Ok(_) => true,
                    Err(e) => {
                        debug!("Reachability probe to {} failed: {}", url, e);
                        false
                    }
                };
                monitor.set_reachable(reachable);
            }
        }))
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
