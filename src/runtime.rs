//! Wiring for a complete client: store, connectivity, sync engine, session.

use crate::config::ClientConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::deck::ReviewDeckCache;
use crate::error::ReviewError;
use crate::outbox::Outbox;
use crate::remote::{HttpReviewRemote, ReviewRemote};
use crate::session::SessionController;
use crate::store::{LocalStore, RedbStore};
use crate::sync::SyncEngine;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

pub struct ReviewRuntime {
    pub monitor: Arc<ConnectivityMonitor>,
    pub engine: Arc<SyncEngine>,
    pub session: SessionController,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ReviewRuntime {
    /// Assemble a client from explicit parts.
    pub async fn build(
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn ReviewRemote>,
        monitor: Arc<ConnectivityMonitor>,
        config: &ClientConfig,
    ) -> Result<Self, ReviewError> {
        let outbox = Outbox::new(store.clone());
        let engine =
            Arc::new(SyncEngine::open(outbox, remote.clone(), config.submit_timeout()).await?);
        let deck_cache = ReviewDeckCache::new(remote, store);
        let session = SessionController::new(deck_cache, engine.clone(), monitor.clone());
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            monitor,
            engine,
            session,
            shutdown,
            tasks: Vec::new(),
        })
    }

    /// Assemble a client talking HTTP to `config.server_url` and persisting to
    /// `config.data_path`.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, ReviewError> {
        let store = Arc::new(RedbStore::open(&config.data_path)?);
        let remote = HttpReviewRemote::new(config.server_url.clone(), config.submit_timeout())
            .map_err(|e| ReviewError::Config(e.to_string()))?;
        info!(
            "Using server {} with local store {}",
            config.server_url,
            config.data_path.display()
        );
        Self::build(
            store,
            Arc::new(remote),
            Arc::new(ConnectivityMonitor::new()),
            config,
        )
        .await
    }

    /// Start the sync loop and, if `probe` is set, the reachability probe.
    pub fn spawn_background(
        &mut self,
        config: &ClientConfig,
        probe: bool,
    ) -> Result<(), ReviewError> {
        if probe {
            let handle = self
                .monitor
                .spawn_http_probe(config.probe_url(), config.probe_interval())
                .map_err(|e| ReviewError::Config(e.to_string()))?;
            self.tasks.push(handle);
        }

        let engine = self.engine.clone();
        let monitor = self.monitor.clone();
        let shutdown = self.shutdown.subscribe();
        self.tasks.push(tokio::spawn(async move {
            engine.run(&monitor, shutdown).await;
        }));
        Ok(())
    }

    /// Stop background tasks. In-progress store writes still complete.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            task.abort();
            let _ = task.await;
        }
    }
}
