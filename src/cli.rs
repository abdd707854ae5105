//! Command-line arguments for the binaries.

use crate::config::ClientConfig;
use crate::error::ReviewError;
use clap::Parser;
use std::path::PathBuf;

/// Options shared by every binary.
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// JSON config file
    #[arg(short, long, env = "VOCAB_REVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Review server URL (overrides the config file)
    #[arg(long, env = "VOCAB_REVIEW_SERVER")]
    pub server: Option<String>,

    /// Local database path (overrides the config file)
    #[arg(long, env = "VOCAB_REVIEW_DATA")]
    pub data: Option<PathBuf>,
}

impl CommonArgs {
    /// Resolve the effective config: file (or defaults), then flag overrides.
    pub fn resolve(&self) -> Result<ClientConfig, ReviewError> {
        let mut config = ClientConfig::load_or_default(self.config.as_deref())?;
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        Ok(config)
    }
}

/// Interactive vocabulary review session.
#[derive(Parser, Debug)]
#[command(name = "vocab-review", version)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Start in offline mode (never contact the server)
    #[arg(long)]
    pub offline: bool,
}

/// Inspect and drain the pending rating outbox.
#[derive(Parser, Debug)]
#[command(name = "vocab-sync", version)]
pub struct SyncArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Submit queued ratings to the server
    #[arg(long)]
    pub drain: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}
