//! vocab-sync: Inspect or drain ratings queued while offline
//!
//! Usage:
//!   vocab-sync                 # List queued ratings
//!   vocab-sync --json          # Same, as JSON
//!   vocab-sync --drain         # Submit queued ratings in order

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_review::cli::SyncArgs;
use vocab_review::{PendingRating, ReviewError, ReviewRuntime, SyncStatus};

#[derive(Serialize)]
struct SyncOutput {
    status: SyncStatus,
    pending: Vec<PendingRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = SyncArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.common.resolve()?;
    let runtime = ReviewRuntime::from_config(&config).await?;
    let engine = runtime.engine.clone();

    let mut submitted = None;
    let mut error = None;
    if args.drain {
        match engine.drain().await {
            Ok(report) => submitted = Some(report.submitted),
            Err(e @ ReviewError::DrainFailed { .. }) => error = Some(e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }

    let output = SyncOutput {
        status: engine.status(),
        pending: engine.outbox().peek_all().await?,
        submitted,
        error,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(n) = output.submitted {
            println!("Synced {} ratings", n);
        }
        if let Some(ref e) = output.error {
            println!("Sync stopped: {}", e);
        }
        println!("Status: {}", output.status);
        for entry in &output.pending {
            println!(
                "{}  {:<6} {}  ({})",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                entry.rating,
                entry.word_id,
                entry.id
            );
        }
        println!("{} pending", output.pending.len());
    }

    runtime.shutdown().await;
    Ok(())
}
