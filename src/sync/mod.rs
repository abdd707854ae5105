//! Outbox synchronization with the remote scheduler.

mod engine;
mod state;

pub use engine::{submit_with_timeout, SyncEngine};
pub use state::{DrainGuard, DrainReport, EngineState};
