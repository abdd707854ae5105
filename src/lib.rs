//! Offline-tolerant spaced-repetition review client.
//!
//! Learners rate vocabulary cards whether or not the device is online.
//! Ratings that cannot be delivered right away are queued durably and
//! replayed to the server, in order, once connectivity returns.

pub mod cli;
pub mod config;
pub mod connectivity;
pub mod deck;
pub mod error;
pub mod model;
pub mod outbox;
pub mod remote;
pub mod runtime;
pub mod session;
pub mod store;
pub mod sync;

pub use config::ClientConfig;
pub use connectivity::{ConnectivityMonitor, Reachability};
pub use deck::{DeckSource, LoadedDeck, ReviewDeckCache};
pub use error::ReviewError;
pub use model::{CardState, PendingRating, Rating, ReviewItem, SessionStats, SyncStatus};
pub use outbox::Outbox;
pub use remote::{HttpReviewRemote, RemoteError, ReviewRemote};
pub use runtime::ReviewRuntime;
pub use session::{Delivery, SessionController, SessionState, SubmitOutcome};
pub use sync::{DrainReport, SyncEngine};
