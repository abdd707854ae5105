//! The remote review service, seen from the client.
//!
//! The scheduler itself lives on the server. The client only needs two calls:
//! fetch the due cards and submit one rating.

mod http;

pub use http::HttpReviewRemote;

use crate::model::{PendingRating, ReviewItem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error from a remote call. Always recoverable on the client side.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("server rejected rating: {0}")]
    Rejected(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout
        } else if error.is_decode() {
            RemoteError::InvalidResponse(error.to_string())
        } else if let Some(status) = error.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Network(error.to_string())
        }
    }
}

/// Body returned by the rating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body sent to the rating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub rating: u8,
    pub reviewed_at: chrono::DateTime<chrono::Utc>,
}

/// Remote collaborator used by the deck cache, the session and the sync engine.
///
/// Submitting the same rating twice must be harmless on the server side:
/// the sync engine replays at least once.
#[async_trait]
pub trait ReviewRemote: Send + Sync {
    /// Fetch the ordered list of cards due for review.
    async fn fetch_review_items(&self) -> Result<Vec<ReviewItem>, RemoteError>;

    /// Submit one rating. `Ok` means the server acknowledged it.
    async fn submit_rating(&self, rating: &PendingRating) -> Result<(), RemoteError>;
}
