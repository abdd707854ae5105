//! Crate-level error taxonomy for the review session.

use crate::model::Rating;
use crate::remote::RemoteError;
use crate::store::StoreError;

/// Errors surfaced by the deck cache, outbox, sync engine and session.
///
/// Remote errors degrade to "queue locally" and are recoverable. Storage
/// errors threaten durability and block the operation in progress.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("nothing to review, try again when online")]
    NoCachedData,
    #[error("rating submission failed: {0}")]
    SubmissionFailed(#[source] RemoteError),
    #[error("sync stopped at queued rating {index}: {source}")]
    DrainFailed {
        index: usize,
        #[source]
        source: RemoteError,
    },
    #[error("local storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("rating '{0}' cannot be submitted from a review session")]
    InvalidRating(Rating),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReviewError {
    /// Whether the learner can keep going without intervention.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReviewError::SubmissionFailed(_) | ReviewError::DrainFailed { .. }
        )
    }

    /// Whether the error must be shown as a blocking failure.
    pub fn is_blocking(&self) -> bool {
        matches!(self, ReviewError::Storage(_) | ReviewError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_recoverable() {
        let err = ReviewError::SubmissionFailed(RemoteError::Timeout);
        assert!(err.is_recoverable());
        assert!(!err.is_blocking());

        let err = ReviewError::DrainFailed {
            index: 1,
            source: RemoteError::Status(503),
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "sync stopped at queued rating 1: server returned HTTP 503"
        );
    }

    #[test]
    fn test_storage_errors_are_blocking() {
        let err = ReviewError::from(StoreError::Database("disk full".to_string()));
        assert!(err.is_blocking());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_no_cached_data_display() {
        assert_eq!(
            ReviewError::NoCachedData.to_string(),
            "nothing to review, try again when online"
        );
    }
}
