//! Data model for the offline review session.
//!
//! Everything in here is plain data: cards cached for offline display,
//! ratings waiting in the outbox, and the small status values the UI reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle state of a card in the remote scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

/// A vocabulary card snapshot, cached so it can be shown without a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    /// Card identifier
    pub id: String,
    /// Owning word identifier (the key ratings are submitted against)
    pub word_id: String,
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Scheduler stability, in days
    #[serde(default)]
    pub stability: f64,
    /// Difficulty band label as reported by the server (e.g. "beginner")
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub state: CardState,
    pub due: DateTime<Utc>,
}

/// A learner's recall self-assessment.
///
/// Serialized as the scheduler's integer grade: `Manual` is 0, `Again`
/// through `Easy` are 1 to 4.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    Manual,
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Whether this rating counts as "remembered" in session stats.
    pub fn is_correct(self) -> bool {
        matches!(self, Rating::Good | Rating::Easy)
    }

    /// Whether this rating may be produced by a review session.
    pub fn is_review_grade(self) -> bool {
        !matches!(self, Rating::Manual)
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Manual => "manual",
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Manual => 0,
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Manual),
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(format!("invalid rating grade: {}", other)),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// A rating that has not yet been acknowledged by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingRating {
    /// Client-generated key, sent with every submission attempt so the
    /// server can recognise a replay.
    pub id: Uuid,
    pub word_id: String,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

impl PendingRating {
    pub fn new(word_id: impl Into<String>, rating: Rating) -> Self {
        Self {
            id: Uuid::new_v4(),
            word_id: word_id.into(),
            rating,
            created_at: Utc::now(),
        }
    }
}

/// Per-session counters. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    pub total: u32,
    pub correct: u32,
    pub elapsed: Duration,
}

impl SessionStats {
    pub fn record(&mut self, rating: Rating) {
        self.total += 1;
        if rating.is_correct() {
            self.correct += 1;
        }
    }

    /// Fraction of rated cards that were remembered, 0.0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// Outbox state as shown by the sync indicator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Outbox is empty
    Synced,
    /// Outbox has entries and no drain is running
    Pending,
    /// A drain is in progress
    Syncing,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
        };
        f.pad(label)
    }
}
